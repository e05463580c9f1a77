//! Archive URL conventions for viewing and embedding captures.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Modifier appended to the timestamp path segment to change how the
/// archive serves a capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Raw HTML without the archive toolbar, suitable for iframe embedding (`if_`).
    #[default]
    Iframe,
    /// Image-style render (`im_`).
    Image,
}

impl RenderMode {
    pub fn modifier(self) -> &'static str {
        match self {
            RenderMode::Iframe => "if_",
            RenderMode::Image => "im_",
        }
    }
}

/// Builds `{root}/web/{timestamp}/{original}` style URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRoot {
    base: String,
}

impl Default for ArchiveRoot {
    fn default() -> Self {
        Self::new("https://web.archive.org")
    }
}

impl ArchiveRoot {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self { base: base.trim_end_matches('/').to_string() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Direct viewing URL for a capture.
    pub fn view_url(&self, timestamp: &Timestamp, original_url: &str) -> String {
        format!("{}/web/{}/{}", self.base, timestamp, original_url)
    }

    /// Preview URL using a rendering-mode modifier.
    pub fn render_url(&self, timestamp: &Timestamp, original_url: &str, mode: RenderMode) -> String {
        format!("{}/web/{}{}/{}", self.base, timestamp, mode.modifier(), original_url)
    }
}
