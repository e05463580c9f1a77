//! Generation service responses.

use serde::{Deserialize, Serialize};

use super::InsightError;

/// Structured comparison of two snapshots.
///
/// Every field defaults, so a partial payload still yields a usable value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComparisonAnalysis {
    pub summary: String,
    pub key_changes: Vec<String>,
    pub design_changes: Vec<String>,
    pub content_changes: Vec<String>,
    pub business_insights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actionable_insights: Option<Vec<String>>,
}

/// Tone of the site at each end of the comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentiment {
    pub earlier: String,
    pub later: String,
    pub trend: String,
}

impl ComparisonAnalysis {
    /// True when nothing usable was produced.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Parse the model's JSON payload.
///
/// Anything that does not match the expected shape becomes an empty
/// analysis rather than an error.
pub fn parse_analysis(content: &str) -> ComparisonAnalysis {
    match serde_json::from_str(content) {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!(error = %e, "comparison payload did not match the expected shape");
            ComparisonAnalysis::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extract `choices[0].message.content` from a chat completion envelope.
///
/// Returns `Ok(None)` when the envelope is valid but carries no content.
pub fn completion_content(body: &[u8]) -> Result<Option<String>, InsightError> {
    let completion: ChatCompletion =
        serde_json::from_slice(body).map_err(|e| InsightError::InvalidResponse(e.to_string()))?;

    Ok(completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty()))
}
