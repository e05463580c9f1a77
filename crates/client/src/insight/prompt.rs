//! Chat prompts for the generation service.

use rewind_core::snapshot::{display_date, parse_capture_date};
use serde::Serialize;

use super::request::{OrderedComparison, TimelineRequest};

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

const TIMELINE_SYSTEM: &str = "You are a web design historian and digital trends analyst. \
Provide concise, insightful analysis of website evolution.";

/// Messages for a structured two-snapshot comparison.
pub fn comparison_messages(req: &OrderedComparison) -> Vec<ChatMessage> {
    let earlier_url = req.earlier.archive_url.as_deref().unwrap_or("unavailable");
    let later_url = req.later.archive_url.as_deref().unwrap_or("unavailable");

    let prompt = format!(
        r#"You are analyzing how a website evolved over time.

Website: {url}
Snapshots being compared:
- Earlier version: {earlier}
- Later version: {later}

Archived copies for reference:
- Earlier: {earlier_url}
- Later: {later_url}

Using typical website evolution patterns and the time between these dates, provide:

1. Summary: a 2-3 sentence overview of the likely changes
2. Key Changes: 3-5 of the most significant likely changes
3. Design Evolution: likely visual and UX changes
4. Content Shifts: how messaging and content likely evolved
5. Business Insights: what the changes suggest about strategy

Respond with JSON of this shape:
{{
  "summary": "string",
  "keyChanges": ["string"],
  "designChanges": ["string"],
  "contentChanges": ["string"],
  "businessInsights": ["string"],
  "sentiment": {{"earlier": "string", "later": "string", "trend": "string"}},
  "actionableInsights": ["string"]
}}

Be specific. Consider industry context."#,
        url = req.url,
        earlier = req.earlier.date,
        later = req.later.date,
    );

    vec![ChatMessage::user(prompt)]
}

/// Messages for freeform timeline insights.
pub fn timeline_messages(req: &TimelineRequest) -> Vec<ChatMessage> {
    let prompt = format!(
        "Analyze the evolution of {url} based on this data:
- Number of archived snapshots: {count}
- Date range: {oldest} to {newest}

Provide insights about:
1. Likely major redesigns based on the timeline
2. Industry trends this site probably adopted
3. What the changes say about the company or product
4. Notable web design patterns from different eras

Keep it concise and engaging. Use bullet points where helpful. Maximum 200 words.",
        url = req.url,
        count = req.snapshot_count,
        oldest = human_date(&req.date_range.oldest),
        newest = human_date(&req.date_range.newest),
    );

    vec![ChatMessage::system(TIMELINE_SYSTEM), ChatMessage::user(prompt)]
}

fn human_date(raw: &str) -> String {
    parse_capture_date(raw).map(display_date).unwrap_or_else(|| raw.to_string())
}
