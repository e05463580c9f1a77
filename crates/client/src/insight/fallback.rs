//! Deterministic responses used when no generation credential is configured
//! or the generation service fails.

use super::request::{OrderedComparison, TimelineRequest};
use super::response::ComparisonAnalysis;

/// Why the deterministic response is being served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// No API key is configured.
    NoCredential,
    /// A key is configured but the generation call failed.
    Unavailable,
}

impl Reason {
    fn notice(self) -> &'static str {
        match self {
            Reason::NoCredential => "AI-powered analysis requires an OpenAI API key.",
            Reason::Unavailable => "AI generation is temporarily unavailable, showing a basic overview.",
        }
    }

    fn hint(self) -> &'static str {
        match self {
            Reason::NoCredential => "Configure OPENAI_API_KEY for detailed AI analysis",
            Reason::Unavailable => "Generation temporarily unavailable, try again shortly for detailed AI analysis",
        }
    }
}

/// Canned comparison for `req`. Same input, same output.
pub fn comparison(req: &OrderedComparison, reason: Reason) -> ComparisonAnalysis {
    let business = match reason {
        Reason::NoCredential => "Add OPENAI_API_KEY for AI-powered business insights",
        Reason::Unavailable => "Business insights will return once generation is available again",
    };

    ComparisonAnalysis {
        summary: format!(
            "Comparing {} between {} and {}. {}",
            req.url,
            req.earlier.date,
            req.later.date,
            reason.notice()
        ),
        key_changes: vec![
            reason.hint().to_string(),
            "Visual comparison is available in the compare view".to_string(),
            "Use side-by-side, slider, or overlay modes to spot differences".to_string(),
        ],
        design_changes: vec!["Visual comparison is available without AI analysis".to_string()],
        content_changes: vec!["Open the archived snapshots directly to review content differences".to_string()],
        business_insights: vec![business.to_string()],
        sentiment: None,
        actionable_insights: None,
    }
}

/// Canned timeline text for `req`. Same input, same output.
pub fn timeline(req: &TimelineRequest, reason: Reason) -> String {
    let count = req.snapshot_count;

    format!(
        "**{url} Evolution Analysis**

Based on {count} snapshots spanning {years} years:

**Design Eras Detected:**
- Early snapshots likely show classic web 1.0/2.0 design patterns
- The middle period probably features a mobile-responsive redesign
- Recent versions show modern minimalist trends

**Key Observations:**
- {count} archived versions suggest active development
- A multi-year presence indicates an established brand
- Frequent updates show commitment to user experience

**Web Design Trends Reflected:**
- Transition from table-based to CSS layouts
- Adoption of responsive design (post-2012)
- Move toward flat design, then subtle gradients
- Recent focus on accessibility and performance

*Note: {note}.*",
        url = req.url,
        years = req.span_years(),
        note = reason.hint(),
    )
}
