//! Fallback Catalog: canned, schema-complete responses for when every model fails.
//!
//! Each entry carries a human-readable limited-service marker so the frontend can
//! tell the user to try again without branching on response shape.

use serde_json::{json, Map, Value};

use crate::resilience::normalizer::NormalizedResult;
use crate::resilience::task::TaskKind;

/// Prefix every degraded social post starts with.
pub const DEGRADED_POST_MARKER: &str = "⚠️ (AI Unavailable)";

/// Returns the static fallback entry for `task`.
pub fn get(task: TaskKind) -> NormalizedResult {
    let payload = match task {
        TaskKind::SocialPostGeneration => json!({
            "content": format!(
                "{DEGRADED_POST_MARKER}\n\nWe hit the daily quota limit on the free tier. \
                 Please try generating again in a little while."
            ),
        }),
        TaskKind::ProfileAnalysisFromScrape | TaskKind::ProfileAnalysisFromDocument => json!({
            "top_experience": "Analysis Limit Reached",
            "years_experience": "0",
            "connections_count": "--",
            "summary_rating": 0,
            "feedback_list": [
                "You hit the AI speed limit (5 req/min).",
                "Please wait 10 seconds and try again.",
                "Your profile was not changed."
            ],
        }),
        TaskKind::DocumentAnalysis => json!({
            "ats_score": 0,
            "top_skills": ["Speed Limit Hit"],
            "missing_sections": "Wait 10s",
            "feedback_list": [
                "System is cooling down",
                "Try again in a moment",
                "Your resume was not scored"
            ],
        }),
        TaskKind::JobMatchAnalysis => json!({
            "match_score": 0,
            "analysis": "AI matching is temporarily unavailable. Please try again in a moment.",
            "missing_skills": [],
        }),
    };

    let source: Map<String, Value> = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    NormalizedResult::from_schema(task.schema(), &source)
}

/// Degraded post body personalised with the requested topic.
pub fn post_template(topic: &str) -> String {
    let topic = topic.trim();
    let hashtag: String = topic.split_whitespace().collect();
    format!(
        "{DEGRADED_POST_MARKER}\n\n\
         We hit the daily quota limit on the free tier.\n\n\
         Here is a template for '{topic}':\n\n\
         I'm excited to share my latest thoughts on {topic}. It's changing the way we work! 🚀\n\n\
         #Tech #Innovation #{hashtag}"
    )
}

/// Whether `text` is a degraded post body rather than generated content.
pub fn is_degraded_post(text: &str) -> bool {
    text.trim_start().starts_with(DEGRADED_POST_MARKER)
}
