//! Task kinds and the response schema each one promises to callers.

use serde::{Deserialize, Serialize};

/// Category of AI-assisted operation. Determines prompt template, schema, and fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    SocialPostGeneration,
    ProfileAnalysisFromScrape,
    ProfileAnalysisFromDocument,
    DocumentAnalysis,
    JobMatchAnalysis,
}

/// How the orchestrator drives the generation provider for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    /// Walk the ranked candidate list once, stopping at the first success.
    RankedFallback,
    /// Hit one model, retrying only on rate limits after a constant delay.
    RetryWithBackoff,
}

/// Type and default of one schema field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text { default: &'static str },
    /// Integer clamped into `[min, max]`.
    Score { min: i64, max: i64, default: i64 },
    /// List of strings, cut to `max_len` entries when the model over-delivers.
    TextList { max_len: Option<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn text(name: &'static str, default: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Text { default },
    }
}

const fn score(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Score {
            min: 0,
            max: 100,
            default: 0,
        },
    }
}

const fn list(name: &'static str, max_len: Option<usize>) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::TextList { max_len },
    }
}

const SOCIAL_POST_SCHEMA: &[FieldSpec] = &[text("content", "")];

const PROFILE_SCHEMA: &[FieldSpec] = &[
    text("top_experience", "Not specified"),
    text("years_experience", "0"),
    text("connections_count", "500+"),
    score("summary_rating"),
    list("feedback_list", Some(3)),
];

const ATS_SCHEMA: &[FieldSpec] = &[
    score("ats_score"),
    list("top_skills", Some(5)),
    text("missing_sections", "None identified"),
    list("feedback_list", Some(3)),
];

const JOB_MATCH_SCHEMA: &[FieldSpec] = &[
    score("match_score"),
    text("analysis", "Analysis complete."),
    list("missing_skills", None),
];

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::SocialPostGeneration,
        TaskKind::ProfileAnalysisFromScrape,
        TaskKind::ProfileAnalysisFromDocument,
        TaskKind::DocumentAnalysis,
        TaskKind::JobMatchAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::SocialPostGeneration => "social_post_generation",
            TaskKind::ProfileAnalysisFromScrape => "profile_analysis_from_scrape",
            TaskKind::ProfileAnalysisFromDocument => "profile_analysis_from_document",
            TaskKind::DocumentAnalysis => "document_analysis",
            TaskKind::JobMatchAnalysis => "job_match_analysis",
        }
    }

    pub fn mode(&self) -> InvocationMode {
        match self {
            TaskKind::SocialPostGeneration => InvocationMode::RankedFallback,
            TaskKind::ProfileAnalysisFromScrape
            | TaskKind::ProfileAnalysisFromDocument
            | TaskKind::DocumentAnalysis
            | TaskKind::JobMatchAnalysis => InvocationMode::RetryWithBackoff,
        }
    }

    pub fn schema(&self) -> &'static [FieldSpec] {
        match self {
            TaskKind::SocialPostGeneration => SOCIAL_POST_SCHEMA,
            TaskKind::ProfileAnalysisFromScrape | TaskKind::ProfileAnalysisFromDocument => {
                PROFILE_SCHEMA
            }
            TaskKind::DocumentAnalysis => ATS_SCHEMA,
            TaskKind::JobMatchAnalysis => JOB_MATCH_SCHEMA,
        }
    }

    /// Whether the model is asked for free text rather than a JSON object.
    pub fn expects_plain_text(&self) -> bool {
        matches!(self, TaskKind::SocialPostGeneration)
    }

    /// Profile analyses feed the dashboard summary; other results are returned only.
    pub fn persists_summary(&self) -> bool {
        matches!(
            self,
            TaskKind::ProfileAnalysisFromScrape | TaskKind::ProfileAnalysisFromDocument
        )
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_names(task: TaskKind) -> Vec<&'static str> {
        task.schema().iter().map(|f| f.name).collect()
    }

    #[test]
    fn test_only_post_generation_uses_ranked_fallback() {
        for task in TaskKind::ALL {
            let expected = if task == TaskKind::SocialPostGeneration {
                InvocationMode::RankedFallback
            } else {
                InvocationMode::RetryWithBackoff
            };
            assert_eq!(task.mode(), expected, "{task}");
        }
    }

    #[test]
    fn test_profile_tasks_share_schema() {
        assert_eq!(
            field_names(TaskKind::ProfileAnalysisFromScrape),
            field_names(TaskKind::ProfileAnalysisFromDocument)
        );
        assert_eq!(
            field_names(TaskKind::ProfileAnalysisFromDocument),
            vec![
                "top_experience",
                "years_experience",
                "connections_count",
                "summary_rating",
                "feedback_list"
            ]
        );
    }

    #[test]
    fn test_ats_and_job_match_field_names() {
        assert_eq!(
            field_names(TaskKind::DocumentAnalysis),
            vec!["ats_score", "top_skills", "missing_sections", "feedback_list"]
        );
        assert_eq!(
            field_names(TaskKind::JobMatchAnalysis),
            vec!["match_score", "analysis", "missing_skills"]
        );
    }

    #[test]
    fn test_task_kind_serde_is_snake_case() {
        let json = serde_json::to_string(&TaskKind::JobMatchAnalysis).unwrap();
        assert_eq!(json, r#""job_match_analysis""#);
        assert_eq!(TaskKind::JobMatchAnalysis.as_str(), "job_match_analysis");
    }
}
