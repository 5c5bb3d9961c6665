// Prompt Builder: one deterministic template per task kind.
// Input text is cut to a per-task character bound before interpolation so
// requests stay inside the provider's context limits. Cutting is silent.

use crate::resilience::TaskKind;

/// Fragment closing every JSON-returning prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "Return ONLY JSON.";

/// Bound applied to the job description in job-match prompts.
pub const JOB_DESCRIPTION_CHAR_LIMIT: usize = 1000;

const SOCIAL_POST_TEMPLATE: &str = "Write a LinkedIn post about {topic} (Tone: {tone}).{style} \
Return ONLY the post text. No intro. Keep it under 200 words.";

const PROFILE_SCRAPE_TEMPLATE: &str = "Analyze this Scraped LinkedIn Data. Extract strict JSON:
1. 'top_experience': Current Role or Headline.
2. 'years_experience': Estimate from text.
3. 'connections_count': '500+' (Default).
4. 'summary_rating': 0-100.
5. 'feedback_list': 3 tips.
{json_only}
DATA:
{input}";

const PROFILE_DOCUMENT_TEMPLATE: &str = "Analyze this LinkedIn Profile PDF. Extract fields in strict JSON:
1. 'top_experience': Most recent role.
2. 'years_experience': Number of years.
3. 'connections_count': Extract number from '500+ connections'.
4. 'summary_rating': 0-100.
5. 'feedback_list': Array of 3 tips.
{json_only}
TEXT:
{input}";

const ATS_TEMPLATE: &str = "Act as a Hiring Manager. Analyze this Resume. Extract strict JSON:
1. 'ats_score': 0-100.
2. 'top_skills': List of 5 hard skills.
3. 'missing_sections': What is missing?.
4. 'feedback_list': 3 formatting fixes.
{json_only}
RESUME TEXT:
{input}";

const JOB_MATCH_TEMPLATE: &str = r#"Compare this Resume against the Job Description.

JOB DESCRIPTION:
{job_description}

RESUME:
{input}

Return JSON:
{
    "match_score": (integer 0-100),
    "analysis": (string, 2 sentences explaining why it fits or doesn't),
    "missing_skills": (list of strings)
}
{json_only}"#;

/// Task-specific parameters substituted verbatim into templates.
#[derive(Debug, Clone)]
pub struct PromptOptions<'a> {
    pub tone: &'a str,
    pub author_style: &'a str,
    pub job_description: &'a str,
}

impl Default for PromptOptions<'_> {
    fn default() -> Self {
        Self {
            tone: "Professional",
            author_style: "",
            job_description: "",
        }
    }
}

/// Maximum characters of primary input kept for `task`.
pub fn input_char_limit(task: TaskKind) -> usize {
    match task {
        TaskKind::SocialPostGeneration | TaskKind::JobMatchAnalysis => 1000,
        TaskKind::ProfileAnalysisFromScrape
        | TaskKind::ProfileAnalysisFromDocument
        | TaskKind::DocumentAnalysis => 6000,
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Builds the prompt for `task`. Empty input passes through unchanged.
pub fn build(task: TaskKind, input: &str, options: &PromptOptions<'_>) -> String {
    let input = truncate_chars(input, input_char_limit(task));

    match task {
        TaskKind::SocialPostGeneration => {
            let style = if options.author_style.trim().is_empty() {
                String::new()
            } else {
                format!(" Write in this style: {}.", options.author_style)
            };
            render(
                SOCIAL_POST_TEMPLATE,
                &[("topic", input), ("tone", options.tone), ("style", style.as_str())],
            )
        }
        TaskKind::ProfileAnalysisFromScrape => fill(PROFILE_SCRAPE_TEMPLATE, input, ""),
        TaskKind::ProfileAnalysisFromDocument => fill(PROFILE_DOCUMENT_TEMPLATE, input, ""),
        TaskKind::DocumentAnalysis => fill(ATS_TEMPLATE, input, ""),
        TaskKind::JobMatchAnalysis => fill(
            JOB_MATCH_TEMPLATE,
            input,
            truncate_chars(options.job_description, JOB_DESCRIPTION_CHAR_LIMIT),
        ),
    }
}

fn fill(template: &str, input: &str, job_description: &str) -> String {
    render(
        template,
        &[
            ("json_only", JSON_ONLY_INSTRUCTION),
            ("input", input),
            ("job_description", job_description),
        ],
    )
}

/// Replaces each `{name}` in `template` with its value in one left-to-right
/// pass. Substituted text is never rescanned, so user input containing
/// `{tone}` or `{input}` stays literal. Unknown braces are copied as-is.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find(|(name, _)| {
            tail.strip_prefix(name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }

    out.push_str(rest);
    out
}
