//! Self-critique: the fixed-format reflection prompt and its tolerant
//! parser.
//!
//! Parsing is best-effort text extraction. Each field is pulled out by an
//! independently fallible helper returning an Option — one malformed or
//! missing section never aborts the others, and the raw text is always
//! retained on the result.

use regex::Regex;

/// Criteria used when the caller supplies none.
pub const DEFAULT_CRITERIA: [&str; 5] = [
    "Accuracy and correctness",
    "Completeness of information",
    "Clarity and readability",
    "Relevance to the query",
    "Professional tone",
];

/// Structured critique of one output. Created fresh per reflection call,
/// never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionResult {
    /// Overall quality score, 0–10. Zero when no SCORE: line parsed.
    pub score:          f64,
    pub strengths:      Vec<String>,
    pub weaknesses:     Vec<String>,
    pub improvements:   Vec<String>,
    /// Absent when the critique declared no major revisions needed.
    pub revised_output: Option<String>,
    /// The unparsed critique text, always kept.
    pub raw:            String,
}

/// Builds the single-turn critique prompt embedding the candidate output
/// and numbered criteria, and prescribing the labeled-section reply format
/// the parser expects.
pub fn critique_prompt<S: AsRef<str>>(output: &str, criteria: &[S]) -> String {
    let numbered = criteria.iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, c.as_ref()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Reflect on the following output and provide a critical analysis:\n\n\
         OUTPUT TO EVALUATE:\n{output}\n\n\
         EVALUATION CRITERIA:\n{numbered}\n\n\
         Please provide:\n\
         1. SCORE: Rate the overall quality (0-10)\n\
         2. STRENGTHS: What was done well (2-3 points)\n\
         3. WEAKNESSES: What could be improved (2-3 points)\n\
         4. IMPROVEMENTS: Specific suggestions for enhancement\n\
         5. REVISED OUTPUT: An improved version if significant changes are needed\n\n\
         Format your response as:\n\
         SCORE: [number]\n\
         STRENGTHS:\n\
         - [strength 1]\n\
         - [strength 2]\n\
         WEAKNESSES:\n\
         - [weakness 1]\n\
         - [weakness 2]\n\
         IMPROVEMENTS:\n\
         - [improvement 1]\n\
         - [improvement 2]\n\
         REVISED OUTPUT:\n\
         [improved version or \"No major revisions needed\"]\n"
    )
}

/// Parses a critique reply. Deterministic: re-parsing a result's `raw`
/// yields identical structured fields.
pub fn parse_reflection(text: &str) -> ReflectionResult {
    ReflectionResult {
        score:          parse_score(text).unwrap_or(0.0),
        strengths:      section_bullets(text, r"(?is)STRENGTHS?:(.*?)(?:WEAKNESSES?:|$)"),
        weaknesses:     section_bullets(text, r"(?is)WEAKNESSES?:(.*?)(?:IMPROVEMENTS?:|$)"),
        improvements:   section_bullets(text, r"(?is)IMPROVEMENTS?:(.*?)(?:REVISED OUTPUT:|$)"),
        revised_output: parse_revised_output(text),
        raw:            text.to_string(),
    }
}

/// First decimal after `SCORE:`, case-insensitive.
fn parse_score(text: &str) -> Option<f64> {
    capture(text, r"(?i)SCORE:\s*(\d+(?:\.\d+)?)")?.parse().ok()
}

/// The `REVISED OUTPUT:` tail, treated as absent when empty or when it
/// case-insensitively declares "no major revisions".
fn parse_revised_output(text: &str) -> Option<String> {
    let content = capture(text, r"(?is)REVISED OUTPUT:(.*)$")?;
    if content.is_empty() || content.to_lowercase().contains("no major revisions") {
        return None;
    }
    Some(content)
}

/// Extracts a labeled section and reduces it to its trimmed bullet items.
/// A missing section yields an empty list.
fn section_bullets(text: &str, pattern: &str) -> Vec<String> {
    match capture(text, pattern) {
        Some(section) => bullets(&section),
        None => Vec::new(),
    }
}

fn bullets(section: &str) -> Vec<String> {
    match Regex::new(r"[-•*]\s*(.+)") {
        Ok(re) => re.captures_iter(section)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn capture(text: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}
