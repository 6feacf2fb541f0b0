//! OKR Parser — turns a free-form goal statement into objective, deliverables and deadline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::{complete_json, Completion};
use crate::planning::prompts::{OKR_PARSE_PROMPT, OKR_PARSE_SYSTEM};

pub const UNSPECIFIED_DEADLINE: &str = "Unspecified";
const FALLBACK_DELIVERABLE: &str = "Could not extract deliverables reliably.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedOkr {
    pub objective: String,
    /// Measurable deliverables; these become the OKR's key results.
    pub deliverables: Vec<String>,
    /// `YYYY-MM-DD`, a quarter label (`Q1`..`Q4`), or `Unspecified`.
    pub deadline: String,
}

impl ParsedOkr {
    /// Result used whenever the model output cannot be trusted.
    pub fn fallback(okr_text: &str) -> Self {
        Self {
            objective: okr_text.trim().to_string(),
            deliverables: vec![FALLBACK_DELIVERABLE.to_string()],
            deadline: UNSPECIFIED_DEADLINE.to_string(),
        }
    }

    pub fn key_results(&self) -> &[String] {
        &self.deliverables
    }
}

/// Shape the model actually returns. Deliverables sometimes arrive as a single
/// string instead of a list.
#[derive(Debug, Deserialize)]
struct RawParsedOkr {
    #[serde(default)]
    objective: String,
    #[serde(default)]
    deliverables: Value,
    #[serde(default)]
    deadline: Option<String>,
}

/// Parses an OKR statement with the LLM. Never fails: any model or format
/// error yields [`ParsedOkr::fallback`].
pub async fn parse_okr(okr_text: &str, llm: &dyn Completion) -> ParsedOkr {
    let prompt = OKR_PARSE_PROMPT.replace("{okr_text}", okr_text);
    match complete_json::<RawParsedOkr>(llm, &prompt, OKR_PARSE_SYSTEM).await {
        Ok(raw) => {
            let parsed = normalize(raw, okr_text);
            debug!(
                "Parsed OKR: {} deliverables, deadline {}",
                parsed.deliverables.len(),
                parsed.deadline
            );
            parsed
        }
        Err(e) => {
            warn!("OKR parsing failed, using fallback: {e}");
            ParsedOkr::fallback(okr_text)
        }
    }
}

fn normalize(raw: RawParsedOkr, okr_text: &str) -> ParsedOkr {
    let objective = if raw.objective.trim().is_empty() {
        okr_text.trim().to_string()
    } else {
        raw.objective.trim().to_string()
    };

    let mut deliverables: Vec<String> = match raw.deliverables {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    };
    deliverables.retain(|d| !d.trim().is_empty());
    if deliverables.is_empty() {
        deliverables.push(FALLBACK_DELIVERABLE.to_string());
    }

    let deadline = raw
        .deadline
        .as_deref()
        .map(normalize_deadline)
        .unwrap_or_else(|| UNSPECIFIED_DEADLINE.to_string());

    ParsedOkr {
        objective,
        deliverables,
        deadline,
    }
}

/// Keeps a deadline that starts with an ISO date or a quarter label; anything
/// else becomes `Unspecified`.
pub fn normalize_deadline(raw: &str) -> String {
    let trimmed = raw.trim();
    if starts_with_iso_date(trimmed) || starts_with_quarter(trimmed) {
        trimmed.to_string()
    } else {
        UNSPECIFIED_DEADLINE.to_string()
    }
}

fn starts_with_iso_date(s: &str) -> bool {
    let Some(head) = s.get(..10) else {
        return false;
    };
    NaiveDate::parse_from_str(head, "%Y-%m-%d").is_ok() && at_word_boundary(&s[10..])
}

fn starts_with_quarter(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some('Q' | 'q'))
        && matches!(chars.next(), Some('1'..='4'))
        && at_word_boundary(chars.as_str())
}

fn at_word_boundary(rest: &str) -> bool {
    rest.chars()
        .next()
        .map_or(true, |c| !c.is_alphanumeric() && c != '_')
}
