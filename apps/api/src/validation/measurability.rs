use serde::{Deserialize, Serialize};

/// A submission line that makes a claim without anything checkable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VagueLine {
    pub line: String,
    pub reason: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurabilityFindings {
    /// Lines long enough to carry a claim.
    pub lines_checked: usize,
    pub vague: Vec<VagueLine>,
}

impl MeasurabilityFindings {
    /// Passing when at most half of the checked lines are vague.
    pub fn passed(&self) -> bool {
        self.vague.len() * 2 <= self.lines_checked
    }

    /// Bullet list of flagged lines with their fixes, used in the LLM prompt
    /// and in the keyword-scan fallback summary.
    pub fn describe(&self) -> String {
        if self.vague.is_empty() {
            return "None".to_string();
        }
        self.vague
            .iter()
            .map(|v| format!("- \"{}\": {}. Fix: {}", v.line, v.reason, v.suggestion))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

const VAGUE_VERBS: &[&str] = &[
    "improved",
    "enhanced",
    "helped",
    "worked on",
    "assisted",
    "supported",
    "participated",
    "involved",
    "learned about",
];

const VAGUE_SCALE_WORDS: &[&str] = &[
    "significant",
    "major",
    "large",
    "huge",
    "massive",
    "substantial",
    "considerable",
    "great",
    "many",
    "numerous",
    "various",
    "several",
];

/// Lines shorter than this are headings or fragments, not claims.
const MIN_CLAIM_WORDS: usize = 4;

/// Assesses one line. `None` means the line is quantified or otherwise fine.
///
/// A line counts as quantified when it contains a digit, a `~N` estimate,
/// `%`, a currency sign or a link.
pub fn assess_line(text: &str) -> Option<VagueLine> {
    let lower = text.to_lowercase();

    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    let has_percent = text.contains('%');
    let has_currency = text.contains('$') || text.contains('€') || text.contains('£') || text.contains('₹');
    let has_link = lower.contains("http://") || lower.contains("https://");

    if has_digit || has_percent || has_currency || has_link {
        return None;
    }

    if let Some(verb) = VAGUE_VERBS.iter().find(|v| lower.contains(*v)) {
        return Some(VagueLine {
            line: text.to_string(),
            reason: format!("Contains vague verb '{verb}' without a measurable outcome"),
            suggestion: format!("Say how much: '{verb}' by what number, percentage or deadline?"),
        });
    }

    if let Some(word) = VAGUE_SCALE_WORDS.iter().find(|w| contains_word(&lower, w)) {
        return Some(VagueLine {
            line: text.to_string(),
            reason: format!("Uses vague scale word '{word}' without a number"),
            suggestion: format!("Replace '{word}' with a specific count, e.g. '3 articles', '40%'"),
        });
    }

    Some(VagueLine {
        line: text.to_string(),
        reason: "No quantified outcome found".to_string(),
        suggestion: "Add a number, date, link or named artifact that proves the outcome".to_string(),
    })
}

/// Scans every claim-sized line of a submission.
pub fn assess_measurability(content: &str) -> MeasurabilityFindings {
    let mut lines_checked = 0;
    let mut vague = Vec::new();

    for line in content.lines() {
        let line = line.trim().trim_start_matches(['-', '*', '•']).trim();
        if line.split_whitespace().count() < MIN_CLAIM_WORDS {
            continue;
        }
        lines_checked += 1;
        if let Some(v) = assess_line(line) {
            vague.push(v);
        }
    }

    MeasurabilityFindings {
        lines_checked,
        vague,
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}
