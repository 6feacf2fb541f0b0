//! The validation chain after evidence intake.
//!
//! Order: pillars → semantic drift → measurability → evidence-hint match.
//! Resume goals also get an outcome analysis of the pillar results.
//! Suggestions are requested afterwards, and only when something failed.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::llm_client::prompts::VERDICT_FORMAT;
use crate::llm_client::{complete_json, Completion};
use crate::models::{CheckKind, CheckResult, EvidenceKind, Okr, Task};
use crate::validation::measurability::assess_measurability;
use crate::validation::pillars::{check_pillars, join_or_none, pillars_apply, PillarReport};
use crate::validation::prompts::{
    CHECK_SYSTEM, EVIDENCE_MATCH_PROMPT, MEASURABILITY_PROMPT, OUTCOME_ANALYSIS_PROMPT,
    OUTCOME_ANALYSIS_SYSTEM, SEMANTIC_DRIFT_PROMPT, SUGGESTIONS_PROMPT, SUGGESTIONS_SYSTEM,
};

/// Submission text beyond this many characters is not sent to the model.
const MAX_PROMPT_CONTENT_CHARS: usize = 12_000;

pub const NO_SUGGESTIONS: &str =
    "No specific suggestions needed. Submission appears to be in good shape.";

#[derive(Debug, Deserialize)]
struct Verdict {
    passed: bool,
    #[serde(default)]
    summary: String,
}

/// Everything a check may look at.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub okr: &'a Okr,
    pub task: &'a Task,
    pub submission_type: EvidenceKind,
    pub content: &'a str,
}

impl CheckContext<'_> {
    fn prompt_content(&self) -> String {
        truncate_chars(self.content, MAX_PROMPT_CONTENT_CHARS)
    }
}

/// Runs every content check in order. `content` must be non-empty.
pub async fn run_checks(ctx: CheckContext<'_>, llm: &dyn Completion) -> Vec<CheckResult> {
    vec![
        pillars_check(&ctx),
        semantic_drift_check(&ctx, llm).await,
        measurability_check(&ctx, llm).await,
        evidence_match_check(&ctx, llm).await,
    ]
}

/// `None` unless the goal is a resume or CV.
pub fn pillar_report(ctx: &CheckContext<'_>) -> Option<PillarReport> {
    let goal = [
        ctx.okr.title.as_str(),
        ctx.okr.description.as_str(),
        ctx.okr.objective.as_str(),
        ctx.task.title.as_str(),
    ];
    pillars_apply(&goal).then(|| check_pillars(ctx.content))
}

pub fn pillars_check(ctx: &CheckContext<'_>) -> CheckResult {
    match pillar_report(ctx) {
        Some(report) => report.to_check(),
        None => CheckResult::skipped(
            CheckKind::Pillars,
            "Not a resume or CV goal; pillar check not applicable.",
        ),
    }
}

/// Narrative analysis of the pillar results. A failed model call leaves the
/// report without one.
pub async fn outcome_analysis(
    ctx: &CheckContext<'_>,
    pillars: &PillarReport,
    llm: &dyn Completion,
) -> Option<String> {
    let prompt = OUTCOME_ANALYSIS_PROMPT
        .replace("{objective}", &ctx.okr.objective)
        .replace("{score}", &pillars.achievement_score.to_string())
        .replace("{present}", &join_or_none(&pillars.present))
        .replace("{missing}", &join_or_none(&pillars.missing));

    match llm.complete(&prompt, OUTCOME_ANALYSIS_SYSTEM).await {
        Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Ok(_) => None,
        Err(e) => {
            warn!("Outcome analysis failed: {e}");
            None
        }
    }
}

pub async fn semantic_drift_check(ctx: &CheckContext<'_>, llm: &dyn Completion) -> CheckResult {
    let prompt = SEMANTIC_DRIFT_PROMPT
        .replace("{objective}", &ctx.okr.objective)
        .replace("{okr_description}", &ctx.okr.description)
        .replace("{task_title}", &ctx.task.title)
        .replace("{content}", &ctx.prompt_content())
        + VERDICT_FORMAT;
    llm_verdict(CheckKind::SemanticDrift, &prompt, llm).await
}

/// The keyword scan is passed to the model as context. If the model call
/// fails the keyword verdict stands on its own.
pub async fn measurability_check(ctx: &CheckContext<'_>, llm: &dyn Completion) -> CheckResult {
    let findings = assess_measurability(ctx.content);
    let prompt = MEASURABILITY_PROMPT
        .replace("{content}", &ctx.prompt_content())
        .replace("{flagged}", &findings.describe())
        + VERDICT_FORMAT;

    match complete_json::<Verdict>(llm, &prompt, CHECK_SYSTEM).await {
        Ok(v) => verdict_to_check(CheckKind::Measurability, v),
        Err(e) => {
            warn!("Measurability LLM check failed, using keyword scan: {e}");
            let mut summary = format!(
                "{} of {} claim lines lack a measurable outcome (keyword scan).",
                findings.vague.len(),
                findings.lines_checked
            );
            if !findings.vague.is_empty() {
                summary.push('\n');
                summary.push_str(&findings.describe());
            }
            if findings.passed() {
                CheckResult::passed(CheckKind::Measurability, summary)
            } else {
                CheckResult::failed(CheckKind::Measurability, summary)
            }
        }
    }
}

pub async fn evidence_match_check(ctx: &CheckContext<'_>, llm: &dyn Completion) -> CheckResult {
    let prompt = EVIDENCE_MATCH_PROMPT
        .replace("{task_title}", &ctx.task.title)
        .replace("{evidence_hint}", ctx.task.evidence_hint.as_str())
        .replace("{submission_type}", ctx.submission_type.as_str())
        .replace("{content}", &ctx.prompt_content())
        + VERDICT_FORMAT;
    llm_verdict(CheckKind::EvidenceMatch, &prompt, llm).await
}

/// Improvement advice for a submission with at least one failed check.
pub async fn suggestions(
    ctx: &CheckContext<'_>,
    checks: &[CheckResult],
    llm: &dyn Completion,
) -> String {
    let failures: Vec<String> = checks
        .iter()
        .filter(|c| c.is_failure())
        .map(|c| format!("- {}: {}", c.check.label(), c.summary))
        .collect();
    if failures.is_empty() {
        return NO_SUGGESTIONS.to_string();
    }

    let prompt = SUGGESTIONS_PROMPT
        .replace("{objective}", &ctx.okr.objective)
        .replace("{task_title}", &ctx.task.title)
        .replace("{failures}", &failures.join("\n"))
        .replace("{content}", &ctx.prompt_content());

    match llm.complete(&prompt, SUGGESTIONS_SYSTEM).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => "Address the failed checks listed above and resubmit.".to_string(),
        Err(e) => {
            warn!("Suggestion generation failed: {e}");
            "Suggestions unavailable. Address the failed checks listed above and resubmit."
                .to_string()
        }
    }
}

/// A check whose model call errors counts as failed.
async fn llm_verdict(kind: CheckKind, prompt: &str, llm: &dyn Completion) -> CheckResult {
    match complete_json::<Verdict>(llm, prompt, CHECK_SYSTEM).await {
        Ok(v) => {
            debug!("{} verdict: passed={}", kind.label(), v.passed);
            verdict_to_check(kind, v)
        }
        Err(e) => {
            warn!("{} could not be completed: {e}", kind.label());
            CheckResult::failed(kind, format!("Check could not be completed: {e}"))
        }
    }
}

fn verdict_to_check(kind: CheckKind, v: Verdict) -> CheckResult {
    let summary = match v.summary.trim() {
        "" if v.passed => "Passed.".to_string(),
        "" => "Failed.".to_string(),
        s => s.to_string(),
    };
    if v.passed {
        CheckResult::passed(kind, summary)
    } else {
        CheckResult::failed(kind, summary)
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}\n[truncated]", &s[..idx]),
        None => s.to_string(),
    }
}
