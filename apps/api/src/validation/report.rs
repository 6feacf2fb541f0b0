use aws_sdk_s3::primitives::ByteStream;
use thiserror::Error;
use tracing::info;

use crate::models::{CheckKind, CheckResult, CheckStatus, Okr, Task, ValidationReport};

pub const NO_CONTENT: &str = "No content to validate or extraction failed.";

fn status_tag(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Passed => "PASSED",
        CheckStatus::Failed => "FAILED",
        CheckStatus::Skipped => "SKIPPED",
    }
}

/// One line per check in pipeline order, with the suggestions placed just
/// before the evidence-hint match.
pub fn overall_result(checks: &[CheckResult], suggestions: &str, has_content: bool) -> String {
    let mut out = String::new();
    for check in checks {
        if check.check == CheckKind::EvidenceMatch && !suggestions.is_empty() {
            out.push_str(&format!("Suggestions: {suggestions}\n"));
        }
        out.push_str(&format!(
            "{} [{}]: {}\n",
            check.check.label(),
            status_tag(check.status),
            check.summary
        ));
    }
    if !has_content {
        out.push_str(NO_CONTENT);
        out.push('\n');
    }
    out
}

/// Markdown copy of a report for the object-store archive.
pub fn render_report_md(report: &ValidationReport, okr: &Okr, task: &Task) -> String {
    let verdict = if report.success { "PASSED" } else { "FAILED" };
    let mut md = format!("# Validation Report {}\n\n", report.id);
    md.push_str(&format!("- **OKR:** {} ({})\n", okr.title, okr.id));
    md.push_str(&format!("- **Objective:** {}\n", okr.objective));
    md.push_str(&format!("- **Task:** {} ({})\n", task.title, task.id));
    md.push_str(&format!(
        "- **Evidence:** {} (expected {})\n",
        report.submission_type.as_str(),
        task.evidence_hint.as_str()
    ));
    md.push_str(&format!("- **Result:** {verdict}\n"));
    md.push_str(&format!("- **Created:** {}\n\n", report.created_at.to_rfc3339()));

    md.push_str("## Checks\n\n");
    for check in &report.checks {
        md.push_str(&format!(
            "### {} — {}\n\n{}\n\n",
            check.check.label(),
            status_tag(check.status),
            check.summary
        ));
    }

    if let Some(analysis) = &report.outcome_analysis {
        md.push_str("## Outcome Analysis\n\n");
        md.push_str(analysis);
        md.push_str("\n\n");
    }

    md.push_str("## Suggestions\n\n");
    md.push_str(&report.suggestions);
    md.push('\n');
    md
}

#[derive(Debug, Error)]
#[error("upload of {key} failed: {message}")]
pub struct ArchiveError {
    pub key: String,
    pub message: String,
}

/// Uploads markdown reports to S3 (or MinIO).
#[derive(Clone)]
pub struct ReportArchive {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl ReportArchive {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn key_for(report: &ValidationReport) -> String {
        format!(
            "reports/{}/{}/{}.md",
            report.okr_id, report.task_id, report.id
        )
    }

    /// Returns the object key on success.
    pub async fn upload(
        &self,
        report: &ValidationReport,
        markdown: String,
    ) -> Result<String, ArchiveError> {
        let key = Self::key_for(report);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(markdown.into_bytes()))
            .content_type("text/markdown")
            .send()
            .await
            .map_err(|e| ArchiveError {
                key: key.clone(),
                message: e.to_string(),
            })?;

        info!("Archived validation report to s3://{}/{}", self.bucket, key);
        Ok(key)
    }
}
