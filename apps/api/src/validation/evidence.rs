//! Evidence intake — turns a raw submission into checkable text.
//!
//! - documents (pdf, screenshot): base64 or raw bytes → PDF text extraction
//! - URLs: parsed and checked against the host expected for the evidence kind
//! - text: used as-is

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Url;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{CheckKind, CheckResult, EvidenceKind};

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("content is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("could not extract PDF text: {0}")]
    Pdf(String),

    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("upload is not valid UTF-8 text")]
    NotText,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL has no host")]
    MissingHost,
}

/// How the submission reached the API.
#[derive(Debug, Clone)]
pub enum SubmissionPayload {
    /// JSON body field. Base64 for documents, the URL or text otherwise.
    Inline(String),
    /// Raw bytes of a multipart file upload.
    Upload(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct PreparedEvidence {
    /// Text handed to the checks. Empty when a document or upload could not be read.
    pub content: String,
    pub check: CheckResult,
    /// Set for URL submissions; recorded as the task's proof on success.
    pub proof_url: Option<String>,
}

impl PreparedEvidence {
    fn failed(summary: String) -> Self {
        Self {
            content: String::new(),
            check: CheckResult::failed(CheckKind::Evidence, summary),
            proof_url: None,
        }
    }
}

pub async fn prepare_evidence(kind: EvidenceKind, payload: SubmissionPayload) -> PreparedEvidence {
    if kind.is_document() {
        return match document_text(payload).await {
            Ok(text) => {
                debug!("Extracted {} characters of PDF text", text.len());
                let sample: String = text.chars().take(100).collect();
                PreparedEvidence {
                    check: CheckResult::passed(
                        CheckKind::Evidence,
                        format!("PDF Text Extraction: {sample}..."),
                    ),
                    content: text,
                    proof_url: None,
                }
            }
            Err(e) => {
                warn!("Evidence extraction failed: {e}");
                PreparedEvidence::failed(format!("Error extracting PDF text: {e}"))
            }
        };
    }

    let text = match payload_text(payload) {
        Ok(t) => t.trim().to_string(),
        Err(e) => return PreparedEvidence::failed(format!("Error reading submission: {e}")),
    };

    if kind.is_url() {
        return match check_url(&text, kind) {
            Ok(check) => PreparedEvidence {
                proof_url: (!check.is_failure()).then(|| text.clone()),
                content: text,
                check,
            },
            Err(e) => PreparedEvidence {
                check: CheckResult::failed(CheckKind::Evidence, format!("Error parsing URL: {e}")),
                content: text,
                proof_url: None,
            },
        };
    }

    if text.is_empty() {
        return PreparedEvidence::failed("Text submission is empty".to_string());
    }
    PreparedEvidence {
        check: CheckResult::passed(
            CheckKind::Evidence,
            format!("Text submission received ({} characters)", text.chars().count()),
        ),
        content: text,
        proof_url: None,
    }
}

async fn document_text(payload: SubmissionPayload) -> Result<String, EvidenceError> {
    let bytes = match payload {
        SubmissionPayload::Inline(b64) => decode_base64(&b64)?,
        SubmissionPayload::Upload(bytes) => bytes,
    };
    // The PDF parser is CPU-bound and panics on some malformed files; a panic
    // inside spawn_blocking surfaces as a JoinError instead of killing the worker.
    let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| EvidenceError::Pdf(format!("parser aborted: {e}")))??;
    if text.trim().is_empty() {
        return Err(EvidenceError::EmptyDocument);
    }
    Ok(text)
}

fn payload_text(payload: SubmissionPayload) -> Result<String, EvidenceError> {
    match payload {
        SubmissionPayload::Inline(s) => Ok(s),
        SubmissionPayload::Upload(bytes) => {
            String::from_utf8(bytes).map_err(|_| EvidenceError::NotText)
        }
    }
}

/// Decodes standard base64, tolerating a `data:...;base64,` prefix and line breaks.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, EvidenceError> {
    let body = match input.find(";base64,") {
        Some(idx) if input.starts_with("data:") => &input[idx + ";base64,".len()..],
        _ => input,
    };
    let cleaned: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(cleaned)?)
}

pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, EvidenceError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| EvidenceError::Pdf(e.to_string()))
}

/// Checks a URL's host against the domains expected for `kind`. A host
/// matches a domain when it equals it or is a subdomain of it.
pub fn check_url(raw: &str, kind: EvidenceKind) -> Result<CheckResult, EvidenceError> {
    let url = Url::parse(raw).map_err(|e| EvidenceError::InvalidUrl(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or(EvidenceError::MissingHost)?
        .to_lowercase();

    let expected = kind.expected_domains();
    if expected.is_empty() {
        return Ok(CheckResult::passed(
            CheckKind::Evidence,
            format!("URL Trustworthiness: no specific domain required (host {host})"),
        ));
    }

    let trusted = expected
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")));
    let wanted = expected.join(" or ");
    Ok(if trusted {
        CheckResult::passed(
            CheckKind::Evidence,
            format!("URL Trustworthiness: URL is from a trusted domain: {wanted}"),
        )
    } else {
        CheckResult::failed(
            CheckKind::Evidence,
            format!("URL Trustworthiness: URL host {host} is NOT from the expected domain: {wanted}"),
        )
    })
}
