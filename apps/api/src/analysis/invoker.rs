//! Analysis Invoker — one model call per action, parameterised by the instruction template.

use serde::Serialize;
use tracing::debug;

use crate::analysis::extractor::EncodedDocumentPart;
use crate::analysis::prompts::{MATCH_ANALYSIS_PROMPT, RESUME_REVIEW_PROMPT};
use crate::llm_client::{LlmError, ModelClient};

/// The two user actions. They differ only in template and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Review,
    Match,
}

impl AnalysisKind {
    pub fn template(self) -> &'static str {
        match self {
            AnalysisKind::Review => RESUME_REVIEW_PROMPT,
            AnalysisKind::Match => MATCH_ANALYSIS_PROMPT,
        }
    }

    /// Heading shown above a successful result.
    pub fn heading(self) -> &'static str {
        match self {
            AnalysisKind::Review => "Resume Analysis",
            AnalysisKind::Match => "Match Analysis",
        }
    }

    /// Prefix of the user-visible failure message.
    pub fn error_prefix(self) -> &'static str {
        match self {
            AnalysisKind::Review => "Error analyzing resume",
            AnalysisKind::Match => "Error calculating match",
        }
    }

    pub fn progress_message(self) -> &'static str {
        match self {
            AnalysisKind::Review => "Analyzing resume...",
            AnalysisKind::Match => "Calculating match percentage...",
        }
    }
}

/// Instruction, document and job description, in the order they are sent.
/// Only constructible from an already-encoded document.
#[derive(Debug)]
pub struct AnalysisRequest {
    instruction: &'static str,
    document: EncodedDocumentPart,
    job_description: String,
}

impl AnalysisRequest {
    pub fn new(kind: AnalysisKind, document: EncodedDocumentPart, job_description: String) -> Self {
        Self {
            instruction: kind.template(),
            document,
            job_description,
        }
    }
}

/// Submits the request once and returns the model's text untouched.
/// An empty job description is passed through as-is.
pub async fn invoke(client: &dyn ModelClient, request: AnalysisRequest) -> Result<String, LlmError> {
    debug!(
        "Submitting analysis: document_base64_len={}, job_description_len={}",
        request.document.data.len(),
        request.job_description.len()
    );
    client
        .submit(
            request.instruction,
            &request.document,
            &request.job_description,
        )
        .await
}
