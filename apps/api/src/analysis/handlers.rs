//! Axum route handlers for the two analysis actions.
//!
//! Every failure is turned into an `AppError` here; nothing propagates further
//! and nothing is retried.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::analysis::extractor::{extract, UploadedDocument};
use crate::analysis::invoker::{invoke, AnalysisKind, AnalysisRequest};
use crate::errors::AppError;
use crate::llm_client::ModelClient;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Fields of the upload form. `job_description` defaults to empty.
#[derive(Debug, Default)]
pub struct AnalysisForm {
    pub job_description: String,
    pub resume: Option<UploadedDocument>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub kind: AnalysisKind,
    pub heading: &'static str,
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis/review
pub async fn handle_review(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    run_action(&state, AnalysisKind::Review, multipart).await
}

/// POST /api/v1/analysis/match
pub async fn handle_match(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    run_action(&state, AnalysisKind::Match, multipart).await
}

async fn run_action(
    state: &AppState,
    kind: AnalysisKind,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let span = info_span!("analysis", request_id = %Uuid::new_v4(), kind = ?kind);
    async move {
        let form = read_form(multipart)
            .await
            .map_err(|e| upload_error(kind, e, state.config.max_upload_bytes))?;
        analyze(state.model.as_ref(), kind, form).await.map(Json)
    }
    .instrument(span)
    .await
}

/// Runs one action: encode the résumé, then make exactly one model call.
/// No model call happens unless a PDF was supplied.
pub async fn analyze(
    model: &dyn ModelClient,
    kind: AnalysisKind,
    form: AnalysisForm,
) -> Result<AnalysisResponse, AppError> {
    if let Some(document) = &form.resume {
        if !document.is_pdf() {
            warn!("Rejected non-PDF upload: {:?}", document.file_name);
            return Err(AppError::UnsupportedMediaType(describe(document)));
        }
        info!(
            "Received resume {:?} ({} bytes)",
            document.file_name,
            document.content.len()
        );
    }

    let document = extract(form.resume).map_err(|e| {
        warn!("Action triggered without a resume");
        AppError::from(e)
    })?;

    info!("{}", kind.progress_message());
    let request = AnalysisRequest::new(kind, document, form.job_description);
    let text = invoke(model, request)
        .await
        .map_err(|e| AppError::AnalysisFailed {
            prefix: kind.error_prefix(),
            message: e.to_string(),
        })?;

    info!("Analysis complete ({} chars)", text.len());
    Ok(AnalysisResponse {
        kind,
        heading: kind.heading(),
        text,
    })
}

async fn read_form(mut multipart: Multipart) -> Result<AnalysisForm, MultipartError> {
    let mut form = AnalysisForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("job_description") => form.job_description = field.text().await?,
            Some("resume") => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .map(String::from);
                let media_type = field.content_type().unwrap_or_default().to_string();
                let content = field.bytes().await?;
                // Browsers submit an empty, unnamed part when no file was picked.
                if file_name.is_none() && content.is_empty() {
                    continue;
                }
                form.resume = Some(UploadedDocument {
                    content,
                    media_type,
                    file_name,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// An oversized body keeps its 413; any other failed read of the upload goes
/// down the same path as a model failure.
fn upload_error(kind: AnalysisKind, error: MultipartError, limit: usize) -> AppError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload exceeded the {limit} byte limit");
        return AppError::PayloadTooLarge { limit };
    }
    AppError::AnalysisFailed {
        prefix: kind.error_prefix(),
        message: error.body_text(),
    }
}

fn describe(document: &UploadedDocument) -> String {
    match (&document.file_name, document.media_type.is_empty()) {
        (Some(name), false) => format!("{name} ({})", document.media_type),
        (Some(name), true) => name.clone(),
        (None, false) => document.media_type.clone(),
        (None, true) => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use bytes::Bytes;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::analysis::prompts::{MATCH_ANALYSIS_PROMPT, RESUME_REVIEW_PROMPT};
    use crate::analysis::test_support::FakeModel;
    use crate::config::Config;
    use crate::errors::REMEDIATION_HINT;
    use crate::routes::build_router;

    const BOUNDARY: &str = "ats-test-boundary";
    const PDF_STUB: &[u8] = b"%PDF-1.4\n%%EOF";

    struct FilePart<'a> {
        file_name: &'a str,
        content_type: &'a str,
        content: &'a [u8],
    }

    fn multipart_body(job_description: Option<&str>, file: Option<FilePart<'_>>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(jd) = job_description {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"job_description\"\r\n\r\n{jd}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(file) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    file.file_name, file.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(file.content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn pdf_stub() -> Option<FilePart<'static>> {
        Some(FilePart {
            file_name: "resume.pdf",
            content_type: "application/pdf",
            content: PDF_STUB,
        })
    }

    async fn post(model: Arc<FakeModel>, path: &str, body: Vec<u8>) -> Response {
        post_with_config(model, Config::for_tests(), path, body).await
    }

    async fn post_with_config(
        model: Arc<FakeModel>,
        config: Config,
        path: &str,
        body: Vec<u8>,
    ) -> Response {
        let state = AppState { model, config };
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        build_router(state).oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_review_returns_model_text() {
        let model = Arc::new(FakeModel::replying("Strong alignment with the role."));
        let body = multipart_body(Some("Backend engineer, Rust"), pdf_stub());

        let response = post(model.clone(), "/api/v1/analysis/review", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["kind"], "review");
        assert_eq!(json["heading"], "Resume Analysis");
        assert_eq!(json["text"], "Strong alignment with the role.");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, RESUME_REVIEW_PROMPT);
        assert_eq!(calls[0].1.mime_type, "application/pdf");
        assert_eq!(calls[0].1.data, "JVBERi0xLjQKJSVFT0Y=");
        assert_eq!(calls[0].2, "Backend engineer, Rust");
    }

    #[tokio::test]
    async fn test_match_with_stub_pdf_and_empty_job_description() {
        let model = Arc::new(FakeModel::replying("Match: 40%"));
        let body = multipart_body(Some(""), pdf_stub());

        let response = post(model.clone(), "/api/v1/analysis/match", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["heading"], "Match Analysis");
        assert!(json["text"].is_string());

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0].0, MATCH_ANALYSIS_PROMPT);
        assert_eq!(calls[0].2, "");
    }

    #[tokio::test]
    async fn test_missing_job_description_field_sends_empty_text() {
        let model = Arc::new(FakeModel::replying("ok"));
        let response = post(
            model.clone(),
            "/api/v1/analysis/review",
            multipart_body(None, pdf_stub()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(model.calls.lock().unwrap()[0].2, "");
    }

    #[tokio::test]
    async fn test_match_without_resume_warns_and_makes_no_call() {
        let model = Arc::new(FakeModel::replying("unused"));
        let body = multipart_body(Some("Data engineer"), None);

        let response = post(model.clone(), "/api/v1/analysis/match", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "MISSING_DOCUMENT");
        assert_eq!(json["error"]["message"], "Please upload a resume first");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_review_with_blank_browser_file_part_is_missing_document() {
        let model = Arc::new(FakeModel::replying("unused"));
        let body = multipart_body(
            Some("Data engineer"),
            Some(FilePart {
                file_name: "",
                content_type: "application/octet-stream",
                content: b"",
            }),
        );

        let response = post(model.clone(), "/api/v1/analysis/review", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_reports_description_and_hint() {
        let model = Arc::new(FakeModel::failing("Request contains an invalid argument."));
        let body = multipart_body(Some("QA lead"), pdf_stub());

        let response = post(model.clone(), "/api/v1/analysis/review", body).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Error analyzing resume: "));
        assert!(message.contains("Request contains an invalid argument."));
        assert_eq!(json["error"]["hint"], REMEDIATION_HINT);
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_oversized_upload_returns_413_naming_the_limit() {
        let model = Arc::new(FakeModel::replying("unused"));
        let config = Config {
            max_upload_bytes: 1024,
            ..Config::for_tests()
        };
        let content = vec![b'x'; 4096];
        let body = multipart_body(
            Some("Platform engineer"),
            Some(FilePart {
                file_name: "cv.pdf",
                content_type: "application/pdf",
                content: &content,
            }),
        );

        let response = post_with_config(model.clone(), config, "/api/v1/analysis/match", body).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(json["error"]["message"], "Upload exceeds the 1024 byte limit");
        assert!(json["error"].get("hint").is_none());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_truncated_upload_reports_hint_without_call() {
        let model = Arc::new(FakeModel::replying("unused"));
        let content = [PDF_STUB, &[b' '; 200][..]].concat();
        let mut body = multipart_body(
            Some("Platform engineer"),
            Some(FilePart {
                file_name: "cv.pdf",
                content_type: "application/pdf",
                content: &content,
            }),
        );
        body.truncate(body.len() - 30);

        let response = post(model.clone(), "/api/v1/analysis/review", body).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "ANALYSIS_FAILED");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("Error analyzing resume: "));
        assert_eq!(json["error"]["hint"], REMEDIATION_HINT);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected_without_call() {
        let model = Arc::new(FakeModel::replying("unused"));
        let body = multipart_body(
            Some("QA lead"),
            Some(FilePart {
                file_name: "resume.docx",
                content_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                content: b"PK\x03\x04",
            }),
        );

        let response = post(model.clone(), "/api/v1/analysis/match", body).await;
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_without_document_never_builds_request() {
        let model = FakeModel::replying("unused");
        let form = AnalysisForm {
            job_description: "anything".to_string(),
            resume: None,
        };

        let err = analyze(&model, AnalysisKind::Match, form).await.unwrap_err();
        assert!(matches!(err, AppError::MissingDocument(_)));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_accepts_pdf_named_file_with_generic_type() {
        let model = FakeModel::replying("fine");
        let form = AnalysisForm {
            job_description: String::new(),
            resume: Some(UploadedDocument {
                content: Bytes::from_static(PDF_STUB),
                media_type: "application/octet-stream".to_string(),
                file_name: Some("CV.PDF".to_string()),
            }),
        };

        let response = analyze(&model, AnalysisKind::Review, form).await.unwrap();
        assert_eq!(response.text, "fine");
    }

    #[test]
    fn test_describe_upload() {
        let document = UploadedDocument {
            content: Bytes::new(),
            media_type: "text/plain".to_string(),
            file_name: Some("notes.txt".to_string()),
        };
        assert_eq!(describe(&document), "notes.txt (text/plain)");
    }
}
