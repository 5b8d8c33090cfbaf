//! The pipeline orchestrator: one entry point, one result shape.
//!
//! [`DocumentPipeline::process`] sequences classify → (normalize image |
//! extract PDF text | reject unsupported) → build prompt → invoke model →
//! parse reply → map category, then assembles the [`ProcessingResult`] with
//! the request's [`FileInfo`] embedded and the elapsed time stamped.
//!
//! ## Fail-soft contract
//!
//! `process` never returns `Err`. Every stage failure is caught here and
//! converted into a degraded result: category `other`, confidence `0.0`, the
//! failure message in both the `error` field and the extracted content.
//! Downstream fraud-review consumers require a uniform shape to queue for
//! manual inspection — a hard failure would drop the document on the floor.
//!
//! The pipeline is strictly linear: no branching loops, no retries, and the
//! only branch point is image-vs-PDF-vs-unsupported at the start. Each
//! invocation owns all of its state, so any number may run concurrently over
//! a shared pipeline.

use crate::config::AnalysisConfig;
use crate::error::PipelineError;
use crate::output::{DocumentCategory, FileInfo, ProcessingResult};
use crate::pipeline::invoke::{ModelClient, OpenAiClient};
use crate::pipeline::prompt::DocumentBody;
use crate::pipeline::{extract, normalize, parse, prompt};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// The document-analysis pipeline.
///
/// Holds the immutable configuration and the model client; cheap to share
/// behind an [`Arc`] across request handlers.
pub struct DocumentPipeline {
    config: AnalysisConfig,
    client: Arc<dyn ModelClient>,
}

impl DocumentPipeline {
    /// Build a pipeline with the production HTTP client.
    pub fn new(config: AnalysisConfig) -> Result<Self, PipelineError> {
        let client = Arc::new(OpenAiClient::new(&config)?);
        Ok(Self { config, client })
    }

    /// Build a pipeline over a caller-supplied client.
    ///
    /// The seam for tests and for custom transports (caching, recording,
    /// local gateways).
    pub fn with_client(config: AnalysisConfig, client: Arc<dyn ModelClient>) -> Self {
        Self { config, client }
    }

    /// Process one uploaded document. Never returns an error.
    ///
    /// `content_type` is the *declared* type from the upload; callers are
    /// expected to have rejected types outside `image/*` /
    /// `application/pdf`, but an unsupported type reaching this far still
    /// yields a well-formed degraded result without touching any decoder.
    pub async fn process(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
        file_id: &str,
    ) -> ProcessingResult {
        let start = Instant::now();
        info!("Processing document {file_id} ({content_type}, {} bytes)", bytes.len());

        let file_info = FileInfo::classify(filename, content_type, bytes.len() as u64);

        let mut result = match self.analyze(bytes, &file_info).await {
            Ok(Outcome { analysis, error }) => {
                let category = DocumentCategory::from_label(&analysis.category);
                let extracted_content =
                    with_file_info(analysis.extracted_content, &file_info);
                ProcessingResult {
                    file_id: file_id.to_string(),
                    filename: filename.to_string(),
                    category,
                    confidence: analysis.confidence.clamp(0.0, 1.0),
                    extracted_content,
                    processing_time: 0.0,
                    error,
                }
            }
            Err(e) => {
                warn!("Document {file_id} failed: {e}");
                degraded(file_id, filename, &file_info, &e)
            }
        };

        result.processing_time = start.elapsed().as_secs_f64();
        debug!(
            "Document {file_id} → {} ({:.2}) in {:.3}s",
            result.category, result.confidence, result.processing_time
        );
        result
    }

    /// Run the content stages.
    ///
    /// Invocation failures are absorbed into the error payload here (with the
    /// message carried out for the result's `error` field); only
    /// pre-invocation failures propagate as `Err`.
    async fn analyze(
        &self,
        bytes: &[u8],
        file_info: &FileInfo,
    ) -> Result<Outcome, PipelineError> {
        let body = if file_info.is_image {
            DocumentBody::Image {
                base64_jpeg: normalize::normalize_image(
                    bytes,
                    self.config.max_image_dim,
                    self.config.jpeg_quality,
                )?,
            }
        } else if file_info.is_pdf {
            DocumentBody::Text {
                content: extract::extract_pdf_text(bytes)?,
            }
        } else {
            return Err(PipelineError::UnsupportedType {
                content_type: file_info.content_type.clone(),
            });
        };

        let request = prompt::build_request(&self.config, &body);
        match self.client.complete(request).await {
            Ok(reply) => Ok(Outcome {
                analysis: parse::parse_reply(&reply, body.source_text()),
                error: None,
            }),
            Err(e) => {
                warn!("Model invocation failed: {e}");
                let message = e.to_string();
                Ok(Outcome {
                    analysis: parse::invocation_failure(&message),
                    error: Some(message),
                })
            }
        }
    }
}

/// An analysis plus the invocation error that produced it, if any.
struct Outcome {
    analysis: parse::Analysis,
    error: Option<String>,
}

/// Inject `file_info` into the extraction payload.
fn with_file_info(content: Value, file_info: &FileInfo) -> Value {
    let mut map = match content {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    map.insert(
        "file_info".to_string(),
        serde_json::to_value(file_info).unwrap_or(Value::Null),
    );
    Value::Object(map)
}

/// The degraded result for a pre-invocation stage failure.
fn degraded(
    file_id: &str,
    filename: &str,
    file_info: &FileInfo,
    error: &PipelineError,
) -> ProcessingResult {
    let message = error.to_string();
    let mut content = Map::new();
    content.insert("error_details".to_string(), Value::String(message.clone()));
    ProcessingResult {
        file_id: file_id.to_string(),
        filename: filename.to_string(),
        category: DocumentCategory::Other,
        confidence: 0.0,
        extracted_content: with_file_info(Value::Object(content), file_info),
        processing_time: 0.0,
        error: Some(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_info_is_injected_into_object_payloads() {
        let info = FileInfo::classify("a.pdf", "application/pdf", 9);
        let v = with_file_info(json!({"text": "hi"}), &info);
        assert_eq!(v["text"], json!("hi"));
        assert_eq!(v["file_info"]["is_pdf"], json!(true));
        assert_eq!(v["file_info"]["file_size"], json!(9));
    }

    #[test]
    fn non_object_payload_still_gets_file_info() {
        let info = FileInfo::classify("a.png", "image/png", 1);
        let v = with_file_info(Value::Null, &info);
        assert_eq!(v["file_info"]["is_image"], json!(true));
    }

    #[test]
    fn degraded_result_echoes_the_error_twice() {
        let info = FileInfo::classify("n.txt", "text/plain", 3);
        let err = PipelineError::UnsupportedType {
            content_type: "text/plain".into(),
        };
        let result = degraded("f1", "n.txt", &info, &err);
        assert_eq!(result.category, DocumentCategory::Other);
        assert_eq!(result.confidence, 0.0);
        let msg = result.error.as_deref().unwrap();
        assert!(msg.contains("text/plain"));
        assert_eq!(
            result.extracted_content["error_details"],
            json!(msg)
        );
    }
}
