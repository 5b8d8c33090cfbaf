//! Error types for the doctriage library.
//!
//! Every variant here is an *expected* failure mode of one pipeline stage,
//! threaded between stages as an ordinary `Result` value. None of them ever
//! crosses the pipeline boundary: [`crate::process::DocumentPipeline::process`]
//! converts each one into a degraded [`crate::output::ProcessingResult`] so
//! downstream fraud-review consumers always receive the same shape.
//!
//! A parse failure of the model's reply is deliberately *not* represented
//! here — an unparseable reply synthesizes the fallback payload inside
//! [`crate::pipeline::parse`] and is not an error at all.

use thiserror::Error;

/// All failures a pipeline stage can report.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Declared content type is neither `image/*` nor `application/pdf`.
    ///
    /// A caller-input fault: transports are expected to reject these before
    /// invoking the pipeline, but the pipeline still refuses them without
    /// touching any decoder.
    #[error("Unsupported file type: {content_type}")]
    UnsupportedType { content_type: String },

    // ── Stage errors ──────────────────────────────────────────────────────
    /// Image bytes could not be decoded or re-encoded.
    #[error("Error processing image: {detail}")]
    Normalization { detail: String },

    /// PDF bytes could not be parsed, or the document is encrypted.
    #[error("Error processing PDF: {detail}")]
    Extraction { detail: String },

    /// The remote model call failed (network, auth, rate limit, bad request).
    #[error("Model invocation failed: {detail}")]
    Invocation { detail: String },

    /// The remote model call exceeded the configured deadline.
    #[error("Model invocation timed out after {secs}s")]
    InvocationTimeout { secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation or HTTP client construction failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_display() {
        let e = PipelineError::UnsupportedType {
            content_type: "text/plain".into(),
        };
        assert!(e.to_string().contains("text/plain"));
    }

    #[test]
    fn normalization_display() {
        let e = PipelineError::Normalization {
            detail: "unsupported image format".into(),
        };
        assert!(e.to_string().starts_with("Error processing image"));
    }

    #[test]
    fn timeout_display_carries_secs() {
        let e = PipelineError::InvocationTimeout { secs: 60 };
        assert!(e.to_string().contains("60s"), "got: {e}");
    }
}
