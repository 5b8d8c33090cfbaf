//! Result types returned by the pipeline.
//!
//! [`ProcessingResult`] is the *only* shape the pipeline ever hands back:
//! a clean analysis, a low-confidence fallback, and a failed run all
//! serialize to the same JSON object, differing only in field values and the
//! optional `error` string. Downstream fraud-review consumers queue results
//! for manual inspection, so a uniform shape matters more than a precise
//! error channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// ── FileInfo ─────────────────────────────────────────────────────────────

/// Descriptor for an uploaded file, derived once from the declared content
/// type and attached verbatim into the result's `extracted_content.file_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub content_type: String,
    pub file_size: u64,
    pub is_image: bool,
    pub is_pdf: bool,
}

impl FileInfo {
    /// Classify a file from its declared content type. Pure, no I/O.
    ///
    /// `is_image` iff the content type starts with `image/`; `is_pdf` iff it
    /// equals `application/pdf`. Both false means the type is unsupported —
    /// that rejection happens one level up, not here.
    pub fn classify(filename: &str, content_type: &str, file_size: u64) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            file_size,
            is_image: content_type.starts_with("image/"),
            is_pdf: content_type == "application/pdf",
        }
    }
}

// ── DocumentCategory ─────────────────────────────────────────────────────

/// The closed five-value classification assigned to every document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    /// Bills, receipts, payment requests.
    Invoice,
    /// Product listings from e-commerce sites.
    MarketplaceListingScreenshot,
    /// Screenshots of messaging apps or social-media conversations.
    ChatScreenshot,
    /// Screenshots of websites or web pages.
    WebsiteScreenshot,
    /// Everything else, including every unrecognized model label.
    Other,
}

impl DocumentCategory {
    /// Map a free-text model label onto the enumeration.
    ///
    /// Total function: the label is trimmed and matched case-insensitively
    /// against the five known strings; anything else — empty, typo'd, or an
    /// invented category — collapses to [`DocumentCategory::Other`]. No
    /// partial or fuzzy matching.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "invoice" => Self::Invoice,
            "marketplace_listing_screenshot" => Self::MarketplaceListingScreenshot,
            "chat_screenshot" => Self::ChatScreenshot,
            "website_screenshot" => Self::WebsiteScreenshot,
            _ => Self::Other,
        }
    }

    /// The wire literal for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::MarketplaceListingScreenshot => "marketplace_listing_screenshot",
            Self::ChatScreenshot => "chat_screenshot",
            Self::WebsiteScreenshot => "website_screenshot",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Extracted content ────────────────────────────────────────────────────

/// The structured content the model is asked to extract.
///
/// Used to synthesize the fallback and error payloads with exactly the
/// required shape, and available to consumers who want to deserialize a
/// result's `extracted_content`. Every subkey the model may omit defaults to
/// an empty container. Inside the pipeline the model's own payload is kept as
/// a raw [`Value`] so fields outside this schema pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedContent {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub key_entities: serde_json::Map<String, Value>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub metadata: ContentMetadata,
}

/// Analysis metadata nested under `extracted_content.metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetadata {
    #[serde(default = "default_document_type")]
    pub document_type: String,
    #[serde(default)]
    pub urgency_indicators: Vec<String>,
    #[serde(default)]
    pub fraud_risk_indicators: Vec<String>,
    #[serde(default)]
    pub quality_score: f64,
}

fn default_document_type() -> String {
    "unknown".to_string()
}

impl Default for ContentMetadata {
    fn default() -> Self {
        Self {
            document_type: default_document_type(),
            urgency_indicators: Vec::new(),
            fraud_risk_indicators: Vec::new(),
            quality_score: 0.0,
        }
    }
}

// ── ProcessingResult ─────────────────────────────────────────────────────

/// The single output type of the pipeline.
///
/// Constructed fresh per invocation; `processing_time` is stamped by the
/// orchestrator once the run completes, and nothing else is mutated after
/// construction. Not persisted — its lifetime ends when returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub file_id: String,
    pub filename: String,
    pub category: DocumentCategory,
    /// Always within `[0.0, 1.0]`, regardless of what the model emitted.
    pub confidence: f64,
    /// The model's extraction payload (or a synthesized one), with the
    /// request's [`FileInfo`] injected under `file_info`.
    pub extracted_content: Value,
    /// Wall-clock seconds spent in the pipeline.
    pub processing_time: f64,
    /// Present iff a stage failed; the same message is echoed into
    /// `extracted_content` for reviewers.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_image_types() {
        let info = FileInfo::classify("photo.png", "image/png", 1234);
        assert!(info.is_image);
        assert!(!info.is_pdf);
        assert_eq!(info.file_size, 1234);
    }

    #[test]
    fn classify_pdf() {
        let info = FileInfo::classify("doc.pdf", "application/pdf", 10);
        assert!(!info.is_image);
        assert!(info.is_pdf);
    }

    #[test]
    fn classify_unsupported_sets_neither_flag() {
        let info = FileInfo::classify("notes.txt", "text/plain", 10);
        assert!(!info.is_image);
        assert!(!info.is_pdf);
    }

    #[test]
    fn category_mapping_is_total() {
        assert_eq!(
            DocumentCategory::from_label("invoice"),
            DocumentCategory::Invoice
        );
        assert_eq!(
            DocumentCategory::from_label("INVOICE "),
            DocumentCategory::Invoice
        );
        assert_eq!(
            DocumentCategory::from_label("Chat_Screenshot"),
            DocumentCategory::ChatScreenshot
        );
        assert_eq!(
            DocumentCategory::from_label("marketplace_listing_screenshot"),
            DocumentCategory::MarketplaceListingScreenshot
        );
        assert_eq!(
            DocumentCategory::from_label("website_screenshot"),
            DocumentCategory::WebsiteScreenshot
        );
        // Unknown, empty, and near-miss labels all collapse to Other
        assert_eq!(DocumentCategory::from_label("quote"), DocumentCategory::Other);
        assert_eq!(DocumentCategory::from_label(""), DocumentCategory::Other);
        assert_eq!(
            DocumentCategory::from_label("invoices"),
            DocumentCategory::Other
        );
    }

    #[test]
    fn category_serializes_to_wire_literal() {
        let v = serde_json::to_value(DocumentCategory::MarketplaceListingScreenshot).unwrap();
        assert_eq!(v, json!("marketplace_listing_screenshot"));
    }

    #[test]
    fn extracted_content_defaults_for_omitted_subkeys() {
        let content: ExtractedContent = serde_json::from_value(json!({
            "text": "hello"
        }))
        .unwrap();
        assert_eq!(content.text, "hello");
        assert!(content.key_entities.is_empty());
        assert!(content.dates.is_empty());
        assert_eq!(content.metadata.document_type, "unknown");
        assert!(content.metadata.fraud_risk_indicators.is_empty());
    }

    #[test]
    fn result_error_field_omitted_when_none() {
        let result = ProcessingResult {
            file_id: "f1".into(),
            filename: "a.pdf".into(),
            category: DocumentCategory::Invoice,
            confidence: 0.9,
            extracted_content: json!({}),
            processing_time: 0.5,
            error: None,
        };
        let v = serde_json::to_value(&result).unwrap();
        assert!(v.get("error").is_none());
        assert_eq!(v["category"], json!("invoice"));
    }
}
