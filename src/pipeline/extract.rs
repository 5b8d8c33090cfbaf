//! PDF text extraction: raw bytes → newline-joined page text.
//!
//! The model reads PDFs as plain text, so extraction stays deliberately
//! simple: load the document in memory, walk the pages in order, and
//! concatenate whatever embedded text each page carries. A page with no
//! extractable text (scanned image, vector-only content) contributes an empty
//! segment — that is a property of the document, not an error. Only a
//! document that cannot be parsed at all, or that is encrypted, fails the
//! stage.

use crate::error::PipelineError;
use tracing::debug;

/// Extract embedded text from a PDF, page by page in page order.
///
/// Pages are joined with newline separators and the final string is trimmed.
/// Corrupt or encrypted documents surface as [`PipelineError::Extraction`].
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, PipelineError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| PipelineError::Extraction {
        detail: e.to_string(),
    })?;

    if doc.is_encrypted() {
        return Err(PipelineError::Extraction {
            detail: "document is encrypted".to_string(),
        });
    }

    let pages = doc.get_pages();
    let mut segments = Vec::with_capacity(pages.len());
    for &page_num in pages.keys() {
        // A page where extraction fails yields an empty segment rather than
        // failing the document; the remaining pages may still carry text.
        segments.push(doc.extract_text(&[page_num]).unwrap_or_default());
    }

    let text = segments.join("\n").trim().to_string();
    debug!(
        "Extracted {} chars of text from {} pages",
        text.len(),
        pages.len()
    );
    Ok(text)
}
