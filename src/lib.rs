//! # doctriage
//!
//! Classify and extract uploaded documents (images and PDFs) with multimodal
//! language models, producing a uniform result shape for fraud review.
//!
//! ## Why this crate?
//!
//! Fraud-review queues ingest whatever users upload — phone photos of
//! invoices, marketplace screenshots, chat captures, malformed PDFs. Reviewers
//! need every upload to land in the queue with a category, a confidence score,
//! and extracted entities, *even when something went wrong*. This crate runs a
//! fail-soft pipeline: any stage failure degrades into a well-formed result
//! flagged for manual review, never an error crossing the pipeline boundary.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document bytes
//!  │
//!  ├─ 1. Classify   derive FileInfo from the declared content type
//!  ├─ 2. Normalize  image → white-flattened, ≤1024 px, JPEG q85, base64
//!  │      or Extract  PDF → per-page text, newline-joined
//!  ├─ 3. Prompt     fixed taxonomy/schema system turn + one user turn
//!  ├─ 4. Invoke     OpenAI-compatible chat completion (single attempt)
//!  ├─ 5. Parse      first balanced JSON object, fallback on failure
//!  └─ 6. Map        free-text category label → closed five-value enum
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doctriage::{AnalysisConfig, DocumentPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENROUTER_API_KEY / OPENROUTER_BASE_URL
//!     let config = AnalysisConfig::from_env();
//!     let pipeline = DocumentPipeline::new(config)?;
//!
//!     let bytes = std::fs::read("upload.png")?;
//!     let result = pipeline
//!         .process(&bytes, "upload.png", "image/png", "file-0001")
//!         .await;
//!     println!("{} ({:.2})", result.category, result.confidence);
//!     Ok(())
//! }
//! ```
//!
//! `process` never returns `Err`: inspect [`ProcessingResult::error`] to tell
//! a degraded result from a clean one.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::PipelineError;
pub use output::{ContentMetadata, DocumentCategory, ExtractedContent, FileInfo, ProcessingResult};
pub use pipeline::invoke::{ModelClient, OpenAiClient};
pub use process::DocumentPipeline;
