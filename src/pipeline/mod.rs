//! Pipeline stages for document analysis.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. a different model transport) without touching the
//! others.
//!
//! ## Data Flow
//!
//! ```text
//! normalize / extract ──▶ prompt ──▶ invoke ──▶ parse
//! (image→b64 / pdf→text)  (messages)  (HTTP)    (JSON + fallback)
//! ```
//!
//! 1. [`normalize`] — flatten, bound, and JPEG-encode an uploaded image
//! 2. [`extract`]   — pull embedded text out of a PDF, page by page
//! 3. [`prompt`]    — assemble the fixed system turn plus one user turn
//! 4. [`invoke`]    — the OpenAI-compatible wire call; the only stage with
//!    network I/O, bounded by the configured timeout
//! 5. [`parse`]     — locate and parse the reply's first balanced JSON
//!    object, synthesizing a deterministic payload when that fails

pub mod extract;
pub mod invoke;
pub mod normalize;
pub mod parse;
pub mod prompt;
