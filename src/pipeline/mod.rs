//! Pipeline stages for note-to-post conversion.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ arxiv ──▶ images ──▶ assets ──▶ postprocess
//! (read)    (key)     (rewrite)  (copy)     (body)
//! ```
//!
//! 1. [`input`]  — read the note and remember its directory
//! 2. [`arxiv`]  — extract the arXiv id and confirm it; the only stage with
//!    network I/O
//! 3. [`images`] — rewrite image references and plan copies; pure text
//! 4. [`assets`] — execute the planned copies, collecting failures
//! 5. [`postprocess`] — reminder insertion and container close

pub mod arxiv;
pub mod assets;
pub mod images;
pub mod input;
pub mod postprocess;
