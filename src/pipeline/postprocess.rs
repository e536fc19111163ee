//! Post body assembly: deterministic edits applied after image rewriting.
//!
//! ## Rule Order
//!
//! 1. Trim leading whitespace so the body starts right after the front matter
//! 2. Insert the PDF-embed reminder before the end of the `### Meta Data` section
//! 3. Trim trailing whitespace and close the container opened by the front matter
//!
//! Only the first metadata section is touched; notes without one pass through
//! rule 2 unchanged.

use crate::templates::{CONTAINER_CLOSE, META_DATA_END, META_DATA_HEADING, PDF_REMINDER};

/// Apply all body rules in order.
pub fn finish_body(content: &str) -> String {
    let s = content.trim_start();
    let s = insert_pdf_reminder(s);
    close_container(&s)
}

// ── Rule 2: PDF-embed reminder ──────────────────────────────────────────────

/// Insert [`PDF_REMINDER`] just before the first `***` that follows the first
/// `### Meta Data` heading.
fn insert_pdf_reminder(input: &str) -> String {
    let Some(heading) = input.find(META_DATA_HEADING) else {
        return input.to_string();
    };
    let Some(offset) = input[heading..].find(META_DATA_END) else {
        return input.to_string();
    };
    let end = heading + offset;

    let mut out = String::with_capacity(input.len() + PDF_REMINDER.len() + 1);
    out.push_str(&input[..end]);
    out.push('\n');
    out.push_str(PDF_REMINDER);
    out.push_str(&input[end..]);
    out
}

// ── Rule 3: Close the container ─────────────────────────────────────────────

fn close_container(input: &str) -> String {
    format!("{}\n\n{}", input.trim_end(), CONTAINER_CLOSE)
}
