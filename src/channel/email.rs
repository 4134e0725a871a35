//! Email-channel formatter.
//!
//! The email body drops the minutes section (internal working notes), then
//! runs through both render backends. The full canonical markdown still
//! travels as a verbatim attachment named after the document.

use serde::Serialize;

use crate::render::document::{find_minutes_offset, MINUTES_HEADING};
use crate::render::{render_html, render_text};
use crate::types::Document;

/// Subject-line marker for briefing mails.
pub const SUBJECT_PREFIX: &str = "[Daily Report] ";

/// Payload handed to the email-transport collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub attachment_name: String,
    pub attachment_content: String,
}

/// Build the email payload for one document.
pub fn format_email(document: &Document) -> EmailMessage {
    let reduced = reduced_body(document);
    EmailMessage {
        subject: format!(
            "{}{} - {}",
            SUBJECT_PREFIX, document.project_name, document.file_name
        ),
        html_body: render_html(&reduced),
        text_body: render_text(&reduced),
        attachment_name: document.file_name.clone(),
        attachment_content: document.content.clone(),
    }
}

/// The document without its minutes section.
///
/// The deterministic renderer records where the minutes start, so its
/// documents are cut at the recorded offset and a look-alike heading inside
/// a pasted issue body cannot shift the cut. Documents without a recorded
/// offset (service output, which never embeds issue bodies) fall back to
/// scanning for the heading.
fn reduced_body(document: &Document) -> String {
    if let Some(offset) = document.minutes_offset {
        if let Some(head) = document.content.get(..offset) {
            return head.trim_end().to_string() + "\n";
        }
    }
    strip_minutes_section(&document.content)
}

/// Remove the minutes section: from its heading up to the next same-level
/// heading or end of document.
fn strip_minutes_section(markdown: &str) -> String {
    let Some(start) = find_minutes_offset(markdown) else {
        return markdown.to_string();
    };
    let after_heading = start + MINUTES_HEADING.len();
    let end = markdown[after_heading..]
        .find("\n## ")
        .map(|offset| after_heading + offset + 1)
        .unwrap_or(markdown.len());
    let mut out = String::with_capacity(markdown.len());
    out.push_str(&markdown[..start]);
    out.push_str(&markdown[end..]);
    out.trim_end().to_string() + "\n"
}
