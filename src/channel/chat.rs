//! Chat-channel formatter.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::Document;

/// Payload handed to the chat-webhook collaborator. The canonical markdown
/// passes through unchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub file_name: String,
    pub project_key: String,
    pub project_name: String,
    pub content: String,
    pub timestamp: String,
}

/// Build the chat payload for one document.
pub fn format_chat(document: &Document, sent_at: DateTime<Utc>) -> ChatMessage {
    ChatMessage {
        file_name: document.file_name.clone(),
        project_key: document.project_key.clone(),
        project_name: document.project_name.clone(),
        content: document.content.clone(),
        timestamp: sent_at.to_rfc3339(),
    }
}
