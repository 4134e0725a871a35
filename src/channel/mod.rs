//! Per-channel views of the canonical document.
//!
//! Chat gets the full canonical markdown inside a structured payload; email
//! gets a minutes-stripped body rendered through both backends plus the full
//! document as an attachment.

pub mod chat;
pub mod email;

pub use chat::{format_chat, ChatMessage};
pub use email::{format_email, EmailMessage};
