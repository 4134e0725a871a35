//! daybrief: status briefings from classified work-item records.
//!
//! The pipeline classifies raw issues into report categories, triages
//! overdue items by delay cause, renders one canonical markdown document per
//! project (deterministically, or via the generation service with validation
//! and guaranteed fallback), and derives the chat and email channel views.
//!
//! Upstream collaborators own issue retrieval, secret resolution, and the
//! actual webhook/SMTP transports; this crate only produces the payloads.

pub mod channel;
pub mod classify;
pub mod error;
pub mod generate;
pub mod meeting;
pub mod pipeline;
pub mod render;
pub mod triage;
pub mod types;

pub use channel::{format_chat, format_email, ChatMessage, EmailMessage};
pub use classify::{classify_issues, ClassifiedIssues};
pub use error::{GenerateError, PipelineError};
pub use generate::{
    generate_document, FallbackReason, GenerationOutcome, GeminiConfig, GeminiGenerator,
    TextGenerator,
};
pub use pipeline::BriefingPipeline;
pub use render::{render_document, render_html, render_text};
pub use types::{
    Assignee, CategoryCounts, DelayCause, DelayInfo, Document, Issue, IssueGroup,
    ProjectDocumentInput, Status,
};
