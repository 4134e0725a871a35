//! Document rendering.
//!
//! `document` builds canonical markdown from classified input. `markdown`
//! parses canonical markdown once into typed blocks, which `html` and `text`
//! render through two independent visitors.

pub mod document;
pub mod html;
pub mod markdown;
pub mod text;

pub use document::render_document;
pub use html::render_html;
pub use text::render_text;
