// Document rendering: Markdown text → visual tree → HTML, plus file exports.
// Rendering is a pure projection: same text, theme and photo give the same tree.

pub mod document;
pub mod export;
pub mod html;
pub mod theme;

pub use document::{render_document, DocumentTree};
pub use export::{html_export, markdown_export, ExportFile};
pub use html::to_html;
