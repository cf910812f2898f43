// Résumé templates: the static catalog and the structure → Markdown projection.

pub mod catalog;
pub mod markdown;

pub use catalog::{find_template, templates, ResumeTemplate, DEFAULT_TEMPLATE_ID};
pub use markdown::render_markdown;
