// Photo overlay composited onto the rendered résumé header:
// drag/resize interaction state and in-memory image ingestion.

pub mod image;
pub mod widget;

pub use image::PhotoImage;
pub use widget::{InteractionMode, PhotoPlacement, PhotoWidget, PointerEvent, ReleaseOutcome};
