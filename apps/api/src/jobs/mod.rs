// Job search results: recency badging and the page-local "new only" filter.

pub mod recency;

pub use recency::{badge, filter_new_only, RecencyBadge};
