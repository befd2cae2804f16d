//! Domain models.

mod content;
mod operation;

pub use content::{absolutize_url, canonical_url, ContentRecord, DEFAULT_AUTHOR, DEFAULT_TITLE};
pub use operation::Operation;
