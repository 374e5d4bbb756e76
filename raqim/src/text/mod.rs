//! Text processing: character tables, enhancement, and quality scoring.

pub(crate) mod chars;
pub mod enhance;
pub mod quality;

pub use enhance::enhance;
pub use quality::{score, QualityReport};
