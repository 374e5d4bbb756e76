//! raqim — text extraction for Arabic-script documents.
//!
//! Scanned Arabic pages rarely yield usable text on the first pass:
//! recognition quality swings wildly with contrast, segmentation, and the
//! language packs in play, and the raw output carries presentation-form
//! glyphs, broken words, and mixed digit systems. This crate layers a
//! multi-strategy recognition orchestrator over a pluggable engine, then
//! runs deterministic enhancement, quality scoring, and search
//! normalization over the result.
//!
//! [`TextExtractor`] is the front door:
//!
//! ```no_run
//! use raqim::{ExtractionConfig, TextExtractor};
//!
//! # async fn run() -> raqim::Result<()> {
//! let extractor = TextExtractor::new(ExtractionConfig::from_env())?;
//! let report = extractor
//!     .extract_from_path("page.png".as_ref(), &["ara".to_string()])
//!     .await?;
//! println!("{} (quality {})", report.text, report.quality.score);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod ocr;
pub mod pipeline;
pub mod search;
pub mod text;

pub use config::{EngineMode, ExtractionConfig, SegmentationMode, StageThresholds};
pub use error::{RaqimError, Result};
pub use ocr::{OcrEngine, OcrInstance, RecognitionOutcome, StrategyOrchestrator, Variant};
pub use pipeline::{ExtractionReport, TextExtractor};
pub use text::QualityReport;
