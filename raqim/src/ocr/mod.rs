//! Recognition: engine boundary, image preprocessing, and the
//! multi-strategy orchestrator.

pub mod engine;
pub mod preprocess;
pub mod strategy;

pub use engine::{OcrEngine, OcrInstance, Recognition, RecognitionAdapter, TesseractEngine};
pub use preprocess::Variant;
pub use strategy::{AttemptRecord, RecognitionOutcome, SkippedAttempt, Stage, StrategyOrchestrator};
