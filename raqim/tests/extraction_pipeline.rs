//! End-to-end pipeline tests over a scripted engine: degraded engine
//! output in, enhanced and search-ready text out.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use raqim::config::{ExtractionConfig, PreprocessConfig, StageThresholds};
use raqim::ocr::engine::{EngineParams, OcrEngine, OcrInstance, Recognition};
use raqim::ocr::preprocess::Variant;
use raqim::{EngineMode, Result, TextExtractor};

/// Replays a fixed sequence of recognitions, one per engine instance.
struct ScriptedEngine {
    script: Mutex<VecDeque<(&'static str, f32)>>,
}

impl ScriptedEngine {
    fn new(steps: &[(&'static str, f32)]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.to_vec().into()),
        })
    }
}

struct ScriptedInstance {
    text: String,
    confidence: f32,
}

impl OcrEngine for ScriptedEngine {
    fn create_instance(
        &self,
        _languages: &[String],
        _mode: EngineMode,
    ) -> Result<Box<dyn OcrInstance>> {
        let (text, confidence) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(("", 0.0));
        Ok(Box::new(ScriptedInstance {
            text: text.to_string(),
            confidence,
        }))
    }
}

impl OcrInstance for ScriptedInstance {
    fn set_parameters(&mut self, _params: &EngineParams) -> Result<()> {
        Ok(())
    }

    fn recognize(&mut self, _image: &[u8]) -> Result<Recognition> {
        Ok(Recognition {
            text: self.text.clone(),
            confidence: self.confidence,
        })
    }
}

fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::new_luma8(400, 300);
    let mut out = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn test_config() -> ExtractionConfig {
    ExtractionConfig {
        preprocess: PreprocessConfig {
            variants: vec![Variant::ArabicConservative, Variant::HighContrast],
            ..PreprocessConfig::default()
        },
        max_preprocessing_attempts: 2,
        ..ExtractionConfig::default()
    }
}

fn ara() -> Vec<String> {
    vec!["ara".to_string()]
}

#[tokio::test]
async fn degraded_engine_output_is_enhanced() {
    // Split article, spaced single letters, and a hamza-seated alef.
    let engine = ScriptedEngine::new(&[("قرأ م ح م د ال كتاب", 90.0)]);
    let extractor = TextExtractor::with_engine(engine, test_config()).unwrap();

    let report = extractor.extract(&png_bytes(), &ara()).await;
    assert_eq!(report.text, "قرا محمد الكتاب");
    assert_eq!(report.recognition.confidence, 90.0);
    assert_eq!(report.recognition.attempts.len(), 1);
}

#[tokio::test]
async fn search_text_carries_affix_variants() {
    let engine = ScriptedEngine::new(&[("والكتاب", 95.0)]);
    let extractor = TextExtractor::with_engine(engine, test_config()).unwrap();

    let report = extractor.extract(&png_bytes(), &ara()).await;
    assert_eq!(report.search_text, "والكتاب الكتاب كتاب");
}

#[tokio::test]
async fn low_confidence_walks_the_strategy_ladder() {
    // Two weak preprocessed attempts, then the original image wins.
    let engine = ScriptedEngine::new(&[
        ("ضجيج", 20.0),
        ("ضجيج اخر", 25.0),
        ("نص المستند الحقيقي هنا", 88.0),
    ]);
    let extractor = TextExtractor::with_engine(engine, test_config()).unwrap();

    let report = extractor.extract(&png_bytes(), &ara()).await;
    assert_eq!(report.recognition.strategy, "original");
    assert_eq!(report.recognition.confidence, 88.0);
    assert_eq!(report.recognition.attempts.len(), 3);
    assert_eq!(report.text, "نص المستند الحقيقي هنا");
}

#[tokio::test]
async fn exhausted_run_reports_zero_quality() {
    let engine = ScriptedEngine::new(&[]);
    let extractor = TextExtractor::with_engine(engine, test_config()).unwrap();

    let report = extractor.extract(&png_bytes(), &ara()).await;
    assert_eq!(report.text, "");
    assert_eq!(report.quality.score, 0);
    assert_eq!(report.recognition.strategy, "none");
    assert!(!report.recognition.attempts.is_empty());
}

#[tokio::test]
async fn quality_report_flags_residual_noise() {
    // Mixed-script runs survive enhancement and should be flagged.
    let engine = ScriptedEngine::new(&[("نصzظاهر في مستند قديم وطويل نسبيا", 90.0)]);
    let extractor = TextExtractor::with_engine(engine, test_config()).unwrap();

    let report = extractor.extract(&png_bytes(), &ara()).await;
    assert!(report.quality.score < 100);
    assert!(report
        .quality
        .issues
        .iter()
        .any(|i| i.contains("transition")));
}

#[tokio::test]
async fn extract_from_path_reads_image_file() {
    let engine = ScriptedEngine::new(&[("نص من ملف", 92.0)]);
    let extractor = TextExtractor::with_engine(engine, test_config()).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&png_bytes()).unwrap();
    file.flush().unwrap();

    let report = extractor
        .extract_from_path(file.path(), &ara())
        .await
        .unwrap();
    assert_eq!(report.text, "نص من ملف");
}

#[tokio::test]
async fn extract_from_missing_path_is_an_io_error() {
    let engine = ScriptedEngine::new(&[]);
    let extractor = TextExtractor::with_engine(engine, test_config()).unwrap();

    let result = extractor
        .extract_from_path("/nonexistent/page.png".as_ref(), &ara())
        .await;
    assert!(matches!(result, Err(raqim::RaqimError::Io(_))));
}

#[tokio::test]
async fn pre_cancelled_run_returns_immediately() {
    let engine = ScriptedEngine::new(&[("نص", 90.0)]);
    let token = CancellationToken::new();
    token.cancel();
    let extractor = TextExtractor::with_engine(engine, test_config())
        .unwrap()
        .with_cancellation(token);

    let report = extractor.extract(&png_bytes(), &ara()).await;
    assert!(report.recognition.cancelled);
    assert_eq!(report.recognition.attempts.len(), 0);
    assert_eq!(report.text, "");
}

#[tokio::test]
async fn thresholds_gate_stage_entry() {
    // An 86 at the first variant clears the 85 preprocessed threshold, so
    // nothing else runs even though a later script step would score higher.
    let engine = ScriptedEngine::new(&[("نتيجة كافية", 86.0), ("افضل", 99.0)]);
    let mut config = test_config();
    config.thresholds = StageThresholds::default();
    let extractor = TextExtractor::with_engine(engine, config).unwrap();

    let report = extractor.extract(&png_bytes(), &ara()).await;
    assert_eq!(report.recognition.attempts.len(), 1);
    assert_eq!(report.recognition.confidence, 86.0);
}
