//! End-to-end extraction pipeline: recognition, enhancement, quality
//! scoring, and the search-ready form of the text.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::ocr::engine::{OcrEngine, TesseractEngine};
use crate::ocr::strategy::{RecognitionOutcome, StrategyOrchestrator};
use crate::search;
use crate::text::{enhance, quality, quality::QualityReport};

/// Everything one extraction produces.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Enhanced text, the form meant for storage and display.
    pub text: String,
    /// Search-normalized form with affix variants, meant for indexing.
    pub search_text: String,
    pub quality: QualityReport,
    /// The raw recognition outcome, including the attempt trace.
    pub recognition: RecognitionOutcome,
}

/// Facade over the whole pipeline. Construct once, reuse across images;
/// each run creates its own engine instances.
pub struct TextExtractor {
    orchestrator: StrategyOrchestrator,
}

impl TextExtractor {
    /// Build an extractor backed by the system OCR engine.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let engine = Arc::new(TesseractEngine::new(&config.engine));
        Self::with_engine(engine, config)
    }

    /// Build an extractor over any engine implementation.
    pub fn with_engine(engine: Arc<dyn OcrEngine>, config: ExtractionConfig) -> Result<Self> {
        Ok(Self {
            orchestrator: StrategyOrchestrator::new(engine, config)?,
        })
    }

    /// Attach an external cancellation signal; see
    /// [`StrategyOrchestrator::with_cancellation`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.orchestrator = self.orchestrator.with_cancellation(token);
        self
    }

    /// Extract text from encoded image bytes.
    pub async fn extract(&self, image: &[u8], languages: &[String]) -> ExtractionReport {
        let recognition = self.orchestrator.run(image, languages).await;
        let text = enhance::enhance(&recognition.text);
        let quality = quality::score(&text);
        let search_text = search::normalize_for_index(&text);
        info!(
            chars = text.chars().count(),
            confidence = recognition.confidence,
            quality = quality.score,
            strategy = %recognition.strategy,
            "Extraction complete"
        );
        ExtractionReport {
            text,
            search_text,
            quality,
            recognition,
        }
    }

    /// Extract text from an image file on disk.
    pub async fn extract_from_path(
        &self,
        path: &Path,
        languages: &[String],
    ) -> Result<ExtractionReport> {
        let bytes = tokio::fs::read(path).await?;
        Ok(self.extract(&bytes, languages).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineMode;
    use crate::error::Result;
    use crate::ocr::engine::{EngineParams, OcrInstance, Recognition};

    /// Engine that always recognizes the same text.
    struct FixedEngine {
        text: &'static str,
        confidence: f32,
    }

    struct FixedInstance {
        text: String,
        confidence: f32,
    }

    impl OcrEngine for FixedEngine {
        fn create_instance(
            &self,
            _languages: &[String],
            _mode: EngineMode,
        ) -> Result<Box<dyn OcrInstance>> {
            Ok(Box::new(FixedInstance {
                text: self.text.to_string(),
                confidence: self.confidence,
            }))
        }
    }

    impl OcrInstance for FixedInstance {
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
        let img = image::DynamicImage::new_luma8(320, 320);
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[tokio::test]
    async fn test_report_carries_enhanced_and_search_forms() {
        // Raw engine output with a split article and a hamza-seated alef.
        let engine = Arc::new(FixedEngine {
            text: "قرأ ال كتاب",
            confidence: 90.0,
        });
        let extractor =
            TextExtractor::with_engine(engine, ExtractionConfig::default()).unwrap();

        let report = extractor
            .extract(&png_bytes(), &["ara".to_string()])
            .await;
        assert_eq!(report.text, "قرا الكتاب");
        assert!(report.search_text.contains("كتاب"));
        assert_eq!(report.recognition.confidence, 90.0);
        assert!(report.quality.score > 0);
    }

    #[tokio::test]
    async fn test_empty_recognition_yields_zero_quality() {
        let engine = Arc::new(FixedEngine {
            text: "",
            confidence: 0.0,
        });
        let extractor =
            TextExtractor::with_engine(engine, ExtractionConfig::default()).unwrap();

        let report = extractor
            .extract(&png_bytes(), &["ara".to_string()])
            .await;
        assert_eq!(report.text, "");
        assert_eq!(report.quality.score, 0);
        assert_eq!(report.recognition.strategy, "none");
    }
}
