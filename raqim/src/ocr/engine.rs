use std::sync::Arc;

use leptess::{LepTess, Variable};
use tracing::{debug, warn};

use crate::config::{EngineConfig, EngineMode, SegmentationMode};
use crate::error::{RaqimError, Result};

/// Raw output of one recognition invocation.
#[derive(Debug, Clone)]
pub struct Recognition {
    pub text: String,
    /// Engine-reported confidence in [0, 100].
    pub confidence: f32,
}

/// Parameter set passed through verbatim to the engine for one attempt.
/// The pipeline never interprets these values, it only selects which
/// combination to try next.
#[derive(Debug, Clone, Default)]
pub struct EngineParams {
    pub segmentation: Option<SegmentationMode>,
    pub preserve_interword_spaces: bool,
    pub heavy_noise_removal: bool,
    pub non_dict_penalty: Option<f32>,
    pub non_freq_dict_penalty: Option<f32>,
    pub dpi: Option<u32>,
}

impl EngineParams {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            segmentation: None,
            preserve_interword_spaces: config.preserve_interword_spaces,
            heavy_noise_removal: config.heavy_noise_removal,
            non_dict_penalty: config.non_dict_penalty,
            non_freq_dict_penalty: config.non_freq_dict_penalty,
            dpi: config.dpi,
        }
    }

    pub fn with_segmentation(mut self, mode: SegmentationMode) -> Self {
        self.segmentation = Some(mode);
        self
    }
}

/// The recognition capability boundary. Call sites depend on this trait,
/// never on the concrete engine, so tests can inject scripted engines.
pub trait OcrEngine: Send + Sync {
    /// Acquire a fresh engine instance for the given language set and
    /// engine mode. Instances are single-use and released by drop.
    fn create_instance(
        &self,
        languages: &[String],
        mode: EngineMode,
    ) -> Result<Box<dyn OcrInstance>>;
}

/// One live engine instance. Dropping it releases the underlying engine
/// resources on every exit path, including mid-recognition failure.
pub trait OcrInstance: Send {
    fn set_parameters(&mut self, params: &EngineParams) -> Result<()>;
    fn recognize(&mut self, image: &[u8]) -> Result<Recognition>;
}

/// Wraps the engine capability with scoped instance lifecycle and the
/// language fallback policy.
#[derive(Clone)]
pub struct RecognitionAdapter {
    engine: Arc<dyn OcrEngine>,
    fallback_language: String,
}

impl RecognitionAdapter {
    pub fn new(engine: Arc<dyn OcrEngine>, fallback_language: impl Into<String>) -> Self {
        Self {
            engine,
            fallback_language: fallback_language.into(),
        }
    }

    /// Run one recognition attempt: acquire an instance, configure it,
    /// recognize, and release. The instance is dropped on every path out of
    /// this function, success or failure.
    ///
    /// Blocking; callers run it under a blocking task.
    pub fn recognize(
        &self,
        image: &[u8],
        languages: &[String],
        mode: EngineMode,
        params: &EngineParams,
    ) -> Result<Recognition> {
        let mut instance = self.acquire(languages, mode)?;
        instance.set_parameters(params)?;
        let mut recognition = instance.recognize(image)?;
        recognition.confidence = recognition.confidence.clamp(0.0, 100.0);
        Ok(recognition)
    }

    /// Acquire an instance, retrying once with the baseline language when
    /// the requested set is rejected (missing or unsupported pack).
    fn acquire(&self, languages: &[String], mode: EngineMode) -> Result<Box<dyn OcrInstance>> {
        match self.engine.create_instance(languages, mode) {
            Ok(instance) => Ok(instance),
            Err(e) => {
                if languages.len() == 1 && languages[0] == self.fallback_language {
                    return Err(e);
                }
                let fallback = [self.fallback_language.clone()];
                warn!(
                    languages = languages.join("+"),
                    fallback = %self.fallback_language,
                    error = %e,
                    "Engine rejected language set, retrying with baseline language"
                );
                self.engine.create_instance(&fallback, mode)
            }
        }
    }
}

/// Tesseract-backed engine via leptess.
pub struct TesseractEngine {
    datapath: Option<String>,
}

impl TesseractEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            datapath: config.datapath.clone(),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn create_instance(
        &self,
        languages: &[String],
        mode: EngineMode,
    ) -> Result<Box<dyn OcrInstance>> {
        let langs = languages.join("+");
        let lt = LepTess::new(self.datapath.as_deref(), &langs).map_err(|e| {
            RaqimError::EngineInit(format!("Failed to initialize engine for '{langs}': {e}"))
        })?;
        debug!(languages = %langs, mode = %mode, "Engine instance created");

        let mut instance = TesseractInstance { lt };
        // The engine mode parameter only takes effect at initialization in
        // some engine builds; setting it here is best-effort.
        instance.set_var(Variable::TesseditOcrEngineMode, mode.as_oem());
        Ok(Box::new(instance))
    }
}

struct TesseractInstance {
    lt: LepTess,
}

impl TesseractInstance {
    /// Unknown or read-only parameters are logged and skipped; a parameter
    /// the engine refuses must not fail the attempt.
    fn set_var(&mut self, var: Variable, value: &str) {
        if let Err(e) = self.lt.set_variable(var, value) {
            warn!(variable = ?var, value, error = %e, "Engine rejected parameter");
        }
    }
}

impl OcrInstance for TesseractInstance {
    fn set_parameters(&mut self, params: &EngineParams) -> Result<()> {
        if let Some(mode) = params.segmentation {
            self.set_var(Variable::TesseditPagesegMode, mode.as_psm());
        }
        self.set_var(
            Variable::PreserveInterwordSpaces,
            if params.preserve_interword_spaces { "1" } else { "0" },
        );
        self.set_var(
            Variable::TextordHeavyNr,
            if params.heavy_noise_removal { "1" } else { "0" },
        );
        if let Some(penalty) = params.non_dict_penalty {
            self.set_var(
                Variable::LanguageModelPenaltyNonDictWord,
                &format!("{penalty}"),
            );
        }
        if let Some(penalty) = params.non_freq_dict_penalty {
            self.set_var(
                Variable::LanguageModelPenaltyNonFreqDictWord,
                &format!("{penalty}"),
            );
        }
        if let Some(dpi) = params.dpi {
            self.set_var(Variable::UserDefinedDpi, &format!("{dpi}"));
        }
        Ok(())
    }

    fn recognize(&mut self, image: &[u8]) -> Result<Recognition> {
        self.lt
            .set_image_from_mem(image)
            .map_err(|e| RaqimError::Recognition(format!("Failed to set image: {e}")))?;
        let text = self
            .lt
            .get_utf8_text()
            .map_err(|e| RaqimError::Recognition(format!("Failed to extract text: {e}")))?;
        // mean_text_conf reports -1 when no text was recognized.
        let confidence = self.lt.mean_text_conf().max(0) as f32;
        Ok(Recognition {
            text: text.trim().to_string(),
            confidence,
        })
    }
}
