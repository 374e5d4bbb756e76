use serde::Deserialize;
use std::env;

use crate::error::{RaqimError, Result};
use crate::ocr::preprocess::Variant;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Page segmentation mode handed through to the recognition engine.
///
/// Values mirror Tesseract PSM numbers; the pipeline only selects which one
/// to try next, it never interprets their effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    Automatic,
    SingleColumn,
    SingleBlock,
    SparseText,
}

impl SegmentationMode {
    pub fn as_psm(&self) -> &'static str {
        match self {
            Self::Automatic => "3",
            Self::SingleColumn => "4",
            Self::SingleBlock => "6",
            Self::SparseText => "11",
        }
    }
}

impl std::fmt::Display for SegmentationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::SingleColumn => write!(f, "single_column"),
            Self::SingleBlock => write!(f, "single_block"),
            Self::SparseText => write!(f, "sparse_text"),
        }
    }
}

/// Recognition algorithm family for one attempt (Tesseract OEM numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    Legacy,
    LstmOnly,
    LegacyLstmCombined,
    EngineDefault,
}

impl EngineMode {
    pub fn as_oem(&self) -> &'static str {
        match self {
            Self::Legacy => "0",
            Self::LstmOnly => "1",
            Self::LegacyLstmCombined => "2",
            Self::EngineDefault => "3",
        }
    }
}

impl std::fmt::Display for EngineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::LstmOnly => write!(f, "lstm_only"),
            Self::LegacyLstmCombined => write!(f, "legacy_lstm_combined"),
            Self::EngineDefault => write!(f, "engine_default"),
        }
    }
}

/// Per-stage early-exit confidence thresholds.
///
/// Different deployments of this pipeline historically shipped with 70, 75
/// or 85 as "the" threshold; none of them is canonical, so every stage gets
/// its own configurable value.
#[derive(Debug, Clone, Deserialize)]
pub struct StageThresholds {
    pub preprocessed: f32,
    pub original: f32,
    pub segmentation: f32,
    pub languages: f32,
    pub engine_modes: f32,
}

impl Default for StageThresholds {
    fn default() -> Self {
        Self {
            preprocessed: 85.0,
            original: 80.0,
            segmentation: 75.0,
            languages: 70.0,
            engine_modes: 70.0,
        }
    }
}

impl StageThresholds {
    fn all(&self) -> [f32; 5] {
        [
            self.preprocessed,
            self.original,
            self.segmentation,
            self.languages,
            self.engine_modes,
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessConfig {
    /// Both dimensions are upscaled to at least this before any other
    /// transform runs; the engine misbehaves on undersized input.
    pub min_dimension: u32,
    /// Inputs larger than this are downscaled, preserving aspect ratio.
    pub max_dimension: u32,
    /// Ordered variant list for the first orchestration stage.
    pub variants: Vec<Variant>,
    /// Explicit binarization threshold. When absent it is computed from
    /// image statistics (see `preprocess::auto_threshold`).
    pub binarize_threshold: Option<u8>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            min_dimension: 300,
            max_dimension: 4096,
            variants: vec![
                Variant::ArabicConservative,
                Variant::HighContrast,
                Variant::Denoised,
                Variant::EnhancedUpscaled,
                Variant::ArabicAggressive,
            ],
            binarize_threshold: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Tesseract data path override. `None` uses the system default.
    pub datapath: Option<String>,
    /// Wall-clock budget for a single recognition attempt.
    pub attempt_timeout_secs: u64,
    pub preserve_interword_spaces: bool,
    /// Heavy noise removal heuristic (`textord_heavy_nr`).
    pub heavy_noise_removal: bool,
    /// Penalty weight for words outside the engine dictionary.
    pub non_dict_penalty: Option<f32>,
    /// Penalty weight for dictionary words with low frequency.
    pub non_freq_dict_penalty: Option<f32>,
    /// Source resolution hint for images without DPI metadata.
    pub dpi: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            datapath: None,
            attempt_timeout_secs: 120,
            preserve_interword_spaces: true,
            heavy_noise_removal: false,
            non_dict_penalty: None,
            non_freq_dict_penalty: None,
            dpi: Some(300),
        }
    }
}

/// Top-level configuration for one extraction pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Baseline language retried when the requested set fails to initialize.
    pub fallback_language: String,
    /// Upper bound on preprocessed-variant attempts (stage one).
    pub max_preprocessing_attempts: usize,
    /// When false, stage one is skipped entirely.
    pub enable_advanced_preprocessing: bool,
    pub thresholds: StageThresholds,
    pub preprocess: PreprocessConfig,
    pub engine: EngineConfig,
    pub segmentation_modes: Vec<SegmentationMode>,
    pub engine_modes: Vec<EngineMode>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_language: "ara".to_string(),
            max_preprocessing_attempts: 4,
            enable_advanced_preprocessing: true,
            thresholds: StageThresholds::default(),
            preprocess: PreprocessConfig::default(),
            engine: EngineConfig::default(),
            segmentation_modes: vec![
                SegmentationMode::SingleBlock,
                SegmentationMode::Automatic,
                SegmentationMode::SingleColumn,
                SegmentationMode::SparseText,
            ],
            engine_modes: vec![EngineMode::LstmOnly, EngineMode::LegacyLstmCombined],
        }
    }
}

impl ExtractionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fallback_language: env::var("RAQIM_FALLBACK_LANGUAGE")
                .unwrap_or(defaults.fallback_language),
            max_preprocessing_attempts: parse_env_or(
                "RAQIM_MAX_PREPROCESSING_ATTEMPTS",
                defaults.max_preprocessing_attempts,
            ),
            enable_advanced_preprocessing: parse_env_or(
                "RAQIM_ENABLE_ADVANCED_PREPROCESSING",
                defaults.enable_advanced_preprocessing,
            ),
            thresholds: StageThresholds {
                preprocessed: parse_env_or(
                    "RAQIM_THRESHOLD_PREPROCESSED",
                    defaults.thresholds.preprocessed,
                ),
                original: parse_env_or("RAQIM_THRESHOLD_ORIGINAL", defaults.thresholds.original),
                segmentation: parse_env_or(
                    "RAQIM_THRESHOLD_SEGMENTATION",
                    defaults.thresholds.segmentation,
                ),
                languages: parse_env_or("RAQIM_THRESHOLD_LANGUAGES", defaults.thresholds.languages),
                engine_modes: parse_env_or(
                    "RAQIM_THRESHOLD_ENGINE_MODES",
                    defaults.thresholds.engine_modes,
                ),
            },
            preprocess: PreprocessConfig {
                min_dimension: parse_env_or("RAQIM_MIN_DIMENSION", defaults.preprocess.min_dimension),
                max_dimension: parse_env_or("RAQIM_MAX_DIMENSION", defaults.preprocess.max_dimension),
                binarize_threshold: parse_env_opt("RAQIM_BINARIZE_THRESHOLD"),
                variants: defaults.preprocess.variants,
            },
            engine: EngineConfig {
                datapath: parse_env_opt("RAQIM_TESSDATA_PATH"),
                attempt_timeout_secs: parse_env_or(
                    "RAQIM_ATTEMPT_TIMEOUT_SECS",
                    defaults.engine.attempt_timeout_secs,
                ),
                dpi: parse_env_opt("RAQIM_SOURCE_DPI").or(defaults.engine.dpi),
                ..defaults.engine
            },
            segmentation_modes: defaults.segmentation_modes,
            engine_modes: defaults.engine_modes,
        }
    }

    /// Reject malformed configuration before orchestration begins. This is
    /// the only error the pipeline ever propagates to its caller.
    pub fn validate(&self) -> Result<()> {
        if self.fallback_language.trim().is_empty() {
            return Err(RaqimError::Config(
                "fallback_language must not be empty".to_string(),
            ));
        }
        if self.max_preprocessing_attempts == 0 {
            return Err(RaqimError::Config(
                "max_preprocessing_attempts must be at least 1".to_string(),
            ));
        }
        for t in self.thresholds.all() {
            if !(0.0..=100.0).contains(&t) {
                return Err(RaqimError::Config(format!(
                    "confidence threshold {t} outside [0, 100]"
                )));
            }
        }
        if self.enable_advanced_preprocessing && self.preprocess.variants.is_empty() {
            return Err(RaqimError::Config(
                "advanced preprocessing enabled but no variants configured".to_string(),
            ));
        }
        if self.preprocess.min_dimension == 0 {
            return Err(RaqimError::Config(
                "min_dimension must be at least 1".to_string(),
            ));
        }
        if self.preprocess.max_dimension < self.preprocess.min_dimension {
            return Err(RaqimError::Config(
                "max_dimension must not be below min_dimension".to_string(),
            ));
        }
        if self.engine.attempt_timeout_secs == 0 {
            return Err(RaqimError::Config(
                "attempt_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
