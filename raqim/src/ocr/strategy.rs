//! Multi-strategy recognition orchestration.
//!
//! Attempts run strictly sequentially in a fixed stage order; each engine
//! invocation holds significant CPU and memory, so nothing here runs
//! concurrently. The only state shared across attempts is the best-result
//! accumulator.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{EngineMode, ExtractionConfig};
use crate::error::Result;
use crate::ocr::engine::{EngineParams, OcrEngine, Recognition, RecognitionAdapter};
use crate::ocr::preprocess;

/// A phase of the fixed attempt sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PreprocessedVariants,
    Original,
    SegmentationModes,
    LanguageCombinations,
    EngineModes,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PreprocessedVariants => write!(f, "preprocessed_variants"),
            Self::Original => write!(f, "original"),
            Self::SegmentationModes => write!(f, "segmentation_modes"),
            Self::LanguageCombinations => write!(f, "language_combinations"),
            Self::EngineModes => write!(f, "engine_modes"),
        }
    }
}

/// One completed recognition attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub stage: Stage,
    pub strategy: String,
    pub confidence: f32,
    pub elapsed_ms: u64,
}

/// One attempt that failed and was recovered locally.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedAttempt {
    pub stage: Stage,
    pub strategy: String,
    pub reason: String,
}

/// Best attempt seen so far. Confidence is monotonically non-decreasing;
/// ties keep the earlier (higher-priority) attempt.
#[derive(Debug, Clone)]
struct BestResult {
    text: String,
    confidence: f32,
    strategy: String,
}

impl BestResult {
    fn none() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            strategy: "none".to_string(),
        }
    }

    fn offer(&mut self, recognition: Recognition, strategy: &str) {
        if recognition.confidence > self.confidence
            || (self.strategy == "none" && !recognition.text.is_empty())
        {
            self.confidence = self.confidence.max(recognition.confidence);
            self.text = recognition.text;
            self.strategy = strategy.to_string();
        }
    }
}

/// Final orchestration output. Absence of any successful attempt is a valid
/// terminal outcome (empty text, confidence 0, strategy "none"), never an
/// error.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionOutcome {
    pub text: String,
    pub confidence: f32,
    pub strategy: String,
    pub attempts: Vec<AttemptRecord>,
    pub skipped: Vec<SkippedAttempt>,
    pub elapsed_ms: u64,
    pub cancelled: bool,
}

/// Sequences variant/parameter combinations against the engine, tracking
/// the best result and applying early-exit and failure-isolation policy.
pub struct StrategyOrchestrator {
    adapter: RecognitionAdapter,
    config: ExtractionConfig,
    cancel: CancellationToken,
}

impl StrategyOrchestrator {
    pub fn new(engine: Arc<dyn OcrEngine>, config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let adapter = RecognitionAdapter::new(engine, config.fallback_language.clone());
        Ok(Self {
            adapter,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Attach an external cancellation signal. Cancellation abandons the
    /// remaining stages and returns the current best result; it is a
    /// normal, non-fatal outcome.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the full attempt sequence on one image.
    pub async fn run(&self, image: &[u8], languages: &[String]) -> RecognitionOutcome {
        let run_start = Instant::now();
        let thresholds = &self.config.thresholds;
        let base_params = EngineParams::from_config(&self.config.engine);
        let default_mode = self
            .config
            .engine_modes
            .first()
            .copied()
            .unwrap_or(EngineMode::LstmOnly);

        let mut best = BestResult::none();
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut skipped: Vec<SkippedAttempt> = Vec::new();
        let mut cancelled = false;
        // Handle of an attempt that outran its budget; drained before any
        // new instance is created so only one engine instance is ever live.
        let mut pending: Option<JoinHandle<Result<Recognition>>> = None;

        'run: {
            // Stage 1: preprocessed variants.
            if self.config.enable_advanced_preprocessing {
                let variants = self
                    .config
                    .preprocess
                    .variants
                    .iter()
                    .take(self.config.max_preprocessing_attempts);
                for variant in variants {
                    if self.check_cancelled(&mut cancelled) {
                        break 'run;
                    }
                    let processed =
                        preprocess::generate(image, *variant, &self.config.preprocess);
                    self.try_attempt(
                        Stage::PreprocessedVariants,
                        format!("variant:{variant}"),
                        processed,
                        languages.to_vec(),
                        default_mode,
                        base_params.clone(),
                        &mut best,
                        &mut attempts,
                        &mut skipped,
                        &mut pending,
                    )
                    .await;
                    if best.confidence >= thresholds.preprocessed {
                        break 'run;
                    }
                }
            }

            // Stage 2: the unmodified original image.
            if best.confidence >= thresholds.original || self.check_cancelled(&mut cancelled) {
                break 'run;
            }
            self.try_attempt(
                Stage::Original,
                "original".to_string(),
                image.to_vec(),
                languages.to_vec(),
                default_mode,
                base_params.clone(),
                &mut best,
                &mut attempts,
                &mut skipped,
                &mut pending,
            )
            .await;
            if best.confidence >= thresholds.original {
                break 'run;
            }

            // Stage 3: alternate segmentation modes on the original image.
            if best.confidence >= thresholds.segmentation {
                break 'run;
            }
            for mode in &self.config.segmentation_modes {
                if self.check_cancelled(&mut cancelled) {
                    break 'run;
                }
                self.try_attempt(
                    Stage::SegmentationModes,
                    format!("psm:{mode}"),
                    image.to_vec(),
                    languages.to_vec(),
                    default_mode,
                    base_params.clone().with_segmentation(*mode),
                    &mut best,
                    &mut attempts,
                    &mut skipped,
                    &mut pending,
                )
                .await;
                if best.confidence >= thresholds.segmentation {
                    break 'run;
                }
            }

            // Stage 4: alternate language-set combinations.
            if best.confidence >= thresholds.languages {
                break 'run;
            }
            for combo in language_combinations(languages, &self.config.fallback_language) {
                if self.check_cancelled(&mut cancelled) {
                    break 'run;
                }
                self.try_attempt(
                    Stage::LanguageCombinations,
                    format!("langs:{}", combo.join("+")),
                    image.to_vec(),
                    combo,
                    default_mode,
                    base_params.clone(),
                    &mut best,
                    &mut attempts,
                    &mut skipped,
                    &mut pending,
                )
                .await;
                if best.confidence >= thresholds.languages {
                    break 'run;
                }
            }

            // Stage 5: alternate engine modes.
            if best.confidence >= thresholds.engine_modes {
                break 'run;
            }
            for mode in &self.config.engine_modes {
                if *mode == default_mode {
                    continue;
                }
                if self.check_cancelled(&mut cancelled) {
                    break 'run;
                }
                self.try_attempt(
                    Stage::EngineModes,
                    format!("oem:{mode}"),
                    image.to_vec(),
                    languages.to_vec(),
                    *mode,
                    base_params.clone(),
                    &mut best,
                    &mut attempts,
                    &mut skipped,
                    &mut pending,
                )
                .await;
                if best.confidence >= thresholds.engine_modes {
                    break 'run;
                }
            }
        }

        // An attempt that timed out at the tail of the run still holds an
        // instance; wait for it so the run ends with zero live instances.
        if let Some(stale) = pending.take() {
            debug!("Waiting for a timed-out attempt to release its engine instance");
            let _ = stale.await;
        }

        let outcome = RecognitionOutcome {
            text: best.text,
            confidence: best.confidence,
            strategy: best.strategy,
            attempts,
            skipped,
            elapsed_ms: run_start.elapsed().as_millis() as u64,
            cancelled,
        };
        info!(
            confidence = outcome.confidence,
            strategy = %outcome.strategy,
            attempts = outcome.attempts.len(),
            skipped = outcome.skipped.len(),
            cancelled = outcome.cancelled,
            elapsed_ms = outcome.elapsed_ms,
            "Recognition run finished"
        );
        outcome
    }

    fn check_cancelled(&self, cancelled: &mut bool) -> bool {
        if self.cancel.is_cancelled() {
            if !*cancelled {
                info!("Cancellation requested, abandoning remaining stages");
            }
            *cancelled = true;
        }
        *cancelled
    }

    /// Run one attempt and fold its result into the accumulators. Failures
    /// are recovered locally: logged, recorded as skipped, and the run
    /// continues.
    #[allow(clippy::too_many_arguments)]
    async fn try_attempt(
        &self,
        stage: Stage,
        strategy: String,
        image: Vec<u8>,
        languages: Vec<String>,
        mode: EngineMode,
        params: EngineParams,
        best: &mut BestResult,
        attempts: &mut Vec<AttemptRecord>,
        skipped: &mut Vec<SkippedAttempt>,
        pending: &mut Option<JoinHandle<Result<Recognition>>>,
    ) {
        match self.invoke(image, languages, mode, params, pending).await {
            Ok((recognition, elapsed)) => {
                debug!(
                    stage = %stage,
                    strategy = %strategy,
                    confidence = recognition.confidence,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Attempt completed"
                );
                attempts.push(AttemptRecord {
                    stage,
                    strategy: strategy.clone(),
                    confidence: recognition.confidence,
                    elapsed_ms: elapsed.as_millis() as u64,
                });
                best.offer(recognition, &strategy);
            }
            Err(reason) => {
                warn!(stage = %stage, strategy = %strategy, reason = %reason, "Attempt failed, continuing");
                skipped.push(SkippedAttempt {
                    stage,
                    strategy,
                    reason,
                });
            }
        }
    }

    /// Invoke the adapter on the blocking pool with the per-attempt budget.
    /// A timed-out blocking task cannot be aborted; its handle is parked in
    /// `pending` and awaited here before the next instance is created, so a
    /// new instance is never acquired while the previous one is unreleased.
    async fn invoke(
        &self,
        image: Vec<u8>,
        languages: Vec<String>,
        mode: EngineMode,
        params: EngineParams,
        pending: &mut Option<JoinHandle<Result<Recognition>>>,
    ) -> std::result::Result<(Recognition, Duration), String> {
        if let Some(stale) = pending.take() {
            debug!("Waiting for a timed-out attempt to release its engine instance");
            let _ = stale.await;
        }

        let adapter = self.adapter.clone();
        let budget = Duration::from_secs(self.config.engine.attempt_timeout_secs);
        let started = Instant::now();

        let mut task = tokio::task::spawn_blocking(move || {
            adapter.recognize(&image, &languages, mode, &params)
        });

        match tokio::time::timeout(budget, &mut task).await {
            Err(_) => {
                *pending = Some(task);
                Err(format!(
                    "attempt timed out after {}s",
                    self.config.engine.attempt_timeout_secs
                ))
            }
            Ok(Err(join_err)) => Err(format!("attempt task panicked: {join_err}")),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Ok(Ok(recognition))) => Ok((recognition, started.elapsed())),
        }
    }
}

/// Derive the stage-four language combinations from the requested set and
/// the baseline language: target-only, the requested set, and the requested
/// set without the target. Duplicates are dropped, order preserved.
fn language_combinations(requested: &[String], baseline: &str) -> Vec<Vec<String>> {
    let mut combos: Vec<Vec<String>> = Vec::new();
    let mut push_unique = |combo: Vec<String>| {
        if !combo.is_empty() && !combos.contains(&combo) {
            combos.push(combo);
        }
    };

    push_unique(vec![baseline.to_string()]);
    push_unique(requested.to_vec());
    push_unique(
        requested
            .iter()
            .filter(|l| l.as_str() != baseline)
            .cloned()
            .collect(),
    );
    combos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PreprocessConfig, StageThresholds};
    use crate::error::RaqimError;
    use crate::ocr::engine::OcrInstance;
    use crate::ocr::preprocess::Variant;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    /// Scripted step for one instance creation.
    #[derive(Clone)]
    enum Step {
        InitFail,
        RecognizeFail,
        Text(&'static str, f32),
        /// Sleeps past the attempt budget before answering.
        Stall(Duration, &'static str, f32),
    }

    /// Mock engine that replays a script and counts live instances.
    struct MockEngine {
        script: Mutex<VecDeque<Step>>,
        live: Arc<AtomicI64>,
        max_live: AtomicI64,
        created: AtomicI64,
    }

    impl MockEngine {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(steps.into()),
                live: Arc::new(AtomicI64::new(0)),
                max_live: AtomicI64::new(0),
                created: AtomicI64::new(0),
            })
        }

        fn live_instances(&self) -> i64 {
            self.live.load(Ordering::SeqCst)
        }

        fn max_live_instances(&self) -> i64 {
            self.max_live.load(Ordering::SeqCst)
        }

        fn created_instances(&self) -> i64 {
            self.created.load(Ordering::SeqCst)
        }
    }

    struct MockInstance {
        step: Step,
        live: Arc<AtomicI64>,
    }

    impl Drop for MockInstance {
        fn drop(&mut self) {
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl OcrEngine for MockEngine {
        fn create_instance(
            &self,
            _languages: &[String],
            _mode: EngineMode,
        ) -> Result<Box<dyn OcrInstance>> {
            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Step::Text("", 0.0));
            if matches!(step, Step::InitFail) {
                return Err(RaqimError::EngineInit("scripted init failure".to_string()));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            let now_live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_live.fetch_max(now_live, Ordering::SeqCst);
            Ok(Box::new(MockInstance {
                step,
                live: Arc::clone(&self.live),
            }))
        }
    }

    impl OcrInstance for MockInstance {
        fn set_parameters(&mut self, _params: &EngineParams) -> Result<()> {
            Ok(())
        }

        fn recognize(&mut self, _image: &[u8]) -> Result<Recognition> {
            match &self.step {
                Step::RecognizeFail => Err(RaqimError::Recognition(
                    "scripted recognition failure".to_string(),
                )),
                Step::Text(text, confidence) => Ok(Recognition {
                    text: text.to_string(),
                    confidence: *confidence,
                }),
                Step::Stall(delay, text, confidence) => {
                    std::thread::sleep(*delay);
                    Ok(Recognition {
                        text: text.to_string(),
                        confidence: *confidence,
                    })
                }
                Step::InitFail => unreachable!(),
            }
        }
    }

    fn test_config() -> ExtractionConfig {
        ExtractionConfig {
            preprocess: PreprocessConfig {
                variants: vec![Variant::HighContrast, Variant::Denoised],
                ..PreprocessConfig::default()
            },
            max_preprocessing_attempts: 2,
            ..ExtractionConfig::default()
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::new_luma8(320, 320);
        let mut out = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn langs() -> Vec<String> {
        vec!["ara".to_string(), "eng".to_string()]
    }

    #[tokio::test]
    async fn test_early_exit_skips_later_stages() {
        // First variant already meets the stage threshold of 85.
        let engine = MockEngine::new(vec![Step::Text("نص واضح", 90.0)]);
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, test_config())
                .unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.confidence, 90.0);
        assert_eq!(outcome.strategy, "variant:high_contrast");
        assert_eq!(engine.created_instances(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_zero_confidence_best() {
        // Everything recognizes nothing; exhaustion is a valid terminal
        // outcome, not an error.
        let engine = MockEngine::new(vec![]);
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, test_config())
                .unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert_eq!(outcome.text, "");
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.strategy, "none");
        // 2 variants + original + 4 segmentation modes + 3 language combos
        // + 1 alternate engine mode.
        assert_eq!(outcome.attempts.len(), 11);
        assert_eq!(engine.live_instances(), 0);
    }

    #[tokio::test]
    async fn test_best_confidence_is_monotone_and_ties_keep_earlier() {
        let engine = MockEngine::new(vec![
            Step::Text("اول", 50.0),
            Step::Text("ثاني", 40.0),
            Step::Text("ثالث", 50.0),
            Step::Text("رابع", 60.0),
        ]);
        let mut config = test_config();
        // Thresholds high enough that nothing exits early.
        config.thresholds = StageThresholds {
            preprocessed: 99.0,
            original: 99.0,
            segmentation: 99.0,
            languages: 99.0,
            engine_modes: 99.0,
        };
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, config).unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        // 50 ties with 50: the earlier attempt wins; 60 replaces it.
        assert_eq!(outcome.confidence, 60.0);
        assert_eq!(outcome.text, "رابع");

        let mut running_best = 0.0f32;
        for attempt in &outcome.attempts {
            running_best = running_best.max(attempt.confidence);
        }
        assert_eq!(running_best, outcome.confidence);
    }

    #[tokio::test]
    async fn test_tie_keeps_earlier_attempt() {
        let engine = MockEngine::new(vec![
            Step::Text("الاول", 55.0),
            Step::Text("الثاني", 55.0),
        ]);
        let mut config = test_config();
        config.thresholds.preprocessed = 55.0;
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, config).unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert_eq!(outcome.text, "الاول");
        assert_eq!(outcome.strategy, "variant:high_contrast");
    }

    #[tokio::test]
    async fn test_failed_attempts_are_isolated_and_recorded() {
        let engine = MockEngine::new(vec![
            Step::RecognizeFail,
            Step::Text("نتيجة جيدة", 92.0),
        ]);
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, test_config())
                .unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert_eq!(outcome.confidence, 92.0);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].stage, Stage::PreprocessedVariants);
        assert_eq!(engine.live_instances(), 0);
    }

    #[tokio::test]
    async fn test_no_instance_leaks_with_injected_faults() {
        let engine = MockEngine::new(vec![
            Step::InitFail,
            Step::InitFail,
            Step::RecognizeFail,
            Step::Text("نص", 30.0),
            Step::RecognizeFail,
        ]);
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, test_config())
                .unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert_eq!(engine.live_instances(), 0, "engine instances leaked");
        assert_eq!(outcome.confidence, 30.0);
    }

    #[tokio::test]
    async fn test_timed_out_attempt_drained_before_next_acquisition() {
        // The first attempt outruns its budget; its instance must be
        // released before the next attempt may create one.
        let engine = MockEngine::new(vec![
            Step::Stall(Duration::from_millis(1500), "بطيء", 90.0),
            Step::Text("سريع", 86.0),
        ]);
        let mut config = test_config();
        config.engine.attempt_timeout_secs = 1;
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, config).unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert_eq!(
            engine.max_live_instances(),
            1,
            "a second instance was acquired while the first was live"
        );
        assert_eq!(engine.live_instances(), 0);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].reason.contains("timed out"));
        assert_eq!(outcome.confidence, 86.0);
    }

    #[tokio::test]
    async fn test_trailing_timeout_drained_before_run_returns() {
        // A timeout on the very last attempt has no later acquisition to
        // drain it; the run itself must wait before returning.
        let mut steps = vec![Step::Text("", 0.0); 10];
        steps.push(Step::Stall(Duration::from_millis(1500), "بطيء", 90.0));
        let engine = MockEngine::new(steps);
        let mut config = test_config();
        config.engine.attempt_timeout_secs = 1;
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, config).unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert_eq!(engine.live_instances(), 0, "run returned with a live instance");
        assert_eq!(outcome.attempts.len(), 10);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].reason.contains("timed out"));
        assert_eq!(outcome.strategy, "none");
    }

    #[tokio::test]
    async fn test_cancellation_returns_current_best() {
        let engine = MockEngine::new(vec![]);
        let token = CancellationToken::new();
        token.cancel();
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, test_config())
                .unwrap()
                .with_cancellation(token);

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert!(outcome.cancelled);
        assert_eq!(outcome.attempts.len(), 0);
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.strategy, "none");
    }

    #[tokio::test]
    async fn test_preprocessing_disabled_skips_stage_one() {
        let engine = MockEngine::new(vec![Step::Text("الاصل", 95.0)]);
        let mut config = test_config();
        config.enable_advanced_preprocessing = false;
        let orchestrator =
            StrategyOrchestrator::new(Arc::clone(&engine) as Arc<dyn OcrEngine>, config).unwrap();

        let outcome = orchestrator.run(&png_bytes(), &langs()).await;
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(outcome.attempts[0].stage, Stage::Original);
        assert_eq!(outcome.strategy, "original");
    }

    #[test]
    fn test_language_combinations_derivation() {
        let requested = vec!["ara".to_string(), "eng".to_string()];
        let combos = language_combinations(&requested, "ara");
        assert_eq!(
            combos,
            vec![
                vec!["ara".to_string()],
                vec!["ara".to_string(), "eng".to_string()],
                vec!["eng".to_string()],
            ]
        );

        // Requesting only the baseline collapses to a single combination.
        let combos = language_combinations(&["ara".to_string()], "ara");
        assert_eq!(combos, vec![vec!["ara".to_string()]]);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let engine = MockEngine::new(vec![]);
        let config = ExtractionConfig {
            max_preprocessing_attempts: 0,
            ..ExtractionConfig::default()
        };
        let result = StrategyOrchestrator::new(engine as Arc<dyn OcrEngine>, config);
        assert!(matches!(result, Err(RaqimError::Config(_))));
    }
}
