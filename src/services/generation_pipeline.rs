// GenerationPipeline Service
// Validates choreography requests, runs the (simulated) compute step and records results
//
// State machine:
//   Idle -> Validating -> Generating -> Succeeded | Failed -> Idle
// Only one run may be in flight; a second call while busy is dropped.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rand::Rng;

use crate::models::{
    is_known_style, GenerationRequest, GenerationResult, PipelineState, PipelineStatus, MAX_AGE,
    MIN_AGE,
};
use crate::services::{
    emit_event, has_dedicated_template, video_steps_for, EventSink, HistoryLedger, PreferenceStore,
    EVENT_GENERATION_COMPLETED, EVENT_GENERATION_FAILED, EVENT_GENERATION_STATE,
};

/// Validation and compute failures. All are recoverable; the pipeline returns to idle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Please upload a music file")]
    MissingFile,

    #[error("Please select a dance style")]
    MissingStyle,

    #[error("Please enter your age")]
    MissingAge,

    #[error("Please enter a valid age (5-100), got {0}")]
    InvalidAge(i64),

    #[error("Please enter your height")]
    MissingHeight,

    #[error("Unknown dance style: {0}")]
    UnknownStyle(String),

    #[error("Failed to generate choreography: {0}")]
    ComputeFailed(String),
}

/// Request fields after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub music_file_name: String,
    pub dance_style: String,
    pub age: u8,
    pub height: String,
}

/// Check a raw request in form order: file, style, age, height, age range, catalog.
pub fn validate_request(request: &GenerationRequest) -> Result<ValidatedRequest, GenerationError> {
    let file = request
        .music_file
        .as_ref()
        .filter(|file| !file.name.is_empty())
        .ok_or(GenerationError::MissingFile)?;

    if request.dance_style.is_empty() {
        return Err(GenerationError::MissingStyle);
    }

    let age = request.age.ok_or(GenerationError::MissingAge)?;

    let height = request.height.trim();
    if height.is_empty() {
        return Err(GenerationError::MissingHeight);
    }

    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(GenerationError::InvalidAge(age));
    }

    if !is_known_style(&request.dance_style) {
        return Err(GenerationError::UnknownStyle(request.dance_style.clone()));
    }

    Ok(ValidatedRequest {
        music_file_name: file.name.clone(),
        dance_style: request.dance_style.clone(),
        // Range checked above
        age: age as u8,
        height: height.to_string(),
    })
}

/// Where a real inference backend would plug in
#[async_trait]
pub trait ComputeBackend: Send + Sync {
    async fn compute(&self, request: &ValidatedRequest) -> Result<(), String>;
}

/// Stand-in for AI compute: sleeps `base + random(0..=jitter)` and always succeeds
pub struct SimulatedCompute {
    base: Duration,
    jitter: Duration,
}

impl SimulatedCompute {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub fn from_millis(base_ms: u64, jitter_ms: u64) -> Self {
        Self::new(Duration::from_millis(base_ms), Duration::from_millis(jitter_ms))
    }

    fn pick_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.base + Duration::from_millis(extra)
    }
}

impl Default for SimulatedCompute {
    fn default() -> Self {
        Self::from_millis(3000, 2000)
    }
}

#[async_trait]
impl ComputeBackend for SimulatedCompute {
    async fn compute(&self, request: &ValidatedRequest) -> Result<(), String> {
        let delay = self.pick_delay();
        log::debug!(
            "Simulating choreography compute for '{}' ({} ms)",
            request.dance_style,
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Result of a `generate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Completed(GenerationResult),
    /// Another run was in flight; nothing happened
    AlreadyRunning,
}

pub struct GenerationPipeline {
    busy: AtomicBool,
    state: Mutex<PipelineState>,
    last_id: AtomicI64,
    backend: Arc<dyn ComputeBackend>,
    preferences: Arc<PreferenceStore>,
    history: Arc<HistoryLedger>,
    event_sink: Arc<dyn EventSink>,
}

impl GenerationPipeline {
    pub fn new(
        backend: Arc<dyn ComputeBackend>,
        preferences: Arc<PreferenceStore>,
        history: Arc<HistoryLedger>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            busy: AtomicBool::new(false),
            state: Mutex::new(PipelineState::Idle),
            last_id: AtomicI64::new(0),
            backend,
            preferences,
            history,
            event_sink,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            state: self.state(),
            busy: self.is_busy(),
        }
    }

    /// Run one generation. Appends the result to the history ledger on success.
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerateOutcome, GenerationError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Generation already in progress, ignoring request");
            return Ok(GenerateOutcome::AlreadyRunning);
        }
        // Returns the pipeline to Idle and clears `busy` on every exit path
        let _guard = BusyGuard { pipeline: self };

        self.set_state(PipelineState::Validating);
        let validated = match validate_request(&request) {
            Ok(validated) => validated,
            Err(e) => {
                log::info!("Generation request rejected: {e}");
                return Err(e);
            }
        };

        self.set_state(PipelineState::Generating);
        log::info!(
            "Generating {} choreography for '{}' (age {})",
            validated.dance_style,
            validated.music_file_name,
            validated.age
        );

        if let Err(e) = self.backend.compute(&validated).await {
            log::error!("Choreography generation failed: {e}");
            self.set_state(PipelineState::Failed);
            let error = GenerationError::ComputeFailed(e);
            emit_event(
                self.event_sink.as_ref(),
                EVENT_GENERATION_FAILED,
                &error.to_string(),
            );
            return Err(error);
        }

        let result = self.build_result(validated);
        self.set_state(PipelineState::Succeeded);
        self.history.append(result.clone());
        emit_event(self.event_sink.as_ref(), EVENT_GENERATION_COMPLETED, &result);
        log::info!(
            "Generated {} steps for {} (id {})",
            result.video_steps.len(),
            result.dance_style,
            result.id
        );

        Ok(GenerateOutcome::Completed(result))
    }

    fn build_result(&self, request: ValidatedRequest) -> GenerationResult {
        if !has_dedicated_template(&request.dance_style) {
            log::debug!("No dedicated template for {}, using generic steps", request.dance_style);
        }
        let id = self.next_id();
        let created_at = Utc
            .timestamp_millis_opt(id)
            .single()
            .unwrap_or_else(Utc::now);
        GenerationResult {
            id,
            created_at,
            video_steps: video_steps_for(&request.dance_style),
            music_file_name: request.music_file_name,
            dance_style: request.dance_style,
            age: request.age,
            height_descriptor: request.height,
            height_unit: self.preferences.height_unit(),
            quality: self.preferences.video_quality(),
        }
    }

    /// Creation-time millis, bumped when the clock hasn't moved past the last id
    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1)
    }

    fn set_state(&self, state: PipelineState) {
        self.write_state(state);
        self.emit_state();
    }

    fn write_state(&self, state: PipelineState) {
        let mut current = self.state.lock().unwrap_or_else(|e| {
            log::warn!("Pipeline state lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        *current = state;
        log::debug!("Generation pipeline -> {}", state.as_str());
    }

    fn emit_state(&self) {
        emit_event(self.event_sink.as_ref(), EVENT_GENERATION_STATE, &self.status());
    }
}

struct BusyGuard<'a> {
    pipeline: &'a GenerationPipeline,
}

impl Drop for BusyGuard<'_> {
    // Idle must land before `busy` clears, or it could overwrite the next run's state
    fn drop(&mut self) {
        self.pipeline.write_state(PipelineState::Idle);
        self.pipeline.busy.store(false, Ordering::SeqCst);
        self.pipeline.emit_state();
    }
}
