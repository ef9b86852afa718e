// Application Context
// Shared service handles passed to every command

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::models::Settings;
use crate::services::{
    ComputeBackend, EventSink, GenerationPipeline, HistoryLedger, PlaybackController,
    PreferenceStore, SessionCache, SimulatedCompute,
};

#[derive(Clone)]
pub struct AppContext {
    pub preferences: Arc<PreferenceStore>,
    pub history: Arc<HistoryLedger>,
    pub pipeline: Arc<GenerationPipeline>,
    pub playback: Arc<PlaybackController>,
    pub log_dir: PathBuf,
}

impl AppContext {
    pub fn new(settings: &Settings, event_sink: Arc<dyn EventSink>) -> Self {
        let backend = Arc::new(SimulatedCompute::from_millis(
            settings.generation_base_ms,
            settings.generation_jitter_ms,
        ));
        Self::with_backend(settings, backend, event_sink)
    }

    /// Wire services together. Preferences load first so they are applied before anything runs.
    pub fn with_backend(
        settings: &Settings,
        backend: Arc<dyn ComputeBackend>,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        let cache = Arc::new(SessionCache::new());
        let preferences = Arc::new(PreferenceStore::new(cache.clone(), event_sink.clone()));
        let history = Arc::new(HistoryLedger::new(cache, event_sink.clone()));
        let pipeline = Arc::new(GenerationPipeline::new(
            backend,
            preferences.clone(),
            history.clone(),
            event_sink.clone(),
        ));
        let playback = Arc::new(PlaybackController::new(
            Duration::from_millis(settings.detection_delay_ms),
            event_sink,
        ));

        Self {
            preferences,
            history,
            pipeline,
            playback,
            log_dir: PathBuf::from(&settings.log_dir),
        }
    }
}
