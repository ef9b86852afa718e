// PlaybackController Service
// Wraps the active audio handle and runs the cosmetic BPM/genre detector
//
// The detector is pseudo-random: it never looks at audio content.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::task::JoinHandle;

use crate::models::{
    format_file_size, format_time, AudioFile, MusicProperties, PlaybackStatus, GENRE_LABELS,
    GENRE_PENDING,
};
use crate::services::{emit_event, EventSink, EVENT_MUSIC_PROPERTIES, EVENT_PLAYBACK_STATUS};

pub const DEFAULT_VOLUME: f32 = 0.7;
const BPM_RANGE: std::ops::Range<u32> = 60..140;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("Please select a valid audio file (got {0})")]
    UnsupportedAudioType(String),

    #[error("Please upload a music file first")]
    PlaybackUnavailable,

    #[error("Error loading audio file: {0}")]
    AudioLoadFailure(String),

    #[error("Error playing audio file: {0}")]
    PlaybackFailed(String),
}

/// Audio output owned by the controller. One at a time; replaced on file change.
pub trait AudioHandle: Send {
    fn load(&mut self, file: &AudioFile) -> Result<(), String>;
    fn play(&mut self) -> Result<(), String>;
    fn pause(&mut self);
    fn set_position(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f32);
}

/// Handle for audio rendered by the client. It only records the commanded state;
/// the client reports real progress through `on_time_update`.
#[derive(Debug, Default)]
pub struct MirroredAudioHandle {
    pub source: Option<String>,
    pub playing: bool,
    pub position: f64,
    pub volume: f32,
}

impl AudioHandle for MirroredAudioHandle {
    fn load(&mut self, file: &AudioFile) -> Result<(), String> {
        self.source = Some(file.name.clone());
        self.position = 0.0;
        self.playing = false;
        Ok(())
    }

    fn play(&mut self) -> Result<(), String> {
        if self.source.is_none() {
            return Err("no source loaded".to_string());
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_position(&mut self, seconds: f64) {
        self.position = seconds;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}

struct PlaybackInner {
    handle: Option<Box<dyn AudioHandle>>,
    file: Option<AudioFile>,
    is_playing: bool,
    current_time: f64,
    duration: f64,
    volume: f32,
    properties: Option<MusicProperties>,
    // Bumped on every load/remove so a stale detector can tell it was superseded
    load_seq: u64,
    detection: Option<JoinHandle<()>>,
}

impl PlaybackInner {
    fn cancel_detection(&mut self) {
        if let Some(task) = self.detection.take() {
            task.abort();
        }
    }

    fn reset_track(&mut self) {
        self.cancel_detection();
        self.is_playing = false;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.properties = None;
        self.load_seq += 1;
    }

    fn status(&self) -> PlaybackStatus {
        let progress_percent = if self.duration > 0.0 {
            (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        PlaybackStatus {
            file_name: self.file.as_ref().map(|f| f.name.clone()),
            file_size: self.file.as_ref().map(|f| format_file_size(f.size_bytes)),
            is_playing: self.is_playing,
            current_time: self.current_time,
            duration: self.duration,
            progress_percent,
            current_time_label: format_time(self.current_time),
            duration_label: format_time(self.duration),
            volume: self.volume,
            bpm: self.properties.as_ref().map(|p| p.bpm).unwrap_or(0),
            genre: self
                .properties
                .as_ref()
                .map(|p| p.genre.clone())
                .unwrap_or_else(|| GENRE_PENDING.to_string()),
        }
    }
}

pub struct PlaybackController {
    inner: Arc<Mutex<PlaybackInner>>,
    detection_delay: Duration,
    event_sink: Arc<dyn EventSink>,
}

impl PlaybackController {
    pub fn new(detection_delay: Duration, event_sink: Arc<dyn EventSink>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PlaybackInner {
                handle: None,
                file: None,
                is_playing: false,
                current_time: 0.0,
                duration: 0.0,
                volume: DEFAULT_VOLUME,
                properties: None,
                load_seq: 0,
                detection: None,
            })),
            detection_delay,
            event_sink,
        }
    }

    /// Swap in a new file and handle. The previous handle is paused and dropped.
    pub fn load(
        &self,
        file: AudioFile,
        mut handle: Box<dyn AudioHandle>,
    ) -> Result<PlaybackStatus, PlaybackError> {
        if !file.is_audio() {
            log::warn!("Rejected non-audio file '{}' ({})", file.name, file.mime_type);
            return Err(PlaybackError::UnsupportedAudioType(file.mime_type));
        }

        handle.load(&file).map_err(|e| {
            log::error!("Failed to load audio file '{}': {e}", file.name);
            PlaybackError::AudioLoadFailure(e)
        })?;

        let status = {
            let mut inner = self.lock();
            if let Some(mut previous) = inner.handle.take() {
                previous.pause();
            }
            inner.reset_track();
            handle.set_volume(inner.volume);
            log::info!(
                "Loaded audio file '{}' ({})",
                file.name,
                format_file_size(file.size_bytes)
            );
            inner.handle = Some(handle);
            inner.file = Some(file);
            inner.status()
        };
        self.emit_status(&status);
        Ok(status)
    }

    /// Stop playback and forget the current file
    pub fn remove(&self) -> PlaybackStatus {
        let status = {
            let mut inner = self.lock();
            if let Some(mut handle) = inner.handle.take() {
                handle.pause();
            }
            inner.file = None;
            inner.reset_track();
            inner.status()
        };
        log::info!("Audio file removed");
        self.emit_status(&status);
        status
    }

    /// Play if paused, pause if playing. Returns the new playing state.
    pub fn toggle(&self) -> Result<bool, PlaybackError> {
        let status = {
            let mut inner = self.lock();
            let was_playing = inner.is_playing;
            let handle = inner
                .handle
                .as_mut()
                .ok_or(PlaybackError::PlaybackUnavailable)?;
            if was_playing {
                handle.pause();
            } else {
                handle.play().map_err(|e| {
                    log::error!("Error playing audio: {e}");
                    PlaybackError::PlaybackFailed(e)
                })?;
            }
            inner.is_playing = !was_playing;
            inner.status()
        };
        self.emit_status(&status);
        Ok(status.is_playing)
    }

    /// Jump to `fraction` of the duration. Ignored until the duration is known.
    pub fn seek(&self, fraction: f64) -> PlaybackStatus {
        self.reposition(|_, duration| fraction.clamp(0.0, 1.0) * duration)
    }

    /// Move by `delta` seconds, clamped to the track
    pub fn skip(&self, delta: f64) -> PlaybackStatus {
        self.reposition(|current, duration| (current + delta).clamp(0.0, duration))
    }

    pub fn set_volume(&self, volume: f32) -> f32 {
        let mut inner = self.lock();
        if volume.is_finite() {
            inner.volume = volume.clamp(0.0, 1.0);
        }
        let applied = inner.volume;
        if let Some(handle) = inner.handle.as_mut() {
            handle.set_volume(applied);
        }
        applied
    }

    /// Record the duration and arm the one-shot property detector
    pub fn on_metadata_loaded(&self, duration: f64) -> PlaybackStatus {
        let status = {
            let mut inner = self.lock();
            inner.duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
            inner.cancel_detection();
            inner.properties = None;
            inner.detection = self.spawn_detection(inner.load_seq);
            inner.status()
        };
        self.emit_status(&status);
        status
    }

    pub fn on_time_update(&self, current_time: f64) -> PlaybackStatus {
        let mut inner = self.lock();
        if current_time.is_finite() {
            inner.current_time = if inner.duration > 0.0 {
                current_time.clamp(0.0, inner.duration)
            } else {
                current_time.max(0.0)
            };
        }
        inner.status()
    }

    pub fn on_ended(&self) -> PlaybackStatus {
        let status = {
            let mut inner = self.lock();
            inner.is_playing = false;
            inner.status()
        };
        self.emit_status(&status);
        status
    }

    pub fn status(&self) -> PlaybackStatus {
        self.lock().status()
    }

    fn reposition<F>(&self, target: F) -> PlaybackStatus
    where
        F: FnOnce(f64, f64) -> f64,
    {
        let status = {
            let mut inner = self.lock();
            if inner.handle.is_none() || inner.duration <= 0.0 {
                return inner.status();
            }
            let position = target(inner.current_time, inner.duration);
            inner.current_time = position;
            if let Some(handle) = inner.handle.as_mut() {
                handle.set_position(position);
            }
            inner.status()
        };
        self.emit_status(&status);
        status
    }

    fn spawn_detection(&self, load_seq: u64) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                log::warn!("No async runtime available, skipping music property detection");
                return None;
            }
        };

        let inner = Arc::clone(&self.inner);
        let event_sink = Arc::clone(&self.event_sink);
        let delay = self.detection_delay;
        Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let properties = random_properties();
            {
                let mut guard = inner.lock().unwrap_or_else(|e| e.into_inner());
                if guard.load_seq != load_seq {
                    return;
                }
                guard.properties = Some(properties.clone());
                guard.detection = None;
            }
            log::debug!(
                "Detected (simulated) {} BPM, genre {}",
                properties.bpm,
                properties.genre
            );
            emit_event(event_sink.as_ref(), EVENT_MUSIC_PROPERTIES, &properties);
        }))
    }

    fn emit_status(&self, status: &PlaybackStatus) {
        emit_event(self.event_sink.as_ref(), EVENT_PLAYBACK_STATUS, status);
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackInner> {
        self.inner.lock().unwrap_or_else(|e| {
            log::warn!("Playback lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.lock().cancel_detection();
    }
}

fn random_properties() -> MusicProperties {
    let mut rng = rand::thread_rng();
    let bpm = rng.gen_range(BPM_RANGE);
    let genre = GENRE_LABELS
        .choose(&mut rng)
        .copied()
        .unwrap_or(GENRE_LABELS[0]);
    MusicProperties {
        bpm,
        genre: genre.to_string(),
    }
}
