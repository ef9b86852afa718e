// Playback Model
// Uploaded audio references and player telemetry

use serde::{Deserialize, Serialize};

/// Genre labels the simulated detector picks from
pub const GENRE_LABELS: [&str; 8] = [
    "Pop",
    "Rock",
    "Electronic",
    "Hip-Hop",
    "Jazz",
    "Classical",
    "Folk",
    "R&B",
];

pub const GENRE_PENDING: &str = "Detecting...";

/// Reference to a user-selected audio file held by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: u64,
}

impl AudioFile {
    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }
}

/// Output of the cosmetic BPM/genre detector. Not derived from audio content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicProperties {
    pub bpm: u32,
    pub genre: String,
}

/// Snapshot of the player for the presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub file_name: Option<String>,
    pub file_size: Option<String>,
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub progress_percent: f64,
    pub current_time_label: String,
    pub duration_label: String,
    pub volume: f32,
    /// Zero until detection completes
    pub bpm: u32,
    pub genre: String,
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Human readable file size with up to two decimals, e.g. `3.5 MB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut index = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    index = index.min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(index as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[index])
}
