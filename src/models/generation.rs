// Generation Model
// Choreography requests, results and pipeline state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AudioFile, VideoQuality};

pub const MIN_AGE: i64 = 5;
pub const MAX_AGE: i64 = 100;
pub const STEPS_PER_RESULT: usize = 6;

/// Unit the height field was entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Cm,
    Ft,
}

impl HeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Ft => "ft",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            HeightUnit::Cm => HeightUnit::Ft,
            HeightUnit::Ft => HeightUnit::Cm,
        }
    }

    /// Input hint shown in the height field
    pub fn placeholder(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "170",
            HeightUnit::Ft => "5'8\"",
        }
    }
}

/// Raw form input. Every field is optional here; the pipeline validates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub music_file: Option<AudioFile>,
    #[serde(default)]
    pub dance_style: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub height: String,
}

/// One tutorial step in a generated choreography
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStep {
    pub title: String,
    /// `m:ss`
    pub duration: String,
    pub description: String,
}

/// A completed mock choreography. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub music_file_name: String,
    pub dance_style: String,
    pub age: u8,
    pub height_descriptor: String,
    pub height_unit: HeightUnit,
    pub video_steps: Vec<VideoStep>,
    pub quality: VideoQuality,
}

/// Generation pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    #[default]
    Idle,
    Validating,
    Generating,
    Succeeded,
    Failed,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Validating => "validating",
            PipelineState::Generating => "generating",
            PipelineState::Succeeded => "succeeded",
            PipelineState::Failed => "failed",
        }
    }
}

/// Pipeline status for API responses
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStatus {
    pub state: PipelineState,
    pub busy: bool,
}

/// Condensed history row for list rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub id: i64,
    pub dance_style: String,
    pub age: u8,
    pub height_descriptor: String,
    pub music_file_name: String,
    pub relative_time: String,
}
