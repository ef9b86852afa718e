// Settings Model
// Server configuration, read from the environment at startup

use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8010
}

fn default_log_dir() -> String {
    "data/logs".to_string()
}

fn default_log_retention_days() -> u32 {
    30
}

fn default_cors_origins() -> String {
    "http://localhost:*,http://127.0.0.1:*".to_string()
}

fn default_rate_limit_per_minute() -> u32 {
    300
}

fn default_generation_base_ms() -> u64 {
    3000
}

fn default_generation_jitter_ms() -> u64 {
    2000
}

fn default_detection_delay_ms() -> u64 {
    2000
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    // Listener
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    // Logging
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,

    // Access control
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    // Simulated timings
    #[serde(default = "default_generation_base_ms")]
    pub generation_base_ms: u64,
    #[serde(default = "default_generation_jitter_ms")]
    pub generation_jitter_ms: u64,
    #[serde(default = "default_detection_delay_ms")]
    pub detection_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_dir: default_log_dir(),
            log_retention_days: default_log_retention_days(),
            api_token: None,
            cors_origins: default_cors_origins(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            generation_base_ms: default_generation_base_ms(),
            generation_jitter_ms: default_generation_jitter_ms(),
            detection_delay_ms: default_detection_delay_ms(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from a key lookup. Unset or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = get("DANCEAI_HOST") {
            settings.host = host;
        }
        if let Some(port) = get("DANCEAI_PORT").and_then(|v| v.parse().ok()) {
            settings.port = port;
        }
        if let Some(dir) = get("DANCEAI_LOG_DIR") {
            settings.log_dir = dir;
        }
        if let Some(days) = get("DANCEAI_LOG_RETENTION_DAYS").and_then(|v| v.parse().ok()) {
            settings.log_retention_days = days;
        }
        settings.api_token = get("DANCEAI_API_TOKEN");
        if let Some(origins) = get("DANCEAI_CORS_ORIGINS") {
            settings.cors_origins = origins;
        }
        if let Some(limit) = get("DANCEAI_RATE_LIMIT").and_then(|v| v.parse().ok()) {
            settings.rate_limit_per_minute = limit;
        }
        if let Some(ms) = get("DANCEAI_GENERATION_BASE_MS").and_then(|v| v.parse().ok()) {
            settings.generation_base_ms = ms;
        }
        if let Some(ms) = get("DANCEAI_GENERATION_JITTER_MS").and_then(|v| v.parse().ok()) {
            settings.generation_jitter_ms = ms;
        }
        if let Some(ms) = get("DANCEAI_DETECTION_DELAY_MS").and_then(|v| v.parse().ok()) {
            settings.detection_delay_ms = ms;
        }

        settings
    }
}
