// Command Dispatch
// Maps named commands with JSON payloads onto the services

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::commands::AppContext;
use crate::models::{AudioFile, GenerationRequest, SettingsOptions, DANCE_STYLES};
use crate::services::{
    read_recent_logs, GenerateOutcome, MirroredAudioHandle, DEFAULT_RECENT_LINES,
};

pub async fn invoke_command(
    ctx: &AppContext,
    command: &str,
    payload: Value,
) -> Result<Value, String> {
    match command {
        // Preferences
        "get_preferences" => Ok(json!({
            "preferences": ctx.preferences.snapshot(),
            "presentation": ctx.preferences.presentation(),
            "heightUnit": ctx.preferences.height_unit(),
        })),
        "get_presentation" => Ok(json!(ctx.preferences.presentation())),
        "get_settings_options" => Ok(json!(SettingsOptions::all())),
        "set_theme" => {
            let theme: String = get_arg(&payload, "theme")?;
            let vars = ctx.preferences.set_theme(&theme).map_err(|e| e.to_string())?;
            Ok(json!(vars))
        }
        "set_color_scheme" => {
            let scheme: String = get_arg(&payload, "scheme")?;
            let vars = ctx
                .preferences
                .set_color_scheme(&scheme)
                .map_err(|e| e.to_string())?;
            Ok(json!(vars))
        }
        "set_animation_level" => {
            let level: String = get_arg(&payload, "level")?;
            let vars = ctx
                .preferences
                .set_animation_level(&level)
                .map_err(|e| e.to_string())?;
            Ok(json!(vars))
        }
        "set_video_quality" => {
            let quality: String = get_arg(&payload, "quality")?;
            let vars = ctx
                .preferences
                .set_video_quality(&quality)
                .map_err(|e| e.to_string())?;
            Ok(json!(vars))
        }
        "toggle_height_unit" => {
            let unit = ctx.preferences.toggle_height_unit();
            Ok(json!({ "heightUnit": unit, "placeholder": unit.placeholder() }))
        }

        // Generation
        "list_dance_styles" => Ok(json!(DANCE_STYLES)),
        "generate_choreography" => {
            let request: GenerationRequest = get_arg(&payload, "request")?;
            match ctx.pipeline.generate(request).await.map_err(|e| e.to_string())? {
                GenerateOutcome::Completed(result) => {
                    Ok(json!({ "status": "completed", "result": result }))
                }
                GenerateOutcome::AlreadyRunning => Ok(json!({ "status": "alreadyRunning" })),
            }
        }
        "get_generation_state" => Ok(json!(ctx.pipeline.status())),

        // History
        "get_history" => Ok(json!(ctx.history.summaries(Utc::now()))),
        "get_history_entry" => {
            let id: i64 = get_arg(&payload, "id")?;
            let entry = ctx
                .history
                .find_by_id(id)
                .ok_or_else(|| format!("History entry not found: {id}"))?;
            Ok(json!(entry))
        }
        "clear_history" => {
            let confirmed: bool = get_opt_arg(&payload, "confirmed")?.unwrap_or(false);
            let cleared = ctx.history.clear(&confirmed);
            Ok(json!({ "cleared": cleared, "count": ctx.history.len() }))
        }

        // Playback
        "load_music_file" => {
            let file: AudioFile = get_arg(&payload, "file")?;
            let status = ctx
                .playback
                .load(file, Box::<MirroredAudioHandle>::default())
                .map_err(|e| e.to_string())?;
            Ok(json!(status))
        }
        "remove_music_file" => Ok(json!(ctx.playback.remove())),
        "playback_status" => Ok(json!(ctx.playback.status())),
        "playback_toggle" => {
            let playing = ctx.playback.toggle().map_err(|e| e.to_string())?;
            Ok(json!({ "isPlaying": playing }))
        }
        "playback_seek" => {
            let fraction: f64 = get_arg(&payload, "fraction")?;
            Ok(json!(ctx.playback.seek(fraction)))
        }
        "playback_skip" => {
            let seconds: f64 = get_arg(&payload, "seconds")?;
            Ok(json!(ctx.playback.skip(seconds)))
        }
        "playback_set_volume" => {
            let volume: f32 = get_arg(&payload, "volume")?;
            Ok(json!({ "volume": ctx.playback.set_volume(volume) }))
        }
        "playback_metadata_loaded" => {
            let duration: f64 = get_arg(&payload, "duration")?;
            Ok(json!(ctx.playback.on_metadata_loaded(duration)))
        }
        "playback_time_update" => {
            let current_time: f64 = get_arg(&payload, "currentTime")?;
            Ok(json!(ctx.playback.on_time_update(current_time)))
        }
        "playback_ended" => Ok(json!(ctx.playback.on_ended())),

        // Logs
        "get_recent_logs" => {
            let max_lines: Option<usize> = get_opt_arg(&payload, "maxLines")?;
            let lines = read_recent_logs(&ctx.log_dir, max_lines.unwrap_or(DEFAULT_RECENT_LINES))
                .map_err(|e| e.to_string())?;
            Ok(json!(lines))
        }

        _ => Err(format!("Unknown command: {command}")),
    }
}

fn get_arg<T: DeserializeOwned>(payload: &Value, key: &str) -> Result<T, String> {
    let obj = payload
        .as_object()
        .ok_or_else(|| "Invalid payload".to_string())?;
    let value = obj
        .get(key)
        .ok_or_else(|| format!("Missing argument: {key}"))?;
    serde_json::from_value(value.clone()).map_err(|e| format!("Invalid {key}: {e}"))
}

fn get_opt_arg<T: DeserializeOwned>(payload: &Value, key: &str) -> Result<Option<T>, String> {
    let obj = match payload {
        Value::Null => return Ok(None),
        Value::Object(obj) => obj,
        _ => return Err("Invalid payload".to_string()),
    };
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| format!("Invalid {key}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use tempfile::tempdir;

    use crate::models::Settings;
    use crate::services::{log_file_path, NoopEventSink, SimulatedCompute};

    fn context() -> AppContext {
        context_with_logs(Path::new("data/logs"))
    }

    fn context_with_logs(log_dir: &Path) -> AppContext {
        let settings = Settings {
            log_dir: log_dir.to_string_lossy().into_owned(),
            ..Settings::default()
        };
        AppContext::with_backend(
            &settings,
            Arc::new(SimulatedCompute::from_millis(0, 0)),
            Arc::new(NoopEventSink),
        )
    }

    fn salsa_request() -> Value {
        json!({
            "request": {
                "musicFile": { "name": "track.mp3", "mimeType": "audio/mpeg", "sizeBytes": 2048 },
                "danceStyle": "Salsa",
                "age": 29,
                "height": "170"
            }
        })
    }

    #[tokio::test]
    async fn test_generate_then_lookup() {
        let ctx = context();
        invoke_command(&ctx, "set_video_quality", json!({ "quality": "1080p" }))
            .await
            .unwrap();

        let out = invoke_command(&ctx, "generate_choreography", salsa_request())
            .await
            .unwrap();
        assert_eq!(out["status"], "completed");
        assert_eq!(out["result"]["quality"], "1080p");
        assert_eq!(out["result"]["videoSteps"][0]["title"], "Basic Salsa Step");

        let id = out["result"]["id"].clone();
        let history = invoke_command(&ctx, "get_history", Value::Null).await.unwrap();
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["relativeTime"], "Just now");

        let entry = invoke_command(&ctx, "get_history_entry", json!({ "id": id }))
            .await
            .unwrap();
        assert_eq!(entry, out["result"]);
    }

    #[tokio::test]
    async fn test_validation_error_is_reported() {
        let ctx = context();
        let mut payload = salsa_request();
        payload["request"]["age"] = json!(4);
        let err = invoke_command(&ctx, "generate_choreography", payload)
            .await
            .unwrap_err();
        assert_eq!(err, "Please enter a valid age (5-100), got 4");
        assert!(ctx.history.is_empty());
    }

    #[tokio::test]
    async fn test_clear_history_needs_confirmation() {
        let ctx = context();
        invoke_command(&ctx, "generate_choreography", salsa_request())
            .await
            .unwrap();

        let out = invoke_command(&ctx, "clear_history", json!({})).await.unwrap();
        assert_eq!(out, json!({ "cleared": false, "count": 1 }));
        let out = invoke_command(&ctx, "clear_history", json!({ "confirmed": true }))
            .await
            .unwrap();
        assert_eq!(out, json!({ "cleared": true, "count": 0 }));
    }

    #[tokio::test]
    async fn test_playback_commands() {
        let ctx = context();
        let err = invoke_command(&ctx, "playback_toggle", json!({})).await.unwrap_err();
        assert_eq!(err, "Please upload a music file first");

        let file = json!({
            "file": { "name": "song.ogg", "mimeType": "audio/ogg", "sizeBytes": 1536 }
        });
        let status = invoke_command(&ctx, "load_music_file", file).await.unwrap();
        assert_eq!(status["fileSize"], "1.5 KB");
        assert_eq!(status["genre"], "Detecting...");

        let out = invoke_command(&ctx, "playback_toggle", json!({})).await.unwrap();
        assert_eq!(out["isPlaying"], true);
        let out = invoke_command(&ctx, "playback_set_volume", json!({ "volume": 2.0 }))
            .await
            .unwrap();
        assert_eq!(out["volume"], 1.0);

        let bad = json!({ "file": { "name": "a.txt", "mimeType": "text/plain" } });
        assert!(invoke_command(&ctx, "load_music_file", bad).await.is_err());
    }

    #[tokio::test]
    async fn test_preference_commands() {
        let ctx = context();
        let vars = invoke_command(&ctx, "set_theme", json!({ "theme": "Light" }))
            .await
            .unwrap();
        assert_eq!(vars["textPrimary"], "#1e293b");

        let err = invoke_command(&ctx, "set_color_scheme", json!({ "scheme": "Neon" }))
            .await
            .unwrap_err();
        assert_eq!(err, "Unknown color scheme: Neon");

        let unit = invoke_command(&ctx, "toggle_height_unit", Value::Null).await.unwrap();
        assert_eq!(unit["heightUnit"], "ft");

        let options = invoke_command(&ctx, "get_settings_options", Value::Null)
            .await
            .unwrap();
        assert_eq!(options["colorSchemes"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_argument_errors() {
        let ctx = context();
        let err = invoke_command(&ctx, "set_theme", json!({})).await.unwrap_err();
        assert_eq!(err, "Missing argument: theme");
        let err = invoke_command(&ctx, "set_theme", json!([1])).await.unwrap_err();
        assert_eq!(err, "Invalid payload");
        let err = invoke_command(&ctx, "dance_now", json!({})).await.unwrap_err();
        assert_eq!(err, "Unknown command: dance_now");
    }

    #[tokio::test]
    async fn test_recent_logs() {
        let dir = tempdir().unwrap();
        let ctx = context_with_logs(&dir.path().join("logs"));
        let lines = invoke_command(&ctx, "get_recent_logs", json!({ "maxLines": 5 }))
            .await
            .unwrap();
        assert_eq!(lines, json!([]));

        std::fs::create_dir_all(&ctx.log_dir).unwrap();
        std::fs::write(log_file_path(&ctx.log_dir), "first\nsecond\nthird\n").unwrap();
        let lines = invoke_command(&ctx, "get_recent_logs", json!({ "maxLines": 2 }))
            .await
            .unwrap();
        assert_eq!(lines, json!(["second", "third"]));
    }
}
