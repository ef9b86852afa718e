// Event Sink
// Outbound notifications to the presentation layer

use serde::Serialize;
use serde_json::Value;

pub const EVENT_PREFERENCES_CHANGED: &str = "preferences_changed";
pub const EVENT_GENERATION_STATE: &str = "generation_state";
pub const EVENT_GENERATION_COMPLETED: &str = "generation_completed";
pub const EVENT_GENERATION_FAILED: &str = "generation_failed";
pub const EVENT_HISTORY_UPDATED: &str = "history_updated";
pub const EVENT_PLAYBACK_STATUS: &str = "playback_status";
pub const EVENT_MUSIC_PROPERTIES: &str = "music_properties";

pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value);
}

pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &str, _payload: Value) {}
}

pub fn emit_event<T: Serialize>(sink: &dyn EventSink, event: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => sink.emit(event, value),
        Err(e) => log::warn!("Failed to serialize '{event}' payload: {e}"),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use serde_json::Value;

    use super::EventSink;

    /// Captures emitted events for assertions
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingSink {
        pub fn names(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|(name, _)| name.clone())
                .collect()
        }

        pub fn last(&self, event: &str) -> Option<Value> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(name, _)| name == event)
                .map(|(_, payload)| payload.clone())
        }
    }

    impl EventSink for RecordingSink {
        fn emit(&self, event: &str, payload: Value) {
            self.events.lock().unwrap().push((event.to_string(), payload));
        }
    }
}
