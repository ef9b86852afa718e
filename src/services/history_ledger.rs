// HistoryLedger Service
// Newest-first record of completed generations, capped and mirrored to the session cache

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::models::{GenerationResult, HistorySummary};
use crate::services::{emit_event, EventSink, SessionCache, EVENT_HISTORY_UPDATED};

pub const MAX_HISTORY_ENTRIES: usize = 50;

/// Yes/no gate supplied by the presentation layer before destructive operations
pub trait ConfirmGate {
    fn confirm(&self, prompt: &str) -> bool;
}

impl ConfirmGate for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

pub struct HistoryLedger {
    entries: RwLock<Vec<GenerationResult>>,
    cache: Arc<SessionCache>,
    event_sink: Arc<dyn EventSink>,
}

impl HistoryLedger {
    /// Create a ledger seeded from the session cache
    pub fn new(cache: Arc<SessionCache>, event_sink: Arc<dyn EventSink>) -> Self {
        let ledger = Self {
            entries: RwLock::new(Vec::new()),
            cache,
            event_sink,
        };
        ledger.load();
        ledger
    }

    /// Reload entries from the session cache
    pub fn load(&self) -> usize {
        let mut cached = self.cache.load_history();
        cached.truncate(MAX_HISTORY_ENTRIES);
        let count = cached.len();
        *self.write_entries() = cached;
        count
    }

    /// Insert at the front, evicting from the tail past the cap
    pub fn append(&self, result: GenerationResult) {
        let snapshot = {
            let mut entries = self.write_entries();
            entries.insert(0, result);
            if entries.len() > MAX_HISTORY_ENTRIES {
                let evicted = entries.len() - MAX_HISTORY_ENTRIES;
                entries.truncate(MAX_HISTORY_ENTRIES);
                log::debug!("History at capacity, evicted {evicted} oldest entries");
            }
            entries.clone()
        };
        self.persist(&snapshot);
    }

    /// Empty the ledger if the gate agrees. Returns whether anything was cleared.
    pub fn clear(&self, gate: &dyn ConfirmGate) -> bool {
        if !gate.confirm("Are you sure you want to clear all history?") {
            log::info!("History clear cancelled");
            return false;
        }
        self.write_entries().clear();
        log::info!("History cleared");
        self.persist(&[]);
        true
    }

    pub fn find_by_id(&self, id: i64) -> Option<GenerationResult> {
        self.read_entries()
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    pub fn snapshot(&self) -> Vec<GenerationResult> {
        self.read_entries().clone()
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// List rows with age labels relative to `now`
    pub fn summaries(&self, now: DateTime<Utc>) -> Vec<HistorySummary> {
        self.read_entries()
            .iter()
            .map(|entry| HistorySummary {
                id: entry.id,
                dance_style: entry.dance_style.clone(),
                age: entry.age,
                height_descriptor: entry.height_descriptor.clone(),
                music_file_name: entry.music_file_name.clone(),
                relative_time: relative_time(entry.created_at, now),
            })
            .collect()
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, Vec<GenerationResult>> {
        self.entries.read().unwrap_or_else(|e| {
            log::warn!("History lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, Vec<GenerationResult>> {
        self.entries.write().unwrap_or_else(|e| {
            log::warn!("History lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn persist(&self, entries: &[GenerationResult]) {
        self.cache.save_history(entries);
        emit_event(self.event_sink.as_ref(), EVENT_HISTORY_UPDATED, &entries.len());
    }
}

/// "Just now", "3h ago", "2d ago", or the calendar date past a week
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let hours = elapsed.num_hours();
    let days = hours / 24;

    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        timestamp.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::models::{HeightUnit, VideoQuality};
    use crate::services::testing::RecordingSink;
    use crate::services::{video_steps_for, NoopEventSink};

    fn result(id: i64) -> GenerationResult {
        GenerationResult {
            id,
            created_at: Utc.timestamp_millis_opt(id).unwrap(),
            music_file_name: format!("track-{id}.mp3"),
            dance_style: "Ballet".to_string(),
            age: 30,
            height_descriptor: "170".to_string(),
            height_unit: HeightUnit::Cm,
            video_steps: video_steps_for("Ballet"),
            quality: VideoQuality::Sd720,
        }
    }

    fn ledger() -> HistoryLedger {
        HistoryLedger::new(Arc::new(SessionCache::new()), Arc::new(NoopEventSink))
    }

    #[test]
    fn test_append_is_newest_first() {
        let ledger = ledger();
        ledger.append(result(1));
        ledger.append(result(2));
        let ids: Vec<i64> = ledger.snapshot().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let ledger = ledger();
        for id in 1..=50 {
            ledger.append(result(id));
        }
        assert_eq!(ledger.len(), 50);
        let oldest = ledger.snapshot()[49].id;
        assert_eq!(oldest, 1);

        ledger.append(result(51));
        assert_eq!(ledger.len(), 50);
        assert!(ledger.find_by_id(1).is_none());
        assert_eq!(ledger.snapshot()[0].id, 51);
        assert_eq!(ledger.snapshot()[49].id, 2);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let ledger = ledger();
        ledger.append(result(7));
        ledger.append(result(7));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_find_by_id_roundtrip() {
        let ledger = ledger();
        let original = result(42);
        ledger.append(original.clone());
        ledger.append(result(43));
        assert_eq!(ledger.find_by_id(42), Some(original));
        assert_eq!(ledger.find_by_id(99), None);
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let sink = Arc::new(RecordingSink::default());
        let ledger = HistoryLedger::new(Arc::new(SessionCache::new()), sink.clone());
        ledger.append(result(1));

        assert!(!ledger.clear(&false));
        assert_eq!(ledger.len(), 1);

        assert!(ledger.clear(&true));
        assert!(ledger.is_empty());
        assert_eq!(sink.last(EVENT_HISTORY_UPDATED), Some(serde_json::json!(0)));
    }

    #[test]
    fn test_mirrors_into_session_cache() {
        let cache = Arc::new(SessionCache::new());
        let first = HistoryLedger::new(cache.clone(), Arc::new(NoopEventSink));
        first.append(result(5));

        let second = HistoryLedger::new(cache, Arc::new(NoopEventSink));
        assert_eq!(second.len(), 1);
        assert_eq!(second.snapshot()[0].id, 5);
    }

    #[test]
    fn test_clear_recovers_from_poisoned_lock() {
        let cache = Arc::new(SessionCache::new());
        let ledger = HistoryLedger::new(cache.clone(), Arc::new(NoopEventSink));
        ledger.append(result(1));
        ledger.append(result(2));

        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ledger.entries.write().unwrap();
            panic!("writer panicked while holding the history lock");
        }));
        assert!(poisoned.is_err());
        assert!(ledger.entries.is_poisoned());

        assert_eq!(ledger.len(), 2);
        assert!(ledger.clear(&true));
        assert!(ledger.is_empty());
        assert!(cache.load_history().is_empty());

        cache.save_history(&[result(3)]);
        assert_eq!(ledger.load(), 1);
        assert_eq!(ledger.snapshot()[0].id, 3);
    }

    #[test]
    fn test_relative_time_labels() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(relative_time(now - Duration::minutes(59), now), "Just now");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3h ago");
        assert_eq!(relative_time(now - Duration::hours(49), now), "2d ago");
        assert_eq!(relative_time(now - Duration::days(10), now), "2024-03-10");
    }

    #[test]
    fn test_summaries() {
        let ledger = ledger();
        ledger.append(result(1_700_000_000_000));
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap() + Duration::hours(5);
        let summaries = ledger.summaries(now);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].relative_time, "5h ago");
        assert_eq!(summaries[0].dance_style, "Ballet");
    }
}
