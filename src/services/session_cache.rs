// SessionCache Service
// Process-memory mirror of preferences and history, discarded on restart

use std::sync::RwLock;

use crate::models::{GenerationResult, PreferenceSet};

/// Volatile stand-in for browser storage. Nothing here survives the process.
#[derive(Default)]
pub struct SessionCache {
    preferences: RwLock<Option<PreferenceSet>>,
    history: RwLock<Vec<GenerationResult>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_preferences(&self) -> Option<PreferenceSet> {
        self.preferences.read().ok().and_then(|guard| *guard)
    }

    pub fn save_preferences(&self, preferences: &PreferenceSet) {
        if let Ok(mut guard) = self.preferences.write() {
            *guard = Some(*preferences);
        }
    }

    pub fn load_history(&self) -> Vec<GenerationResult> {
        self.history
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn save_history(&self, entries: &[GenerationResult]) {
        if let Ok(mut guard) = self.history.write() {
            *guard = entries.to_vec();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Theme, VideoQuality};

    #[test]
    fn test_empty_cache() {
        let cache = SessionCache::new();
        assert!(cache.load_preferences().is_none());
        assert!(cache.load_history().is_empty());
    }

    #[test]
    fn test_preferences_roundtrip() {
        let cache = SessionCache::new();
        let prefs = PreferenceSet {
            theme: Theme::Light,
            video_quality: VideoQuality::Hd1080,
            ..PreferenceSet::default()
        };
        cache.save_preferences(&prefs);
        assert_eq!(cache.load_preferences(), Some(prefs));
    }
}
