// PreferenceStore Service
// Holds the active presentation preferences and derives style variables from them

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use crate::models::{
    AnimationLevel, ColorScheme, HeightUnit, PreferenceSet, PresentationVars, Theme, VideoQuality,
};
use crate::services::{emit_event, EventSink, SessionCache, EVENT_PREFERENCES_CHANGED};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreferenceError {
    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("Unknown color scheme: {0}")]
    UnknownColorScheme(String),

    #[error("Unknown animation level: {0}")]
    UnknownAnimationLevel(String),

    #[error("Unknown video quality: {0}")]
    UnknownVideoQuality(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesChanged<'a> {
    preferences: &'a PreferenceSet,
    presentation: &'a PresentationVars,
}

pub struct PreferenceStore {
    current: RwLock<PreferenceSet>,
    presentation: RwLock<PresentationVars>,
    // Session-only, never written to the cache
    height_unit: RwLock<HeightUnit>,
    cache: Arc<SessionCache>,
    event_sink: Arc<dyn EventSink>,
}

impl PreferenceStore {
    /// Create a store seeded from the session cache (or defaults) and apply it
    pub fn new(cache: Arc<SessionCache>, event_sink: Arc<dyn EventSink>) -> Self {
        let initial = PreferenceSet::default();
        let store = Self {
            current: RwLock::new(initial),
            presentation: RwLock::new(PresentationVars::derive(&initial)),
            height_unit: RwLock::new(HeightUnit::default()),
            cache,
            event_sink,
        };
        store.load();
        store
    }

    /// Reload preferences from the session cache and re-apply presentation
    pub fn load(&self) -> PreferenceSet {
        let preferences = self.cache.load_preferences().unwrap_or_default();
        *write(&self.current) = preferences;
        *write(&self.presentation) = PresentationVars::derive(&preferences);
        log::debug!(
            "Preferences loaded: theme={}, scheme={}, animation={}, quality={}",
            preferences.theme.as_str(),
            preferences.color_scheme.as_str(),
            preferences.animation_level.as_str(),
            preferences.video_quality.as_str()
        );
        preferences
    }

    pub fn snapshot(&self) -> PreferenceSet {
        *read(&self.current)
    }

    pub fn presentation(&self) -> PresentationVars {
        read(&self.presentation).clone()
    }

    pub fn video_quality(&self) -> VideoQuality {
        read(&self.current).video_quality
    }

    pub fn set_theme(&self, name: &str) -> Result<PresentationVars, PreferenceError> {
        let theme = Theme::from_name(name).ok_or_else(|| {
            log::warn!("Rejected unknown theme '{name}'");
            PreferenceError::UnknownTheme(name.to_string())
        })?;
        log::info!("Theme set to {}", theme.as_str());
        Ok(self.update(|prefs| prefs.theme = theme))
    }

    pub fn set_color_scheme(&self, name: &str) -> Result<PresentationVars, PreferenceError> {
        let scheme = ColorScheme::from_name(name).ok_or_else(|| {
            log::warn!("Rejected unknown color scheme '{name}'");
            PreferenceError::UnknownColorScheme(name.to_string())
        })?;
        log::info!("Color scheme set to {}", scheme.as_str());
        Ok(self.update(|prefs| prefs.color_scheme = scheme))
    }

    pub fn set_animation_level(&self, level: &str) -> Result<PresentationVars, PreferenceError> {
        let level = AnimationLevel::from_name(level).ok_or_else(|| {
            log::warn!("Rejected unknown animation level '{level}'");
            PreferenceError::UnknownAnimationLevel(level.to_string())
        })?;
        log::info!("Animation level set to {}", level.as_str());
        Ok(self.update(|prefs| prefs.animation_level = level))
    }

    pub fn set_video_quality(&self, quality: &str) -> Result<PresentationVars, PreferenceError> {
        let quality = VideoQuality::from_name(quality).ok_or_else(|| {
            log::warn!("Rejected unknown video quality '{quality}'");
            PreferenceError::UnknownVideoQuality(quality.to_string())
        })?;
        log::info!("Video quality set to {}", quality.as_str());
        Ok(self.update(|prefs| prefs.video_quality = quality))
    }

    pub fn height_unit(&self) -> HeightUnit {
        *read(&self.height_unit)
    }

    pub fn toggle_height_unit(&self) -> HeightUnit {
        let mut unit = write(&self.height_unit);
        *unit = unit.toggled();
        log::info!("Height unit changed to {}", unit.as_str());
        *unit
    }

    fn update<F>(&self, mutate: F) -> PresentationVars
    where
        F: FnOnce(&mut PreferenceSet),
    {
        let preferences = {
            let mut current = write(&self.current);
            mutate(&mut current);
            *current
        };
        let presentation = PresentationVars::derive(&preferences);
        *write(&self.presentation) = presentation.clone();

        self.cache.save_preferences(&preferences);
        emit_event(
            self.event_sink.as_ref(),
            EVENT_PREFERENCES_CHANGED,
            &PreferencesChanged {
                preferences: &preferences,
                presentation: &presentation,
            },
        );
        presentation
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| {
        log::warn!("Preference lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| {
        log::warn!("Preference lock poisoned, recovering: {}", e);
        e.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::RecordingSink;
    use crate::services::NoopEventSink;

    fn store() -> PreferenceStore {
        PreferenceStore::new(Arc::new(SessionCache::new()), Arc::new(NoopEventSink))
    }

    #[test]
    fn test_starts_with_defaults() {
        let store = store();
        assert_eq!(store.snapshot(), PreferenceSet::default());
        assert_eq!(store.presentation().scheme.accent, "#8b5cf6");
        assert_eq!(store.height_unit(), HeightUnit::Cm);
    }

    #[test]
    fn test_setters_update_presentation_and_cache() {
        let cache = Arc::new(SessionCache::new());
        let store = PreferenceStore::new(cache.clone(), Arc::new(NoopEventSink));

        let vars = store.set_theme("Light").unwrap();
        assert_eq!(vars.surface.text_primary, "#1e293b");
        store.set_color_scheme("Golden Amber").unwrap();
        store.set_animation_level("essential").unwrap();
        store.set_video_quality("1080p").unwrap();

        let cached = cache.load_preferences().unwrap();
        assert_eq!(cached.theme, Theme::Light);
        assert_eq!(cached.color_scheme, ColorScheme::GoldenAmber);
        assert_eq!(cached.animation_level, AnimationLevel::Essential);
        assert_eq!(cached.video_quality, VideoQuality::Hd1080);
        assert!(!store.presentation().animations_enabled);
    }

    #[test]
    fn test_unknown_values_rejected_without_change() {
        let store = store();
        assert_eq!(
            store.set_theme("Neon"),
            Err(PreferenceError::UnknownTheme("Neon".to_string()))
        );
        assert!(matches!(
            store.set_color_scheme("cosmic purple"),
            Err(PreferenceError::UnknownColorScheme(_))
        ));
        assert!(matches!(
            store.set_animation_level("wild"),
            Err(PreferenceError::UnknownAnimationLevel(_))
        ));
        assert!(matches!(
            store.set_video_quality("4k"),
            Err(PreferenceError::UnknownVideoQuality(_))
        ));
        assert_eq!(store.snapshot(), PreferenceSet::default());
    }

    #[test]
    fn test_new_store_restores_from_cache() {
        let cache = Arc::new(SessionCache::new());
        let first = PreferenceStore::new(cache.clone(), Arc::new(NoopEventSink));
        first.set_color_scheme("Arctic Frost").unwrap();
        first.toggle_height_unit();

        let second = PreferenceStore::new(cache, Arc::new(NoopEventSink));
        assert_eq!(second.snapshot().color_scheme, ColorScheme::ArcticFrost);
        // Height unit is not cached
        assert_eq!(second.height_unit(), HeightUnit::Cm);
    }

    #[test]
    fn test_change_emits_event() {
        let sink = Arc::new(RecordingSink::default());
        let store = PreferenceStore::new(Arc::new(SessionCache::new()), sink.clone());
        store.set_video_quality("480p").unwrap();

        let payload = sink.last(EVENT_PREFERENCES_CHANGED).unwrap();
        assert_eq!(payload["preferences"]["videoQuality"], "480p");
        assert_eq!(payload["presentation"]["animationSpeed"], 1.0);
    }

    #[test]
    fn test_toggle_height_unit() {
        let store = store();
        assert_eq!(store.toggle_height_unit(), HeightUnit::Ft);
        assert_eq!(store.toggle_height_unit(), HeightUnit::Cm);
    }
}
