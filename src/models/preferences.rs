// Preferences Model
// Presentation preferences and the fixed option tables behind them

use serde::{Deserialize, Serialize};

/// Primary/secondary/accent color triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorTriple {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
}

/// UI theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
    /// Follows the client's system color-scheme preference
    Auto,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Dark, Theme::Light, Theme::Auto];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
            Theme::Auto => "Auto",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|theme| theme.as_str() == name)
    }

    /// Base palette. `Auto` has no fixed background colors, only an accent.
    pub fn palette(&self) -> Option<ColorTriple> {
        match self {
            Theme::Dark => Some(ColorTriple {
                primary: "#1a1a2e",
                secondary: "#16213e",
                accent: "#7f5af0",
            }),
            Theme::Light => Some(ColorTriple {
                primary: "#ffffff",
                secondary: "#f8fafc",
                accent: "#6366f1",
            }),
            Theme::Auto => None,
        }
    }

    pub fn accent(&self) -> &'static str {
        self.palette().map(|p| p.accent).unwrap_or("#7f5af0")
    }

    /// Auto renders with the dark surface until the client resolves it
    pub fn surface(&self) -> SurfaceColors {
        match self {
            Theme::Light => LIGHT_SURFACE,
            Theme::Dark | Theme::Auto => DARK_SURFACE,
        }
    }
}

/// Named accent color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorScheme {
    #[default]
    #[serde(rename = "Cosmic Purple")]
    CosmicPurple,
    #[serde(rename = "Ocean Blue")]
    OceanBlue,
    #[serde(rename = "Forest Green")]
    ForestGreen,
    #[serde(rename = "Sunset Orange")]
    SunsetOrange,
    #[serde(rename = "Rose Pink")]
    RosePink,
    #[serde(rename = "Midnight Blue")]
    MidnightBlue,
    #[serde(rename = "Emerald Mint")]
    EmeraldMint,
    #[serde(rename = "Golden Amber")]
    GoldenAmber,
    #[serde(rename = "Cherry Blossom")]
    CherryBlossom,
    #[serde(rename = "Arctic Frost")]
    ArcticFrost,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 10] = [
        ColorScheme::CosmicPurple,
        ColorScheme::OceanBlue,
        ColorScheme::ForestGreen,
        ColorScheme::SunsetOrange,
        ColorScheme::RosePink,
        ColorScheme::MidnightBlue,
        ColorScheme::EmeraldMint,
        ColorScheme::GoldenAmber,
        ColorScheme::CherryBlossom,
        ColorScheme::ArcticFrost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::CosmicPurple => "Cosmic Purple",
            ColorScheme::OceanBlue => "Ocean Blue",
            ColorScheme::ForestGreen => "Forest Green",
            ColorScheme::SunsetOrange => "Sunset Orange",
            ColorScheme::RosePink => "Rose Pink",
            ColorScheme::MidnightBlue => "Midnight Blue",
            ColorScheme::EmeraldMint => "Emerald Mint",
            ColorScheme::GoldenAmber => "Golden Amber",
            ColorScheme::CherryBlossom => "Cherry Blossom",
            ColorScheme::ArcticFrost => "Arctic Frost",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scheme| scheme.as_str() == name)
    }

    pub fn colors(&self) -> ColorTriple {
        let (primary, secondary, accent) = match self {
            ColorScheme::CosmicPurple => ("#1a0933", "#2d1b69", "#8b5cf6"),
            ColorScheme::OceanBlue => ("#0c4a6e", "#0e7490", "#06b6d4"),
            ColorScheme::ForestGreen => ("#064e3b", "#065f46", "#10b981"),
            ColorScheme::SunsetOrange => ("#9a3412", "#c2410c", "#f97316"),
            ColorScheme::RosePink => ("#831843", "#be185d", "#ec4899"),
            ColorScheme::MidnightBlue => ("#1e1b4b", "#312e81", "#6366f1"),
            ColorScheme::EmeraldMint => ("#134e4a", "#0f766e", "#14b8a6"),
            ColorScheme::GoldenAmber => ("#92400e", "#d97706", "#f59e0b"),
            ColorScheme::CherryBlossom => ("#701a75", "#a21caf", "#d946ef"),
            ColorScheme::ArcticFrost => ("#1e293b", "#334155", "#64748b"),
        };
        ColorTriple {
            primary,
            secondary,
            accent,
        }
    }
}

/// How much motion the presentation layer should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationLevel {
    #[default]
    Full,
    Reduced,
    Essential,
}

impl AnimationLevel {
    pub const ALL: [AnimationLevel; 3] = [
        AnimationLevel::Full,
        AnimationLevel::Reduced,
        AnimationLevel::Essential,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationLevel::Full => "full",
            AnimationLevel::Reduced => "reduced",
            AnimationLevel::Essential => "essential",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnimationLevel::Full => "Full Animations",
            AnimationLevel::Reduced => "Reduced Motion",
            AnimationLevel::Essential => "Essential Only",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == name)
    }

    /// Animation speed multiplier applied to transitions
    pub fn speed(&self) -> f32 {
        match self {
            AnimationLevel::Full => 1.0,
            AnimationLevel::Reduced => 0.5,
            AnimationLevel::Essential => 0.0,
        }
    }
}

/// Target resolution for generated step videos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoQuality {
    #[serde(rename = "1080p")]
    Hd1080,
    #[default]
    #[serde(rename = "720p")]
    Sd720,
    #[serde(rename = "480p")]
    Mobile480,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 3] = [
        VideoQuality::Hd1080,
        VideoQuality::Sd720,
        VideoQuality::Mobile480,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoQuality::Hd1080 => "1080p",
            VideoQuality::Sd720 => "720p",
            VideoQuality::Mobile480 => "480p",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VideoQuality::Hd1080 => "HD (1080p)",
            VideoQuality::Sd720 => "Standard (720p)",
            VideoQuality::Mobile480 => "Mobile (480p)",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|quality| quality.as_str() == name)
    }
}

/// The full bundle of presentation selections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSet {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub color_scheme: ColorScheme,
    #[serde(default)]
    pub animation_level: AnimationLevel,
    #[serde(default)]
    pub video_quality: VideoQuality,
}

impl PreferenceSet {
    pub fn animations_enabled(&self) -> bool {
        self.animation_level != AnimationLevel::Essential
    }
}

/// Text and surface colors that follow the light/dark split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceColors {
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub glass: &'static str,
    pub glass_border: &'static str,
    pub shadow: &'static str,
}

const LIGHT_SURFACE: SurfaceColors = SurfaceColors {
    text_primary: "#1e293b",
    text_secondary: "#64748b",
    border: "rgba(0, 0, 0, 0.1)",
    glass: "rgba(255, 255, 255, 0.8)",
    glass_border: "rgba(0, 0, 0, 0.1)",
    shadow: "rgba(0, 0, 0, 0.1)",
};

const DARK_SURFACE: SurfaceColors = SurfaceColors {
    text_primary: "#ffffff",
    text_secondary: "#b8bcc8",
    border: "rgba(255, 255, 255, 0.1)",
    glass: "rgba(255, 255, 255, 0.05)",
    glass_border: "rgba(255, 255, 255, 0.1)",
    shadow: "rgba(0, 0, 0, 0.3)",
};

/// Style variables derived from a `PreferenceSet`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationVars {
    pub theme: Theme,
    /// True when the client should pick light/dark from its system setting
    pub follows_system: bool,
    pub theme_palette: Option<ColorTriple>,
    pub theme_accent: &'static str,
    pub scheme: ColorTriple,
    #[serde(flatten)]
    pub surface: SurfaceColors,
    pub animation_speed: f32,
    pub animations_enabled: bool,
}

impl PresentationVars {
    pub fn derive(prefs: &PreferenceSet) -> Self {
        Self {
            theme: prefs.theme,
            follows_system: prefs.theme == Theme::Auto,
            theme_palette: prefs.theme.palette(),
            theme_accent: prefs.theme.accent(),
            scheme: prefs.color_scheme.colors(),
            surface: prefs.theme.surface(),
            animation_speed: prefs.animation_level.speed(),
            animations_enabled: prefs.animations_enabled(),
        }
    }
}

/// Label/value pair for settings panel option lists
#[derive(Debug, Clone, Serialize)]
pub struct SettingOption {
    pub name: &'static str,
    pub value: &'static str,
}

/// Color scheme entry for the settings panel
#[derive(Debug, Clone, Serialize)]
pub struct ColorSchemeOption {
    pub name: &'static str,
    #[serde(flatten)]
    pub colors: ColorTriple,
}

/// Everything the settings panel needs to render its choices
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsOptions {
    pub themes: Vec<SettingOption>,
    pub color_schemes: Vec<ColorSchemeOption>,
    pub animation_options: Vec<SettingOption>,
    pub quality_options: Vec<SettingOption>,
}

impl SettingsOptions {
    pub fn all() -> Self {
        Self {
            themes: Theme::ALL
                .iter()
                .map(|t| SettingOption {
                    name: t.as_str(),
                    value: t.as_str(),
                })
                .collect(),
            color_schemes: ColorScheme::ALL
                .iter()
                .map(|s| ColorSchemeOption {
                    name: s.as_str(),
                    colors: s.colors(),
                })
                .collect(),
            animation_options: AnimationLevel::ALL
                .iter()
                .map(|a| SettingOption {
                    name: a.label(),
                    value: a.as_str(),
                })
                .collect(),
            quality_options: VideoQuality::ALL
                .iter()
                .map(|q| SettingOption {
                    name: q.label(),
                    value: q.as_str(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = PreferenceSet::default();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.color_scheme, ColorScheme::CosmicPurple);
        assert_eq!(prefs.animation_level, AnimationLevel::Full);
        assert_eq!(prefs.video_quality, VideoQuality::Sd720);
        assert!(prefs.animations_enabled());
    }

    #[test]
    fn test_names_match_serde() {
        for scheme in ColorScheme::ALL {
            let json = serde_json::to_value(scheme).unwrap();
            assert_eq!(json, scheme.as_str());
            assert_eq!(ColorScheme::from_name(scheme.as_str()), Some(scheme));
        }
        for quality in VideoQuality::ALL {
            let json = serde_json::to_value(quality).unwrap();
            assert_eq!(json, quality.as_str());
        }
        assert_eq!(serde_json::to_value(AnimationLevel::Reduced).unwrap(), "reduced");
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(Theme::from_name("dark"), None);
        assert_eq!(ColorScheme::from_name("Neon Green"), None);
        assert_eq!(VideoQuality::from_name("4k"), None);
        assert_eq!(AnimationLevel::from_name("Full"), None);
    }

    #[test]
    fn test_presentation_vars() {
        let prefs = PreferenceSet {
            theme: Theme::Light,
            color_scheme: ColorScheme::OceanBlue,
            animation_level: AnimationLevel::Reduced,
            video_quality: VideoQuality::Hd1080,
        };
        let vars = PresentationVars::derive(&prefs);
        assert_eq!(vars.surface.text_primary, "#1e293b");
        assert_eq!(vars.surface.text_secondary, "#64748b");
        assert_eq!(vars.surface.border, "rgba(0, 0, 0, 0.1)");
        assert_eq!(vars.surface.glass, "rgba(255, 255, 255, 0.8)");
        assert_eq!(vars.surface.glass_border, "rgba(0, 0, 0, 0.1)");
        assert_eq!(vars.surface.shadow, "rgba(0, 0, 0, 0.1)");
        assert_eq!(vars.scheme.accent, "#06b6d4");
        assert_eq!(vars.animation_speed, 0.5);
        assert!(!vars.follows_system);

        let auto = PresentationVars::derive(&PreferenceSet {
            theme: Theme::Auto,
            animation_level: AnimationLevel::Essential,
            ..PreferenceSet::default()
        });
        assert!(auto.follows_system);
        assert!(auto.theme_palette.is_none());
        assert_eq!(auto.theme_accent, "#7f5af0");
        assert!(!auto.animations_enabled);
        assert_eq!(auto.surface, Theme::Dark.surface());

        let dark = PresentationVars::derive(&PreferenceSet::default());
        assert_eq!(dark.surface.text_primary, "#ffffff");
        assert_eq!(dark.surface.text_secondary, "#b8bcc8");
        assert_eq!(dark.surface.border, "rgba(255, 255, 255, 0.1)");
        assert_eq!(dark.surface.glass, "rgba(255, 255, 255, 0.05)");
        assert_eq!(dark.surface.glass_border, "rgba(255, 255, 255, 0.1)");
        assert_eq!(dark.surface.shadow, "rgba(0, 0, 0, 0.3)");

        let json = serde_json::to_value(&dark).unwrap();
        assert_eq!(json["textSecondary"], "#b8bcc8");
        assert_eq!(json["glassBorder"], "rgba(255, 255, 255, 0.1)");
    }

    #[test]
    fn test_partial_preferences_deserialize_with_defaults() {
        let prefs: PreferenceSet =
            serde_json::from_str(r#"{ "theme": "Light" }"#).unwrap();
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.video_quality, VideoQuality::Sd720);
    }
}
