//! Configuration and settings module.
//!
//! This module handles persistent settings: the color palette, the calendar
//! anchors, the empirical tuning constants of the engine, and window state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::AppError;
use super::render::Rgba;

/// Settings filename for persistence.
const SETTINGS_FILENAME: &str = "config.json";

/// Maximum number of recent catalogs to track.
const MAX_RECENT_FILES: usize = 10;

/// Age of the universe in years; also the default calendar epoch.
pub const UNIVERSE_AGE_YEARS: f64 = 13.8e9;

/// Color settings for the timeline canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    /// Canvas background
    pub background: [u8; 3],
    /// Background grid lines (drawn with scale-dependent opacity)
    pub grid: [u8; 3],
    /// Ruler ticks and center line
    pub ruler: [u8; 3],
    /// Major ruler labels
    pub label_major: [u8; 3],
    /// Minor ruler labels
    pub label_minor: [u8; 3],
    /// Faint era captions behind the ruler
    pub era_label: [u8; 3],
    /// Event title text
    pub event_title: [u8; 3],
    /// Fallback event color when an event has none
    pub default_event: [u8; 3],
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            background: [2, 6, 23],       // Slate 950
            grid: [99, 102, 241],         // Indigo
            ruler: [255, 255, 255],       // White
            label_major: [255, 255, 255], // White
            label_minor: [255, 255, 255], // White (dimmed when drawn)
            era_label: [255, 255, 255],   // White (nearly transparent)
            event_title: [255, 255, 255],
            default_event: [99, 102, 241],
        }
    }
}

impl ColorSettings {
    /// Convert a color array to an opaque draw color.
    #[inline]
    pub fn to_rgba(color: [u8; 3]) -> Rgba {
        Rgba::from_rgb(color)
    }

    /// Convert a color array to a draw color with opacity in `[0, 1]`.
    #[inline]
    pub fn to_rgba_opacity(color: [u8; 3], opacity: f64) -> Rgba {
        Rgba::from_rgb(color).with_opacity(opacity)
    }

    /// Color to draw an event with, honouring its optional display hint.
    pub fn event_color(&self, hint: Option<[u8; 3]>) -> [u8; 3] {
        hint.unwrap_or(self.default_event)
    }
}

/// Calendar anchors used by the formatter and the navigation shortcuts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Time value of calendar year 0, in years from the Big Bang
    pub calendar_epoch: f64,
    /// Time value treated as "Present Day"
    pub present_day: f64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            calendar_epoch: UNIVERSE_AGE_YEARS,
            present_day: UNIVERSE_AGE_YEARS + 2025.0,
        }
    }
}

impl CalendarSettings {
    /// Convert a calendar year to a time value.
    pub fn year_to_time(&self, year: f64) -> f64 {
        self.calendar_epoch + year
    }

    /// Convert a time value to a (fractional) calendar year.
    pub fn time_to_year(&self, time: f64) -> f64 {
        time - self.calendar_epoch
    }
}

/// Empirical constants of the placement, gesture and animation engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningSettings {
    /// Minimum horizontal distance between placed markers
    pub collision_distance_px: f64,
    /// Click radius for event selection
    pub hit_radius_px: f64,
    /// Off-screen margin within which events are still placed
    pub cull_margin_px: f64,
    /// Importance threshold at the reference scale
    pub threshold_base: f64,
    /// Offset added to log10(scale) in the threshold formula
    pub threshold_offset: f64,
    /// Threshold decrease per decade of zoom
    pub threshold_slope: f64,
    /// Duration of animated transitions
    pub animation_duration_ms: f64,
    /// Wheel delta to zoom factor multiplier
    pub wheel_sensitivity: f64,
    /// Pointer movement that turns a press into a drag
    pub drag_threshold_px: f64,
    /// Quiet window before a resize is applied
    pub resize_debounce_ms: f64,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            collision_distance_px: 100.0,
            hit_radius_px: 60.0,
            cull_margin_px: 500.0,
            threshold_base: 9.0,
            threshold_offset: 8.0,
            threshold_slope: 1.5,
            animation_duration_ms: 800.0,
            wheel_sensitivity: 0.001,
            drag_threshold_px: 1.0,
            resize_debounce_ms: 16.0,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// Color palette.
    #[serde(default)]
    pub colors: ColorSettings,

    /// Calendar anchors.
    #[serde(default)]
    pub calendar: CalendarSettings,

    /// Engine tuning constants.
    #[serde(default)]
    pub tuning: TuningSettings,

    /// Recently imported catalogs (most recent first).
    #[serde(default)]
    pub recent_catalogs: Vec<PathBuf>,

    /// Window size to restore on startup (width, height).
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

impl AppSettings {
    /// Get the settings file path in the user's config directory.
    fn get_settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("cosmic-timeline");
            path.push(SETTINGS_FILENAME);
            path
        })
    }

    /// Load settings from disk, returning defaults if loading fails.
    pub fn load() -> Self {
        let Some(path) = Self::get_settings_path() else {
            log::warn!("No config directory available, using default settings");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                if path.exists() {
                    log::warn!("{}, using defaults", e.brief_description());
                }
                Self::default()
            }
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &std::path::Path) -> Result<Self, AppError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::SettingsLoadError {
                reason: e.to_string(),
            })?;
        serde_json::from_str(&content).map_err(|e| AppError::SettingsLoadError {
            reason: e.to_string(),
        })
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<(), AppError> {
        let path = Self::get_settings_path().ok_or_else(|| AppError::SettingsSaveError {
            reason: "Could not determine config directory".to_string(),
        })?;
        self.save_to(&path)?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::SettingsSaveError {
                reason: format!("Failed to create config directory: {}", e),
            })?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| AppError::SettingsSaveError {
                reason: format!("Failed to serialize settings: {}", e),
            })?;

        std::fs::write(path, content).map_err(|e| AppError::SettingsSaveError {
            reason: format!("Failed to write settings file: {}", e),
        })
    }

    /// Reset all settings to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add a catalog to the recent list.
    ///
    /// The path is moved to the front of the list and the list is capped at
    /// `MAX_RECENT_FILES` entries.
    pub fn add_recent_catalog(&mut self, path: PathBuf) {
        self.recent_catalogs.retain(|p| p != &path);
        self.recent_catalogs.insert(0, path);
        self.recent_catalogs.truncate(MAX_RECENT_FILES);
    }

    /// Set the window size.
    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.window_size = Some((width, height));
    }
}
