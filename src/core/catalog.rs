//! Timeline data structures.
//!
//! This module defines the event and category records shown on the timeline,
//! and the catalog that owns them for the lifetime of the application.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::AppError;

/// Glyph used when an event has no icon and its category cannot be resolved.
pub const FALLBACK_GLYPH: &str = "📍";

/// Built-in catalog shipped with the application.
const DEFAULT_CATALOG_JSON: &str = include_str!("../../assets/default_catalog.json");

/// A named grouping of events with a display glyph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique category name (events refer to categories by this key)
    pub name: String,
    /// Emoji shown next to the category
    pub emoji: String,
}

/// A single point or range on the timeline.
///
/// Times are expressed in years from the Big Bang (0).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Unique identifier
    pub id: String,
    /// Short title drawn above the marker
    pub title: String,
    /// Longer free-form description
    #[serde(default)]
    pub description: String,
    /// Start of the event, in years from the Big Bang
    pub start_time: f64,
    /// End of the event for ranges; `None` means instantaneous
    #[serde(default)]
    pub end_time: Option<f64>,
    /// Category name (may reference a category that no longer exists)
    pub category: String,
    /// Importance from 1 (minor) to 10 (landmark)
    pub importance: u8,
    /// Optional RGB display color
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    /// Optional single-glyph icon
    #[serde(default)]
    pub icon: Option<String>,
}

impl TimelineEvent {
    /// Returns the end time if it describes a non-empty range.
    pub fn range_end(&self) -> Option<f64> {
        self.end_time.filter(|end| *end != self.start_time)
    }
}

/// The set of events and categories the viewer is working with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventCatalog {
    /// Known categories
    #[serde(default)]
    pub categories: Vec<Category>,
    /// All events, in no particular order
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
}

impl EventCatalog {
    /// Load the catalog embedded in the binary.
    ///
    /// Falls back to an empty catalog if the embedded data does not parse,
    /// which only happens if the asset was edited by hand.
    pub fn builtin() -> Self {
        match super::parser::parse_catalog_json(DEFAULT_CATALOG_JSON) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Built-in catalog is invalid: {}", e);
                Self::default()
            }
        }
    }

    /// Read and validate a catalog file.
    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::from_catalog_io(path.to_path_buf(), e))?;
        super::parser::parse_catalog_json(&content)
            .map_err(|e| AppError::from_catalog_parse(Some(path.to_path_buf()), &e))
    }

    /// Find an event by identifier.
    pub fn find(&self, id: &str) -> Option<&TimelineEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Find a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Glyph for a category name, tolerating dangling references.
    pub fn category_glyph(&self, name: &str) -> &str {
        self.category(name)
            .map(|c| c.emoji.as_str())
            .unwrap_or(FALLBACK_GLYPH)
    }

    /// Glyph to draw for an event: its own icon, else its category's glyph.
    pub fn glyph_for<'a>(&'a self, event: &'a TimelineEvent) -> &'a str {
        match event.icon.as_deref() {
            Some(icon) if !icon.is_empty() => icon,
            _ => self.category_glyph(&event.category),
        }
    }

    /// Insert an event, replacing any existing event with the same id.
    pub fn upsert(&mut self, event: TimelineEvent) {
        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => self.events.push(event),
        }
    }

    /// Remove an event by id. Returns the removed event, if any.
    pub fn remove(&mut self, id: &str) -> Option<TimelineEvent> {
        let index = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(index))
    }

    /// Add a category unless one with the same name already exists.
    pub fn add_category(&mut self, category: Category) -> bool {
        if self.category(&category.name).is_some() {
            return false;
        }
        self.categories.push(category);
        true
    }

    /// Merge another catalog into this one.
    ///
    /// Events with matching ids are replaced; new categories are appended.
    /// Returns the number of events taken from `other`.
    pub fn merge(&mut self, other: EventCatalog) -> usize {
        for category in other.categories {
            self.add_category(category);
        }
        let count = other.events.len();
        for event in other.events {
            self.upsert(event);
        }
        count
    }
}

#[cfg(test)]
pub(crate) fn test_event(id: &str, start_time: f64, importance: u8) -> TimelineEvent {
    TimelineEvent {
        id: id.to_string(),
        title: format!("Event {}", id),
        description: String::new(),
        start_time,
        end_time: None,
        category: "Cosmic".to_string(),
        importance,
        color: None,
        icon: None,
    }
}
