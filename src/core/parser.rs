//! JSON parser for event catalog files.
//!
//! This module converts catalog JSON (either this application's own format or
//! a bare array of events with camelCase fields) into an `EventCatalog`,
//! enforcing the event invariants on the way in.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use super::catalog::{Category, EventCatalog, TimelineEvent};

/// Catalog format version understood by this parser.
pub const SUPPORTED_VERSION: u32 = 1;

/// Errors that can occur during catalog parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON syntax error
    #[error("Invalid JSON syntax: {0}")]
    JsonSyntax(#[from] serde_json::Error),

    /// Invalid hex color format
    #[error("Invalid color format '{value}': expected hex color like #RRGGBB")]
    InvalidColor { value: String },

    /// Event time is NaN or infinite
    #[error("Event '{id}' has a non-finite {field}")]
    NonFiniteTime { id: String, field: &'static str },

    /// Importance outside 1..=10
    #[error("Event '{id}' has importance {value}: expected 1 to 10")]
    ImportanceOutOfRange { id: String, value: i64 },

    /// Two events share an identifier
    #[error("Duplicate event id '{id}'")]
    DuplicateId { id: String },

    /// Unsupported format version
    #[error("Unsupported format version {version}: expected version 1")]
    UnsupportedVersion { version: u32 },
}

// ============================================================================
// Intermediate JSON structures for deserialization
// ============================================================================

/// Top-level JSON structure: either a full catalog or a bare event array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Catalog(JsonCatalog),
    Events(Vec<JsonEvent>),
}

/// Full catalog document.
#[derive(Debug, Deserialize)]
struct JsonCatalog {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    categories: Vec<Category>,
    events: Vec<JsonEvent>,
}

/// Event in JSON format.
#[derive(Debug, Deserialize)]
struct JsonEvent {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(alias = "yearsFromStart")]
    start_time: f64,
    #[serde(default, alias = "endYearsFromStart")]
    end_time: Option<f64>,
    #[serde(default)]
    category: String,
    importance: i64,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

fn default_version() -> u32 {
    SUPPORTED_VERSION
}

// ============================================================================
// Parser implementation
// ============================================================================

/// Parse a JSON string into an `EventCatalog`.
///
/// # Arguments
/// * `content` - The JSON string to parse
///
/// # Returns
/// * `Ok(EventCatalog)` - Successfully parsed catalog
/// * `Err(ParseError)` - Parsing failed with a descriptive error
pub fn parse_catalog_json(content: &str) -> Result<EventCatalog, ParseError> {
    let (categories, json_events) = match serde_json::from_str::<JsonDocument>(content)? {
        JsonDocument::Catalog(catalog) => {
            if catalog.version != SUPPORTED_VERSION {
                return Err(ParseError::UnsupportedVersion {
                    version: catalog.version,
                });
            }
            (catalog.categories, catalog.events)
        }
        JsonDocument::Events(events) => (Vec::new(), events),
    };

    let mut seen = HashSet::new();
    let mut events = Vec::with_capacity(json_events.len());
    for json in json_events {
        if !seen.insert(json.id.clone()) {
            return Err(ParseError::DuplicateId { id: json.id });
        }
        events.push(convert_event(json)?);
    }

    Ok(EventCatalog { categories, events })
}

/// Convert a JSON event to a `TimelineEvent`, validating its invariants.
fn convert_event(json: JsonEvent) -> Result<TimelineEvent, ParseError> {
    if !json.start_time.is_finite() {
        return Err(ParseError::NonFiniteTime {
            id: json.id,
            field: "start_time",
        });
    }
    if json.end_time.is_some_and(|end| !end.is_finite()) {
        return Err(ParseError::NonFiniteTime {
            id: json.id,
            field: "end_time",
        });
    }

    let importance = match u8::try_from(json.importance) {
        Ok(value) if (1..=10).contains(&value) => value,
        _ => {
            return Err(ParseError::ImportanceOutOfRange {
                id: json.id,
                value: json.importance,
            });
        }
    };

    let color = match json.color.as_deref() {
        Some(hex) if !hex.is_empty() => Some(parse_hex_color(hex)?),
        _ => None,
    };

    // Equal start and end collapse to an instantaneous event
    let end_time = json.end_time.filter(|end| *end != json.start_time);

    Ok(TimelineEvent {
        id: json.id,
        title: json.title,
        description: json.description,
        start_time: json.start_time,
        end_time,
        category: json.category,
        importance,
        color,
        icon: json.icon.filter(|icon| !icon.is_empty()),
    })
}

/// Parse a hex color string (e.g., "#FF5555") into RGB bytes.
pub fn parse_hex_color(hex: &str) -> Result<[u8; 3], ParseError> {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ParseError::InvalidColor {
            value: format!("#{}", hex),
        });
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| ParseError::InvalidColor {
            value: format!("#{}", hex),
        })
    };

    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
