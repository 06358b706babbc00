//! User-facing errors.
//!
//! Everything the error dialog can show: catalogs that cannot be read,
//! catalogs whose JSON is malformed, events that break a catalog rule, and
//! settings that failed to load or save.

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::parser::{ParseError, SUPPORTED_VERSION};

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// No catalog at the chosen path
    #[error("Catalog not found")]
    CatalogNotFound { path: PathBuf },

    /// The catalog exists but could not be read
    #[error("Catalog unreadable")]
    CatalogUnreadable { path: PathBuf, reason: String },

    /// The catalog is not valid JSON or does not have the catalog shape
    #[error("Malformed catalog")]
    MalformedCatalog {
        path: Option<PathBuf>,
        message: String,
        /// 1-indexed
        line: Option<usize>,
        column: Option<usize>,
    },

    /// An event (or category color) breaks a catalog rule
    #[error("Invalid event")]
    InvalidEvent {
        path: Option<PathBuf>,
        /// Offending event, when the rule belongs to one
        event_id: Option<String>,
        field: &'static str,
        message: String,
    },

    #[error("Unsupported catalog version")]
    UnsupportedVersion {
        path: Option<PathBuf>,
        found: u32,
        supported: u32,
    },

    #[error("Settings save error")]
    SettingsSaveError { reason: String },

    #[error("Settings load error")]
    SettingsLoadError { reason: String },
}

impl AppError {
    /// Map a failed catalog read to the error the dialog should show.
    pub fn from_catalog_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::CatalogNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::CatalogUnreadable {
                path,
                reason: "Permission denied".to_string(),
            },
            _ => Self::CatalogUnreadable {
                path,
                reason: error.to_string(),
            },
        }
    }

    /// Map a rejected catalog to the error the dialog should show.
    pub fn from_catalog_parse(path: Option<PathBuf>, error: &ParseError) -> Self {
        let invalid_event = |path, event_id: Option<&String>, field| Self::InvalidEvent {
            path,
            event_id: event_id.cloned(),
            field,
            message: error.to_string(),
        };

        match error {
            ParseError::JsonSyntax(e) => {
                // serde_json reports 0 when there is no position
                let line = Some(e.line()).filter(|l| *l > 0);
                let column = Some(e.column()).filter(|c| *c > 0);
                Self::MalformedCatalog {
                    path,
                    message: e.to_string(),
                    line,
                    column,
                }
            }
            ParseError::UnsupportedVersion { version } => Self::UnsupportedVersion {
                path,
                found: *version,
                supported: SUPPORTED_VERSION,
            },
            ParseError::InvalidColor { .. } => invalid_event(path, None, "color"),
            ParseError::NonFiniteTime { id, field } => invalid_event(path, Some(id), *field),
            ParseError::ImportanceOutOfRange { id, .. } => {
                invalid_event(path, Some(id), "importance")
            }
            ParseError::DuplicateId { id } => invalid_event(path, Some(id), "id"),
        }
    }

    /// Read errors can be retried once the file is back in place.
    pub fn supports_retry(&self) -> bool {
        matches!(
            self,
            Self::CatalogNotFound { .. } | Self::CatalogUnreadable { .. }
        )
    }

    /// The catalog file involved, if any.
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::CatalogNotFound { path } | Self::CatalogUnreadable { path, .. } => Some(path),
            Self::MalformedCatalog { path, .. }
            | Self::InvalidEvent { path, .. }
            | Self::UnsupportedVersion { path, .. } => path.as_ref(),
            Self::SettingsSaveError { .. } | Self::SettingsLoadError { .. } => None,
        }
    }

    pub fn dialog_title(&self) -> &'static str {
        match self {
            Self::CatalogNotFound { .. } => "Catalog Not Found",
            Self::CatalogUnreadable { .. } => "Cannot Read Catalog",
            Self::MalformedCatalog { .. } => "Invalid Catalog",
            Self::InvalidEvent { .. } => "Invalid Event",
            Self::UnsupportedVersion { .. } => "Unsupported Version",
            Self::SettingsSaveError { .. } | Self::SettingsLoadError { .. } => "Settings Error",
        }
    }

    /// One-line summary for the dialog body and the status bar.
    pub fn brief_description(&self) -> String {
        match self {
            Self::CatalogNotFound { path } => {
                format!("The catalog '{}' could not be found.", display_name(path))
            }
            Self::CatalogUnreadable { path, .. } => {
                format!("Could not read the catalog '{}'.", display_name(path))
            }
            Self::MalformedCatalog { message, .. } => message.clone(),
            Self::InvalidEvent {
                event_id: Some(id),
                field,
                ..
            } => format!("Event '{}' has an invalid {}; nothing was imported.", id, field),
            Self::InvalidEvent { field, message, .. } => {
                format!("Invalid {}: {}", field, message)
            }
            Self::UnsupportedVersion {
                found, supported, ..
            } => format!(
                "Catalog version {} is not supported. This viewer reads version {}.",
                found, supported
            ),
            Self::SettingsSaveError { reason } => format!("Could not save settings: {}", reason),
            Self::SettingsLoadError { reason } => format!("Could not load settings: {}", reason),
        }
    }

    /// Multi-line report shown under "Details" and copied to the clipboard.
    pub fn detailed_info(&self) -> String {
        let mut lines = vec![self.dialog_title().to_string()];

        if let Some(path) = self.file_path() {
            lines.push(format!("Catalog: {}", path.display()));
        }

        match self {
            Self::CatalogNotFound { .. } => {}
            Self::CatalogUnreadable { reason, .. } => {
                lines.push(format!("Reason: {}", reason));
            }
            Self::MalformedCatalog {
                message,
                line,
                column,
                ..
            } => {
                if let Some(line) = line {
                    let column = column.map(|c| format!(", column {}", c)).unwrap_or_default();
                    lines.push(format!("At: line {}{}", line, column));
                }
                lines.push(format!("Parser: {}", message));
            }
            Self::InvalidEvent {
                event_id,
                field,
                message,
                ..
            } => {
                if let Some(id) = event_id {
                    lines.push(format!("Event: {}", id));
                }
                lines.push(format!("Field: {}", field));
                lines.push(format!("Rule: {}", message));
            }
            Self::UnsupportedVersion {
                found, supported, ..
            } => {
                lines.push(format!("Version: {} (expected {})", found, supported));
            }
            Self::SettingsSaveError { reason } | Self::SettingsLoadError { reason } => {
                lines.push(format!("Reason: {}", reason));
            }
        }

        lines.join("\n")
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
