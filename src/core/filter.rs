//! Filter state for event visibility.
//!
//! This module defines the filter used to control which catalog events are
//! handed to the timeline: a free-text query over titles and descriptions,
//! and an optional category.

use super::catalog::{EventCatalog, TimelineEvent};

/// Category selector value that matches every category.
pub const ALL_CATEGORIES: &str = "All";

/// Filter state for controlling event visibility on the timeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    /// Case-insensitive text matched against title and description
    pub query: String,
    /// Category to show. `None` or [`ALL_CATEGORIES`] shows every category.
    pub category: Option<String>,
}

impl EventFilter {
    /// Create a filter that shows everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no criterion is active.
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.active_category().is_none()
    }

    /// Show every event again.
    pub fn reset(&mut self) {
        self.query.clear();
        self.category = None;
    }

    /// The category criterion, if one is active.
    pub fn active_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
    }

    /// Check if an event passes the current filter.
    pub fn matches(&self, event: &TimelineEvent) -> bool {
        if let Some(category) = self.active_category()
            && event.category != category
        {
            return false;
        }

        let query = self.query.trim();
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        event.title.to_lowercase().contains(&query)
            || event.description.to_lowercase().contains(&query)
    }

    /// Events of `catalog` that pass the filter, in catalog order.
    pub fn apply<'a>(&self, catalog: &'a EventCatalog) -> Vec<&'a TimelineEvent> {
        catalog.events.iter().filter(|e| self.matches(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::test_event;

    fn create_test_catalog() -> EventCatalog {
        let mut catalog = EventCatalog::default();
        let mut rome = test_event("rome", 13_800_001_000.0, 8);
        rome.title = "The Roman Empire".to_string();
        rome.description = "Mediterranean superpower".to_string();
        rome.category = "History".to_string();
        catalog.upsert(rome);

        let mut stars = test_event("stars", 2e8, 8);
        stars.title = "First Stars Form".to_string();
        stars.description = "Population III stars ignite".to_string();
        catalog.upsert(stars);
        catalog
    }

    #[test]
    fn test_default_filter_shows_everything() {
        let catalog = create_test_catalog();
        let filter = EventFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&catalog).len(), 2);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let catalog = create_test_catalog();
        let mut filter = EventFilter::new();

        filter.query = "ROMAN".to_string();
        let ids: Vec<_> = filter.apply(&catalog).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["rome"]);

        // Description matches too
        filter.query = "  population  ".to_string();
        let ids: Vec<_> = filter.apply(&catalog).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["stars"]);

        filter.query = "nothing".to_string();
        assert!(filter.apply(&catalog).is_empty());
    }

    #[test]
    fn test_category_filter() {
        let catalog = create_test_catalog();
        let mut filter = EventFilter::new();

        filter.category = Some("History".to_string());
        assert!(!filter.is_empty());
        let ids: Vec<_> = filter.apply(&catalog).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["rome"]);

        filter.category = Some(ALL_CATEGORIES.to_string());
        assert!(filter.active_category().is_none());
        assert_eq!(filter.apply(&catalog).len(), 2);
    }

    #[test]
    fn test_query_and_category_combine() {
        let catalog = create_test_catalog();
        let mut filter = EventFilter {
            query: "stars".to_string(),
            category: Some("History".to_string()),
        };
        assert!(filter.apply(&catalog).is_empty());

        filter.reset();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&catalog).len(), 2);
    }
}
