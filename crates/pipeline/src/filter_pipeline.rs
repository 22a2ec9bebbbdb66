//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::filters::{CategoryFilter, NamedFilter, ReachableFilter};
use crate::traits::ContactFilter;
use contacts::Contact;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```
/// use pipeline::FilterPipeline;
/// use pipeline::filters::{CategoryFilter, NamedFilter};
///
/// let pipeline = FilterPipeline::new()
///     .add_filter(NamedFilter)
///     .add_filter(CategoryFilter::new("Family"));
///
/// assert_eq!(pipeline.len(), 2);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn ContactFilter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The standard publication rule: named, reachable, and in
    /// `match_category` when one is configured.
    ///
    /// Produces the same result as keeping the contacts for which
    /// [`crate::qualifies`] holds.
    pub fn qualification(match_category: &str) -> Self {
        Self::new()
            .add_filter(NamedFilter)
            .add_filter(ReachableFilter)
            .add_filter(CategoryFilter::new(match_category))
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl ContactFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters, in application order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Whether a single contact passes every filter.
    pub fn accepts(&self, contact: &Contact) -> bool {
        self.filters.iter().all(|f| f.accepts(contact))
    }

    /// Apply all filters in sequence to the contacts.
    ///
    /// Order of the surviving contacts is the input order.
    pub fn apply(&self, contacts: Vec<Contact>) -> Vec<Contact> {
        let mut current = contacts;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current);
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::fixtures::{contact, with_category, with_phone};

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let contacts = vec![contact("", ""), contact("Jane", "Doe")];

        let filtered = pipeline.apply(contacts);
        assert_eq!(filtered.len(), 2);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_single_filter() {
        let pipeline = FilterPipeline::new().add_filter(NamedFilter);

        let filtered = pipeline.apply(vec![contact("", ""), contact("Jane", "Doe")]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].full_name(), "Jane Doe");
    }

    #[test]
    fn test_qualification_pipeline_shape() {
        let pipeline = FilterPipeline::qualification("Family");
        assert_eq!(
            pipeline.filter_names(),
            vec!["NamedFilter", "ReachableFilter", "CategoryFilter"]
        );

        let family = with_category(with_phone(contact("Mum", "Doe")), "Family");
        let work = with_category(with_phone(contact("Boss", "Roe")), "Work");
        assert!(pipeline.accepts(&family));
        assert!(!pipeline.accepts(&work));
    }
}
