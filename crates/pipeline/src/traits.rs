//! Core traits for the filtering pipeline.
//!
//! This module defines the ContactFilter trait that allows composable
//! predicates to be applied to a batch of parsed contacts.

use contacts::Contact;

/// Core trait for filtering contacts.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared with the refresher's worker
/// - `accepts` is a pure predicate and never fails
/// - `apply` takes ownership of the Vec and returns the kept contacts in
///   their original order
pub trait ContactFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether `contact` passes this filter.
    fn accepts(&self, contact: &Contact) -> bool;

    /// Keep the contacts this filter accepts.
    fn apply(&self, contacts: Vec<Contact>) -> Vec<Contact> {
        contacts.into_iter().filter(|c| self.accepts(c)).collect()
    }
}
