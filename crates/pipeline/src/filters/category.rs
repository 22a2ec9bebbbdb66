//! Filter to restrict contacts to one configured category.

use crate::traits::ContactFilter;
use contacts::Contact;

/// Keeps contacts tagged with the configured category.
///
/// The match category is trimmed on construction; an empty one disables the
/// filter and every contact passes.
pub struct CategoryFilter {
    category: String,
}

impl CategoryFilter {
    /// Create a new CategoryFilter.
    ///
    /// # Arguments
    /// * `category` - Category label to require, compared exactly after
    ///   trimming; empty means "no restriction"
    pub fn new(category: impl AsRef<str>) -> Self {
        Self {
            category: category.as_ref().trim().to_string(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_unrestricted(&self) -> bool {
        self.category.is_empty()
    }
}

impl ContactFilter for CategoryFilter {
    fn name(&self) -> &str {
        "CategoryFilter"
    }

    fn accepts(&self, contact: &Contact) -> bool {
        self.is_unrestricted() || contact.of_category(&self.category)
    }
}
