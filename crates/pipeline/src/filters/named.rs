//! Filter to drop contacts without a usable name.

use crate::traits::ContactFilter;
use contacts::Contact;

/// Removes contacts whose full name is empty.
pub struct NamedFilter;

impl ContactFilter for NamedFilter {
    fn name(&self) -> &str {
        "NamedFilter"
    }

    fn accepts(&self, contact: &Contact) -> bool {
        contact.has_full_name()
    }
}
