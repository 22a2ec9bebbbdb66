//! Filter to keep only contacts that carry something worth publishing.

use crate::traits::ContactFilter;
use contacts::Contact;

/// Keeps contacts with a birthday, at least one email, or at least one
/// phone number.
pub struct ReachableFilter;

impl ContactFilter for ReachableFilter {
    fn name(&self) -> &str {
        "ReachableFilter"
    }

    fn accepts(&self, contact: &Contact) -> bool {
        contact.has_birthday() || contact.has_emails() || contact.has_phone_numbers()
    }
}
