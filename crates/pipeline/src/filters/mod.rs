//! Filter implementations for the contact pipeline.
//!
//! Each filter checks one clause of the qualification rule; together they
//! make up `FilterPipeline::qualification`.

pub mod category;
pub mod named;
pub mod reachable;

// Re-export for convenience
pub use category::CategoryFilter;
pub use named::NamedFilter;
pub use reachable::ReachableFilter;

#[cfg(test)]
pub(crate) mod fixtures {
    use contacts::{Contact, Email, Fingerprint, PhoneNumber};

    pub fn contact(given: &str, family: &str) -> Contact {
        Contact::new(Fingerprint::of(&format!("{given}|{family}")), given, family)
    }

    pub fn with_phone(mut contact: Contact) -> Contact {
        contact.phone_numbers.push(PhoneNumber {
            kind: "CELL".to_string(),
            number: "555-0100".to_string(),
        });
        contact
    }

    pub fn with_email(mut contact: Contact) -> Contact {
        contact.emails.push(Email {
            kind: String::new(),
            address: "someone@example.com".to_string(),
        });
        contact
    }

    pub fn with_category(mut contact: Contact, category: &str) -> Contact {
        contact.categories.insert(category.to_string());
        contact
    }
}
