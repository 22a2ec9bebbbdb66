//! The qualification rule as a single predicate.

use contacts::Contact;

/// Whether `contact` may be published.
///
/// A contact qualifies when it has a non-empty full name, at least one of
/// birthday / email / phone number, and (when `match_category` is not blank)
/// carries the match category. Blank means no category restriction.
pub fn qualifies(contact: &Contact, match_category: &str) -> bool {
    let category = match_category.trim();
    contact.has_full_name()
        && (contact.has_birthday() || contact.has_emails() || contact.has_phone_numbers())
        && (category.is_empty() || contact.of_category(category))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::fixtures::{contact, with_category, with_email, with_phone};
    use chrono::NaiveDate;

    #[test]
    fn test_name_alone_never_qualifies() {
        let named = contact("No", "Fields");
        assert!(!qualifies(&named, ""));
        assert!(!qualifies(&named, "Family"));
    }

    #[test]
    fn test_birthday_qualifies_without_category() {
        let mut c = contact("Jane", "Doe");
        c.birthday = NaiveDate::from_ymd_opt(1985, 4, 12);
        assert!(qualifies(&c, ""));
        assert!(qualifies(&c, "   "));
    }

    #[test]
    fn test_category_decides_when_configured() {
        let c = with_category(with_phone(contact("Jane", "Doe")), "Family");
        assert!(qualifies(&c, "Family"));
        assert!(qualifies(&c, " Family "));
        assert!(!qualifies(&c, "Work"));
    }

    #[test]
    fn test_nameless_contact_never_qualifies() {
        let c = with_email(with_phone(contact("", "")));
        assert!(!qualifies(&c, ""));
    }

    #[test]
    fn test_qualifies_is_repeatable() {
        let c = with_category(with_email(contact("Jane", "Doe")), "Work");
        for category in ["", "Work", "Family"] {
            assert_eq!(qualifies(&c, category), qualifies(&c, category));
        }
    }
}
