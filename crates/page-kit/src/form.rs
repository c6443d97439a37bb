//! Form Utilities

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::dom::Dom;

/// Field name to value, as submitted
pub type FormRecord = BTreeMap<String, String>;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

/// `something@domain.tld` shape check
pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email)
}

/// Non-empty once surrounding whitespace is removed
pub fn validate_required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Collect a form's named fields. Repeated names keep the last value.
pub fn form_record<D: Dom + ?Sized>(dom: &D, form: &D::Node) -> FormRecord {
    dom.form_entries(form).into_iter().collect()
}

/// Clear a form's fields
pub fn reset_form<D: Dom + ?Sized>(dom: &D, form: Option<&D::Node>, show_confirmation: bool) {
    if let Some(form) = form {
        dom.reset_form(form);
        if show_confirmation {
            tracing::info!("Form reset successfully");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_validate_required() {
        assert!(!validate_required("  "));
        assert!(!validate_required(""));
        assert!(validate_required("x"));
        assert!(validate_required("  x  "));
    }

    #[test]
    fn test_form_record_and_reset() {
        let dom = MemoryDom::new();
        let form = dom.append(dom.root(), "form", &[("id", "contactForm")]);
        dom.set_field(form, "name", "Ada");
        dom.set_field(form, "email", "ada@example.com");

        let record = form_record(&dom, &form);
        assert_eq!(record.get("name").map(String::as_str), Some("Ada"));
        assert_eq!(record.len(), 2);

        reset_form(&dom, Some(&form), true);
        assert_eq!(dom.field(form, "email").as_deref(), Some(""));
    }
}
