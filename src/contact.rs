//! Contact Form
//!
//! Validates the contact form on submit and hands valid submissions to a
//! `SubmissionSink`. The stock sink only logs; deployments supply their own.

use async_trait::async_trait;
use page_kit::{form_record, is_valid_email, reset_form, validate_required, Dom, FormRecord};
use serde::Serialize;

use crate::error::{SiteError, SiteResult};

pub const FORM_ID: &str = "contactForm";
pub const ACKNOWLEDGEMENT: &str = "Thank you for your message! We will get back to you soon.";
pub const SEND_FAILURE: &str = "Sorry, your message could not be sent. Please try again later.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    MissingName,
    MissingEmail,
    InvalidEmail,
    MissingMessage,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            FieldError::MissingName => "Please enter your name.",
            FieldError::MissingEmail => "Please enter your email address.",
            FieldError::InvalidEmail => "Please enter a valid email address.",
            FieldError::MissingMessage => "Please enter a message.",
        };
        f.write_str(msg)
    }
}

impl ContactSubmission {
    pub fn from_record(record: &FormRecord) -> Self {
        let field = |name: &str| record.get(name).map(|v| v.trim().to_string()).unwrap_or_default();
        Self {
            name: field("name"),
            email: field("email"),
            subject: field("subject"),
            message: field("message"),
        }
    }

    /// Name, email and message are required; subject is optional
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if !validate_required(&self.name) {
            errors.push(FieldError::MissingName);
        }
        if !validate_required(&self.email) {
            errors.push(FieldError::MissingEmail);
        } else if !is_valid_email(&self.email) {
            errors.push(FieldError::InvalidEmail);
        }
        if !validate_required(&self.message) {
            errors.push(FieldError::MissingMessage);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Delivers accepted submissions
#[async_trait(?Send)]
pub trait SubmissionSink {
    async fn submit(&self, submission: &ContactSubmission) -> SiteResult<()>;
}

/// Logs submissions and delivers nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait(?Send)]
impl SubmissionSink for LogSink {
    async fn submit(&self, submission: &ContactSubmission) -> SiteResult<()> {
        tracing::info!(
            from = %submission.email,
            subject = %submission.subject,
            "Contact submission not delivered: no submission endpoint configured"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Sent(ContactSubmission),
    Rejected(Vec<FieldError>),
    Failed(SiteError),
}

fn rejection_message(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}

/// Handle one submit of `form`
pub async fn handle_submit<D, K>(dom: &D, form: &D::Node, sink: &K) -> SubmitOutcome
where
    D: Dom + ?Sized,
    K: SubmissionSink + ?Sized,
{
    let submission = ContactSubmission::from_record(&form_record(dom, form));

    if let Err(errors) = submission.validate() {
        tracing::warn!("Form rejected: {:?}", errors);
        dom.alert(&rejection_message(&errors));
        return SubmitOutcome::Rejected(errors);
    }

    let delivered = match submission_json(&submission) {
        Ok(json) => {
            tracing::info!("Form submitted: {}", json);
            sink.submit(&submission).await
        }
        Err(e) => Err(e),
    };

    match delivered {
        Ok(()) => {
            dom.alert(ACKNOWLEDGEMENT);
            reset_form(dom, Some(form), false);
            SubmitOutcome::Sent(submission)
        }
        Err(e) => {
            tracing::error!("Form submission failed: {}", e);
            dom.alert(SEND_FAILURE);
            SubmitOutcome::Failed(e)
        }
    }
}

fn submission_json(submission: &ContactSubmission) -> SiteResult<String> {
    serde_json::to_string(submission).map_err(|e| SiteError::Submission(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use page_kit::{MemoryDom, NodeId};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        received: RefCell<Vec<ContactSubmission>>,
        fail: bool,
    }

    #[async_trait(?Send)]
    impl SubmissionSink for RecordingSink {
        async fn submit(&self, submission: &ContactSubmission) -> SiteResult<()> {
            if self.fail {
                return Err(SiteError::Submission("endpoint unreachable".to_string()));
            }
            self.received.borrow_mut().push(submission.clone());
            Ok(())
        }
    }

    fn form(fields: &[(&str, &str)]) -> (MemoryDom, NodeId) {
        let dom = MemoryDom::new();
        let form = dom.append(dom.root(), "form", &[("id", FORM_ID)]);
        for (name, value) in fields {
            dom.set_field(form, name, value);
        }
        (dom, form)
    }

    #[test]
    fn test_valid_submission_is_sent_acknowledged_and_reset() {
        let (dom, form) = form(&[
            ("name", " Ada "),
            ("email", "ada@example.com"),
            ("subject", "Hello"),
            ("message", "Can we talk?"),
        ]);
        let sink = RecordingSink::default();

        let outcome = block_on(handle_submit(&dom, &form, &sink));

        let expected = ContactSubmission {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Hello".to_string(),
            message: "Can we talk?".to_string(),
        };
        assert_eq!(outcome, SubmitOutcome::Sent(expected.clone()));
        assert_eq!(*sink.received.borrow(), vec![expected]);
        assert_eq!(dom.alerts(), vec![ACKNOWLEDGEMENT.to_string()]);
        assert_eq!(dom.field(form, "message").as_deref(), Some(""));
    }

    #[test]
    fn test_invalid_submission_is_blocked() {
        let (dom, form) = form(&[("name", "  "), ("email", "not-an-email"), ("message", "hi")]);
        let sink = RecordingSink::default();

        let outcome = block_on(handle_submit(&dom, &form, &sink));

        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(vec![FieldError::MissingName, FieldError::InvalidEmail])
        );
        assert!(sink.received.borrow().is_empty());
        assert_eq!(dom.field(form, "email").as_deref(), Some("not-an-email"));
        assert_eq!(
            dom.alerts(),
            vec!["Please enter your name.\nPlease enter a valid email address.".to_string()]
        );
    }

    #[test]
    fn test_sink_failure_keeps_form() {
        let (dom, form) = form(&[("name", "Ada"), ("email", "a@b.co"), ("message", "hi")]);
        let sink = RecordingSink {
            fail: true,
            ..Default::default()
        };

        let outcome = block_on(handle_submit(&dom, &form, &sink));

        assert!(matches!(outcome, SubmitOutcome::Failed(SiteError::Submission(_))));
        assert_eq!(dom.alerts(), vec![SEND_FAILURE.to_string()]);
        assert_eq!(dom.field(form, "name").as_deref(), Some("Ada"));
    }

    #[test]
    fn test_missing_fields_all_reported() {
        let submission = ContactSubmission::default();
        assert_eq!(
            submission.validate(),
            Err(vec![
                FieldError::MissingName,
                FieldError::MissingEmail,
                FieldError::MissingMessage
            ])
        );
    }

    #[test]
    fn test_submission_json_shape() {
        let submission = ContactSubmission {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            subject: String::new(),
            message: "Hi".to_string(),
        };
        assert_eq!(
            submission_json(&submission).unwrap(),
            r#"{"name":"Ada","email":"ada@example.com","subject":"","message":"Hi"}"#
        );
    }

    #[test]
    fn test_log_sink_accepts() {
        let submission = ContactSubmission::default();
        assert!(block_on(LogSink.submit(&submission)).is_ok());
    }
}
