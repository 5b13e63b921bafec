use async_trait::async_trait;

use crate::utils::{CircuitState, IsTransient};

/// Someone we can write to
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub email: String,
    pub name: String,
}

impl Contact {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }
}

/// A rendered e-mail ready for the transport
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Template name, used for metrics and provider tagging
    pub template: &'static str,
    pub to: Contact,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Mail provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail circuit breaker is open")]
    CircuitOpen,

    #[error("Recipient lookup failed: {0}")]
    Directory(String),

    #[error("Undecodable event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl IsTransient for MailError {
    fn is_transient(&self) -> bool {
        match self {
            MailError::Transport(_) | MailError::CircuitOpen | MailError::Directory(_) => true,
            MailError::Rejected { status, .. } => *status == 429 || *status >= 500,
            MailError::Payload(_) => false,
        }
    }
}

impl From<reqwest::Error> for MailError {
    fn from(err: reqwest::Error) -> Self {
        MailError::Transport(err.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;

    fn name(&self) -> &'static str;

    /// State of the transport's circuit breaker, when it has one
    async fn circuit_state(&self) -> Option<CircuitState> {
        None
    }
}

/// Transport used when no mail provider is configured
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            template = email.template,
            to = %email.to.email,
            subject = %email.subject,
            "✉️  Mail (log transport)"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(MailError::Transport("reset".into()).is_transient());
        assert!(MailError::CircuitOpen.is_transient());
        assert!(MailError::Rejected { status: 503, body: String::new() }.is_transient());
        assert!(MailError::Rejected { status: 429, body: String::new() }.is_transient());
        assert!(!MailError::Rejected { status: 400, body: String::new() }.is_transient());

        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!MailError::Payload(bad_json).is_transient());
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let email = OutgoingEmail {
            template: "order_receipt",
            to: Contact::new("jane@example.com", "Jane"),
            subject: "Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
        };
        assert!(LogMailer.send(&email).await.is_ok());
        assert!(LogMailer.circuit_state().await.is_none());
    }
}
