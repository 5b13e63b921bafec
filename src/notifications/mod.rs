// ============================================================================
// Notifications - e-mails rendered from outbox messages
// ============================================================================
//
// The outbox relay hands each undelivered message to the `Notifier`, which
// plans the e-mails for it and sends them through the configured transport
// with retry. Transports sit behind the `Mailer` trait.
//
// ============================================================================

pub mod mailer;
pub mod mailjet;
pub mod planner;
pub mod templates;

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

pub use mailer::{Contact, LogMailer, MailError, Mailer};
pub use mailjet::MailjetMailer;
pub use planner::{Directory, UserDirectory};

use crate::config::MailConfig;
use crate::metrics::Metrics;
use crate::utils::{retry_with_backoff, RetryConfig};

/// A row of `outbox_messages` awaiting delivery
#[derive(Debug, Clone)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub aggregate_type: String,
    pub event_type: String,
    pub payload: Value,
    pub attempts: i32,
}

pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    directory: Arc<dyn Directory>,
    admin: Contact,
    retry: RetryConfig,
    metrics: Arc<Metrics>,
}

impl Notifier {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        directory: Arc<dyn Directory>,
        admin: Contact,
        retry: RetryConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            mailer,
            directory,
            admin,
            retry,
            metrics,
        }
    }

    /// Pick Mailjet when its keys are configured, the log transport otherwise
    pub fn transport_for(config: &MailConfig) -> Result<Arc<dyn Mailer>, reqwest::Error> {
        if config.mailjet_enabled() {
            Ok(Arc::new(MailjetMailer::new(config.clone())?))
        } else {
            tracing::warn!("Mailjet keys not configured, mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }

    pub fn mailer(&self) -> &Arc<dyn Mailer> {
        &self.mailer
    }

    /// Send every e-mail the message calls for. Returns how many went out.
    pub async fn deliver(&self, message: &OutboxMessage) -> Result<usize, MailError> {
        let emails = planner::plan(message, self.directory.as_ref(), &self.admin).await?;
        let mailer = self.mailer.as_ref();

        for email in &emails {
            retry_with_backoff(&self.retry, email.template, move |_attempt| mailer.send(email))
                .await
                .into_result()?;
            self.metrics.record_mail_sent(email.template);
        }

        Ok(emails.len())
    }
}
