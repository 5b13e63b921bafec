use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::config::MailConfig;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
use super::mailer::{MailError, Mailer, OutgoingEmail};

// ============================================================================
// Mailjet Send API v3.1 transport
// ============================================================================

pub struct MailjetMailer {
    client: reqwest::Client,
    config: MailConfig,
    circuit_breaker: CircuitBreaker,
}

impl MailjetMailer {
    pub fn new(config: MailConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let cb_config = CircuitBreakerConfig {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 2,
        };

        Ok(Self {
            client,
            config,
            circuit_breaker: CircuitBreaker::new("mailjet", cb_config),
        })
    }

    async fn post(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.config.mailjet_url)
            .basic_auth(&self.config.mailjet_api_key, Some(&self.config.mailjet_secret_key))
            .json(&payload(&self.config, email))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Mailer for MailjetMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        match self.circuit_breaker.call(self.post(email)).await {
            Ok(()) => {
                tracing::info!(
                    template = email.template,
                    to = %email.to.email,
                    "Sent mail via Mailjet"
                );
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::error!(template = email.template, "Circuit breaker open - Mailjet unavailable");
                Err(MailError::CircuitOpen)
            }
            Err(CircuitBreakerError::OperationFailed(e)) => {
                tracing::error!(
                    error = %e,
                    template = email.template,
                    to = %email.to.email,
                    "Failed to send mail via Mailjet"
                );
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "mailjet"
    }

    async fn circuit_state(&self) -> Option<CircuitState> {
        Some(self.circuit_breaker.state().await)
    }
}

fn payload(config: &MailConfig, email: &OutgoingEmail) -> serde_json::Value {
    json!({
        "Messages": [{
            "From": { "Email": config.sender_email, "Name": config.sender_name },
            "To": [{ "Email": email.to.email, "Name": email.to.name }],
            "Subject": email.subject,
            "HTMLPart": email.html,
            "CustomID": email.template,
        }]
    })
}
