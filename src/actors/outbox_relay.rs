use actix::prelude::*;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::RelayConfig;
use crate::metrics::Metrics;
use crate::notifications::{MailError, Notifier, OutboxMessage};
use crate::utils::{CircuitState, IsTransient};
use super::core::{ComponentHealth, HealthCheckable, HealthStatus};

// ============================================================================
// Outbox Relay Actor - Polls outbox_messages and sends notifications
// ============================================================================
//
// 1. Fetch undelivered messages in creation order
// 2. Hand each one to the Notifier (retry + circuit breaker inside)
// 3. Mark it delivered, or count the failed attempt
// 4. Dead-letter messages that fail permanently or exhaust their attempts
//
// Delivery is at-least-once: a message that fails halfway through its
// e-mails is retried as a whole.
//
// ============================================================================

const COMPONENT: &str = "outbox_relay";

pub struct OutboxRelay {
    pool: PgPool,
    notifier: Arc<Notifier>,
    config: RelayConfig,
    metrics: Arc<Metrics>,
    stats: Arc<Mutex<RelayStats>>,
}

#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    pub last_poll: Option<DateTime<Utc>>,
    pub last_backlog: usize,
    pub delivered: u64,
    pub dead_lettered: u64,
    pub last_error: Option<String>,
    pub circuit: Option<CircuitState>,
}

#[derive(Debug, Default, PartialEq)]
struct PollSummary {
    fetched: usize,
    delivered: usize,
    failed: usize,
    dead_lettered: usize,
}

/// What to do with a message whose delivery just failed
#[derive(Debug, PartialEq)]
enum FailureOutcome {
    /// Leave it untouched and stop the batch
    Postpone,
    /// Count the attempt, try again on a later poll
    Retry,
    DeadLetter,
}

fn failure_outcome(error: &MailError, attempts_before: i32, max_attempts: i32) -> FailureOutcome {
    if matches!(error, MailError::CircuitOpen) {
        return FailureOutcome::Postpone;
    }
    if !error.is_transient() || attempts_before + 1 >= max_attempts {
        return FailureOutcome::DeadLetter;
    }
    FailureOutcome::Retry
}

impl OutboxRelay {
    pub fn new(pool: PgPool, notifier: Arc<Notifier>, config: RelayConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            pool,
            notifier,
            config,
            metrics,
            stats: Arc::new(Mutex::new(RelayStats::default())),
        }
    }

    fn worker(&self) -> RelayWorker {
        RelayWorker {
            pool: self.pool.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            stats: self.stats.clone(),
        }
    }

    fn snapshot(&self) -> RelayStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

/// The polling half of the relay, moved into the spawned loop
struct RelayWorker {
    pool: PgPool,
    notifier: Arc<Notifier>,
    config: RelayConfig,
    metrics: Arc<Metrics>,
    stats: Arc<Mutex<RelayStats>>,
}

impl RelayWorker {
    async fn run(self) {
        tracing::info!(
            poll_interval_ms = self.config.poll_interval_ms,
            batch_size = self.config.batch_size,
            max_attempts = self.config.max_attempts,
            "🔄 Starting outbox relay"
        );

        loop {
            match self.poll_once().await {
                Ok(summary) if summary.fetched > 0 => {
                    tracing::info!(
                        fetched = summary.fetched,
                        delivered = summary.delivered,
                        failed = summary.failed,
                        dead_lettered = summary.dead_lettered,
                        "📬 Outbox batch processed"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Failed to poll outbox messages");
                    self.update_stats(|s| s.last_error = Some(e.to_string()));
                }
            }

            let circuit = self.notifier.mailer().circuit_state().await;
            if let Some(state) = circuit {
                self.metrics.set_circuit_state(state);
            }
            self.update_stats(|s| s.circuit = circuit);

            sleep(self.config.poll_interval()).await;
        }
    }

    async fn poll_once(&self) -> Result<PollSummary, sqlx::Error> {
        let messages = self.fetch_pending().await?;
        let mut summary = PollSummary {
            fetched: messages.len(),
            ..Default::default()
        };

        self.metrics.outbox_backlog.set(messages.len() as i64);
        self.update_stats(|s| {
            s.last_poll = Some(Utc::now());
            s.last_backlog = messages.len();
        });

        for message in messages {
            tracing::debug!(
                message_id = %message.id,
                event_type = %message.event_type,
                aggregate_type = %message.aggregate_type,
                aggregate_id = %message.aggregate_id,
                "📤 Delivering outbox message"
            );

            match self.notifier.deliver(&message).await {
                Ok(mails) => {
                    self.mark_delivered(&message).await?;
                    self.metrics.record_delivered(&message.event_type, mails);
                    self.update_stats(|s| s.delivered += 1);
                    summary.delivered += 1;
                }
                Err(error) => {
                    self.metrics.record_failed(&message.event_type);
                    self.update_stats(|s| s.last_error = Some(error.to_string()));
                    summary.failed += 1;

                    match failure_outcome(&error, message.attempts, self.config.max_attempts) {
                        FailureOutcome::Postpone => {
                            tracing::warn!(
                                message_id = %message.id,
                                "Mail transport unavailable, postponing the rest of the batch"
                            );
                            break;
                        }
                        FailureOutcome::Retry => {
                            tracing::warn!(
                                message_id = %message.id,
                                event_type = %message.event_type,
                                attempts = message.attempts + 1,
                                error = %error,
                                "❌ Delivery failed, will retry"
                            );
                            self.record_failure(&message, &error, false).await?;
                        }
                        FailureOutcome::DeadLetter => {
                            tracing::error!(
                                message_id = %message.id,
                                event_type = %message.event_type,
                                attempts = message.attempts + 1,
                                error = %error,
                                "💀 Moving outbox message to dead letter"
                            );
                            self.record_failure(&message, &error, true).await?;
                            self.metrics.record_dead_lettered(&message.event_type);
                            self.update_stats(|s| s.dead_lettered += 1);
                            summary.dead_lettered += 1;
                        }
                    }
                }
            }
        }

        Ok(summary)
    }

    async fn fetch_pending(&self) -> Result<Vec<OutboxMessage>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT id, aggregate_id, aggregate_type, event_type, payload, attempts
             FROM outbox_messages
             WHERE delivered_at IS NULL AND dead_lettered_at IS NULL
             ORDER BY created_at, sequence_number
             LIMIT $1",
        )
        .bind(self.config.batch_size)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(OutboxMessage {
                    id: row.try_get("id")?,
                    aggregate_id: row.try_get("aggregate_id")?,
                    aggregate_type: row.try_get("aggregate_type")?,
                    event_type: row.try_get("event_type")?,
                    payload: row.try_get("payload")?,
                    attempts: row.try_get("attempts")?,
                })
            })
            .collect()
    }

    async fn mark_delivered(&self, message: &OutboxMessage) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE outbox_messages
             SET delivered_at = NOW(), attempts = attempts + 1, last_error = NULL
             WHERE id = $1",
        )
        .bind(message.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_failure(
        &self,
        message: &OutboxMessage,
        error: &MailError,
        dead_letter: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE outbox_messages
             SET attempts = attempts + 1,
                 last_error = $2,
                 dead_lettered_at = CASE WHEN $3 THEN NOW() ELSE dead_lettered_at END
             WHERE id = $1",
        )
        .bind(message.id)
        .bind(error.to_string())
        .bind(dead_letter)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn update_stats(&self, f: impl FnOnce(&mut RelayStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }
}

/// Fold relay statistics into a health report
fn assess(stats: &RelayStats, poll_interval: Duration, now: DateTime<Utc>) -> ComponentHealth {
    let stale_after = chrono::Duration::from_std(poll_interval * 10).unwrap_or_else(|_| chrono::Duration::minutes(1));

    let status = match stats.last_poll {
        None => HealthStatus::Degraded("relay has not polled yet".to_string()),
        Some(at) if now - at > stale_after => {
            HealthStatus::Unhealthy(format!("no poll since {}", at.to_rfc3339()))
        }
        Some(_) if stats.circuit == Some(CircuitState::Open) => {
            HealthStatus::Degraded("mail circuit breaker is open".to_string())
        }
        Some(_) => HealthStatus::Healthy,
    };

    ComponentHealth::new(COMPONENT, status).with_details(format!(
        "backlog={} delivered={} dead_lettered={}",
        stats.last_backlog, stats.delivered, stats.dead_lettered
    ))
}

impl HealthCheckable for OutboxRelay {
    fn check_health(&self) -> ComponentHealth {
        assess(&self.snapshot(), self.config.poll_interval(), Utc::now())
    }
}

impl Actor for OutboxRelay {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("OutboxRelay actor started");
        let worker = self.worker();
        ctx.spawn(worker.run().into_actor(self));
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "ComponentHealth")]
pub struct GetRelayHealth;

impl Handler<GetRelayHealth> for OutboxRelay {
    type Result = MessageResult<GetRelayHealth>;

    fn handle(&mut self, _msg: GetRelayHealth, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.check_health())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_open_postpones_without_counting() {
        assert_eq!(failure_outcome(&MailError::CircuitOpen, 4, 5), FailureOutcome::Postpone);
    }

    #[test]
    fn test_transient_failure_retries_until_max() {
        let error = MailError::Transport("timeout".to_string());
        assert_eq!(failure_outcome(&error, 0, 5), FailureOutcome::Retry);
        assert_eq!(failure_outcome(&error, 3, 5), FailureOutcome::Retry);
        assert_eq!(failure_outcome(&error, 4, 5), FailureOutcome::DeadLetter);
    }

    #[test]
    fn test_permanent_failure_dead_letters_immediately() {
        let error = MailError::Rejected {
            status: 400,
            body: "invalid recipient".to_string(),
        };
        assert_eq!(failure_outcome(&error, 0, 5), FailureOutcome::DeadLetter);
    }

    #[test]
    fn test_health_before_first_poll_is_degraded() {
        let health = assess(&RelayStats::default(), Duration::from_secs(2), Utc::now());
        assert!(matches!(health.status, HealthStatus::Degraded(_)));
        assert_eq!(health.name, "outbox_relay");
    }

    #[test]
    fn test_stale_relay_is_unhealthy() {
        let now = Utc::now();
        let stats = RelayStats {
            last_poll: Some(now - chrono::Duration::seconds(60)),
            ..Default::default()
        };
        assert!(assess(&stats, Duration::from_secs(2), now).status.is_unhealthy());
    }

    #[test]
    fn test_open_circuit_is_degraded() {
        let now = Utc::now();
        let stats = RelayStats {
            last_poll: Some(now),
            circuit: Some(CircuitState::Open),
            ..Default::default()
        };
        assert!(matches!(assess(&stats, Duration::from_secs(2), now).status, HealthStatus::Degraded(_)));

        let healthy = RelayStats {
            last_poll: Some(now),
            circuit: Some(CircuitState::Closed),
            delivered: 3,
            ..Default::default()
        };
        let health = assess(&healthy, Duration::from_secs(2), now);
        assert_eq!(health.status, HealthStatus::Healthy);
        assert_eq!(health.details.as_deref(), Some("backlog=0 delivered=3 dead_lettered=0"));
    }
}
