use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// Background components report a `ComponentHealth`; the /api/health route
// folds them together with the database check.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    /// The worse of two statuses
    pub fn worst(self, other: HealthStatus) -> HealthStatus {
        fn rank(status: &HealthStatus) -> u8 {
            match status {
                HealthStatus::Healthy => 0,
                HealthStatus::Degraded(_) => 1,
                HealthStatus::Unhealthy(_) => 2,
            }
        }
        if rank(&other) > rank(&self) {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    #[serde(flatten)]
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub trait HealthCheckable {
    fn check_health(&self) -> ComponentHealth;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worst_status_wins() {
        let degraded = HealthStatus::Degraded("slow".into());
        let down = HealthStatus::Unhealthy("down".into());

        assert_eq!(HealthStatus::Healthy.worst(degraded.clone()), degraded);
        assert_eq!(down.clone().worst(degraded.clone()), down);
        assert_eq!(HealthStatus::Healthy.worst(HealthStatus::Healthy), HealthStatus::Healthy);
    }

    #[test]
    fn test_component_health_json() {
        let health = ComponentHealth::new("outbox_relay", HealthStatus::Degraded("circuit open".into()))
            .with_details("3 pending");
        let json = serde_json::to_value(&health).unwrap();

        assert_eq!(json["name"], "outbox_relay");
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["reason"], "circuit open");
        assert_eq!(json["details"], "3 pending");
    }
}
