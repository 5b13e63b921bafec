use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::actors::{ComponentHealth, GetRelayHealth, HealthStatus};
use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    #[serde(flatten)]
    pub status: HealthStatus,
    pub components: Vec<ComponentHealth>,
}

impl HealthReport {
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        let status = components
            .iter()
            .fold(HealthStatus::Healthy, |acc, c| acc.worst(c.status.clone()));
        Self { status, components }
    }
}

async fn database_health(state: &AppState) -> ComponentHealth {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => ComponentHealth::new("database", HealthStatus::Healthy),
        Err(e) => ComponentHealth::new("database", HealthStatus::Unhealthy(e.to_string())),
    }
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let mut components = vec![database_health(&state).await];

    if let Some(relay) = &state.relay {
        match relay.send(GetRelayHealth).await {
            Ok(health) => components.push(health),
            Err(e) => components.push(ComponentHealth::new(
                "outbox_relay",
                HealthStatus::Unhealthy(format!("relay unreachable: {}", e)),
            )),
        }
    }

    let report = HealthReport::from_components(components);
    if report.status.is_unhealthy() {
        HttpResponse::ServiceUnavailable().json(report)
    } else {
        HttpResponse::Ok().json(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_takes_worst_component() {
        let report = HealthReport::from_components(vec![
            ComponentHealth::new("database", HealthStatus::Healthy),
            ComponentHealth::new("outbox_relay", HealthStatus::Degraded("circuit open".into())),
        ]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["components"].as_array().unwrap().len(), 2);
    }
}
