use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::DomainEvent;
use super::value_objects::ApplicantDetails;

// ============================================================================
// Expression of Interest Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InterestEvent {
    Submitted(InterestSubmitted),
    Approved(InterestApproved),
    Rejected(InterestRejected),
}

impl DomainEvent for InterestEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InterestEvent::Submitted(_) => "InterestSubmitted",
            InterestEvent::Approved(_) => "InterestApproved",
            InterestEvent::Rejected(_) => "InterestRejected",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InterestSubmitted {
    pub interest_id: Uuid,
    pub user_id: Uuid,
    pub details: ApplicantDetails,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InterestApproved {
    pub user_id: Uuid,
    pub approved_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InterestRejected {
    pub reason: Option<String>,
    pub rejected_at: DateTime<Utc>,
}
