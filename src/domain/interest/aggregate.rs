use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::Aggregate;
use crate::persistence::store::Document;
use super::commands::InterestCommand;
use super::errors::InterestError;
use super::events::*;
use super::value_objects::{ApplicantDetails, InterestStatus};

// ============================================================================
// Expression of Interest Aggregate - a brand's application to sell
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestAggregate {
    pub id: Uuid,
    #[serde(default)]
    pub version: i64,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub details: ApplicantDetails,
    pub status: InterestStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl InterestAggregate {
    fn ensure_pending(&self) -> Result<(), InterestError> {
        if self.status != InterestStatus::Pending {
            return Err(InterestError::AlreadyReviewed(self.status));
        }
        Ok(())
    }
}

impl Aggregate for InterestAggregate {
    type Event = InterestEvent;
    type Command = InterestCommand;
    type Error = InterestError;

    fn handle_create(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            InterestCommand::Submit { interest_id, user_id, details } => {
                if details.brand_name.trim().is_empty() {
                    return Err(InterestError::EmptyBrandName);
                }
                if details.contact_name.trim().is_empty() {
                    return Err(InterestError::EmptyContactName);
                }

                Ok(InterestEvent::Submitted(InterestSubmitted {
                    interest_id: *interest_id,
                    user_id: *user_id,
                    details: details.clone(),
                    submitted_at: Utc::now(),
                }))
            }
            _ => Err(InterestError::NotInitialized),
        }
    }

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            InterestEvent::Submitted(e) => Ok(Self {
                id: e.interest_id,
                version: 0,
                user_id: e.user_id,
                details: e.details.clone(),
                status: InterestStatus::Pending,
                rejection_reason: None,
                created_at: e.submitted_at,
                reviewed_at: None,
            }),
            _ => Err(InterestError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            InterestEvent::Submitted(_) => {}
            InterestEvent::Approved(e) => {
                self.status = InterestStatus::Approved;
                self.reviewed_at = Some(e.approved_at);
            }
            InterestEvent::Rejected(e) => {
                self.status = InterestStatus::Rejected;
                self.rejection_reason = e.reason.clone();
                self.reviewed_at = Some(e.rejected_at);
            }
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InterestCommand::Submit { .. } => Err(InterestError::NotInitialized),
            InterestCommand::Approve => {
                self.ensure_pending()?;
                Ok(vec![InterestEvent::Approved(InterestApproved {
                    user_id: self.user_id,
                    approved_at: Utc::now(),
                })])
            }
            InterestCommand::Reject { reason } => {
                self.ensure_pending()?;
                Ok(vec![InterestEvent::Rejected(InterestRejected {
                    reason: reason.clone().filter(|r| !r.trim().is_empty()),
                    rejected_at: Utc::now(),
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

impl Document for InterestAggregate {
    const COLLECTION: &'static str = "expressions_of_interest";
    const AGGREGATE_TYPE: &'static str = "ExpressionOfInterest";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Email;

    fn submit() -> InterestCommand {
        InterestCommand::Submit {
            interest_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            details: ApplicantDetails {
                brand_name: "Atelier Nord".to_string(),
                contact_name: "Ola".to_string(),
                email: Email::parse("ola@atelier.no").unwrap(),
                phone: String::new(),
                website: "https://atelier.no".to_string(),
                instagram_handle: "@ateliernord".to_string(),
                message: "We make wool coats".to_string(),
            },
        }
    }

    #[test]
    fn test_submit_is_pending() {
        let (interest, _) = InterestAggregate::create(&submit()).unwrap();
        assert_eq!(interest.status, InterestStatus::Pending);
        assert!(interest.reviewed_at.is_none());
    }

    #[test]
    fn test_submit_requires_brand_name() {
        let mut command = submit();
        if let InterestCommand::Submit { details, .. } = &mut command {
            details.brand_name = " ".to_string();
        }
        assert!(matches!(InterestAggregate::create(&command), Err(InterestError::EmptyBrandName)));
    }

    #[test]
    fn test_approve() {
        let (mut interest, _) = InterestAggregate::create(&submit()).unwrap();
        interest.execute(&InterestCommand::Approve).unwrap();

        assert_eq!(interest.status, InterestStatus::Approved);
        assert!(interest.reviewed_at.is_some());
    }

    #[test]
    fn test_reject_keeps_reason() {
        let (mut interest, _) = InterestAggregate::create(&submit()).unwrap();
        interest
            .execute(&InterestCommand::Reject { reason: Some("Not a fit".to_string()) })
            .unwrap();

        assert_eq!(interest.status, InterestStatus::Rejected);
        assert_eq!(interest.rejection_reason.as_deref(), Some("Not a fit"));
    }

    #[test]
    fn test_only_pending_can_be_reviewed() {
        let (mut interest, _) = InterestAggregate::create(&submit()).unwrap();
        interest.execute(&InterestCommand::Reject { reason: None }).unwrap();

        let result = interest.handle_command(&InterestCommand::Approve);
        assert!(matches!(
            result,
            Err(InterestError::AlreadyReviewed(InterestStatus::Rejected))
        ));
    }

    #[test]
    fn test_document_is_flat() {
        let (interest, _) = InterestAggregate::create(&submit()).unwrap();
        let json = serde_json::to_value(&interest).unwrap();

        assert_eq!(json["brand_name"], "Atelier Nord");
        assert_eq!(json["status"], "Pending");

        let back: InterestAggregate = serde_json::from_value(json).unwrap();
        assert_eq!(back.details.email.as_str(), "ola@atelier.no");
    }
}
