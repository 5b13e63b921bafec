use uuid::Uuid;

use super::value_objects::ApplicantDetails;

#[derive(Debug, Clone)]
pub enum InterestCommand {
    Submit {
        interest_id: Uuid,
        /// The brand account created alongside the application
        user_id: Uuid,
        details: ApplicantDetails,
    },
    Approve,
    Reject {
        reason: Option<String>,
    },
}
