use serde::{Deserialize, Serialize};

use crate::domain::shared::Email;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestStatus {
    Pending,
    Approved,
    Rejected,
}

impl InterestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestStatus::Pending => "Pending",
            InterestStatus::Approved => "Approved",
            InterestStatus::Rejected => "Rejected",
        }
    }
}

/// What a brand tells us when applying to sell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantDetails {
    pub brand_name: String,
    pub contact_name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub instagram_handle: String,
    #[serde(default)]
    pub message: String,
}
