use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::{BrandProfile, UserAggregate, UserCommand};
use crate::error::AppError;
use crate::persistence::{CommandContext, CommandHandler, DocumentStore};

use super::aggregate::InterestAggregate;
use super::commands::InterestCommand;
use super::value_objects::ApplicantDetails;

// ============================================================================
// Expression of Interest Command Handler
// ============================================================================
//
// An application and the brand account it creates are written together, and
// approving the application approves the account in the same transaction.
//
// ============================================================================

#[derive(Clone)]
pub struct InterestCommandHandler {
    pool: PgPool,
    interests: CommandHandler<InterestAggregate>,
    users: CommandHandler<UserAggregate>,
}

/// The account opened for an applicant; sells nothing until approved
pub fn applicant_account(user_id: Uuid, details: &ApplicantDetails, password_hash: String) -> UserCommand {
    UserCommand::Register {
        user_id,
        name: details.contact_name.trim().to_string(),
        email: details.email.clone(),
        password_hash,
        brand: Some(BrandProfile {
            name: details.brand_name.trim().to_string(),
            description: details.message.clone(),
            ..BrandProfile::default()
        }),
        is_admin: false,
    }
}

impl InterestCommandHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            interests: CommandHandler::new(DocumentStore::new(pool.clone())),
            users: CommandHandler::new(DocumentStore::new(pool.clone())),
            pool,
        }
    }

    pub async fn submit(
        &self,
        details: ApplicantDetails,
        password_hash: String,
        ctx: CommandContext,
    ) -> Result<(UserAggregate, InterestAggregate), AppError> {
        let mut tx = self.pool.begin().await?;

        let user_id = Uuid::now_v7();
        let user = self
            .users
            .create_in(&mut tx, applicant_account(user_id, &details, password_hash), ctx)
            .await?;

        let command = InterestCommand::Submit {
            interest_id: Uuid::now_v7(),
            user_id,
            details,
        };
        let interest = self.interests.create_in(&mut tx, command, ctx).await?;

        tx.commit().await?;

        tracing::info!(
            interest_id = %interest.id,
            user_id = %user_id,
            brand_name = %interest.details.brand_name,
            "Expression of interest submitted"
        );

        Ok((user, interest))
    }

    pub async fn approve(&self, id: Uuid, ctx: CommandContext) -> Result<InterestAggregate, AppError> {
        let mut tx = self.pool.begin().await?;

        let interest = self
            .interests
            .store()
            .load_in(&mut tx, id)
            .await?
            .ok_or(AppError::NotFound("Expression of interest"))?;
        let interest = self
            .interests
            .execute_loaded_in(&mut tx, interest, InterestCommand::Approve, ctx)
            .await?;

        match self.users.store().load_in(&mut tx, interest.user_id).await? {
            Some(user) if !user.is_seller() => {
                self.users
                    .execute_loaded_in(&mut tx, user, UserCommand::ApproveBrand, ctx)
                    .await?;
            }
            Some(_) => {}
            None => {
                tracing::warn!(interest_id = %id, user_id = %interest.user_id, "Applicant account no longer exists");
            }
        }

        tx.commit().await?;
        Ok(interest)
    }

    pub async fn reject(&self, id: Uuid, reason: Option<String>, ctx: CommandContext) -> Result<InterestAggregate, AppError> {
        self.interests.execute(id, InterestCommand::Reject { reason }, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Email;
    use crate::persistence::core::Aggregate;

    #[test]
    fn test_applicant_account_is_unapproved_brand() {
        let details = ApplicantDetails {
            brand_name: " Atelier Nord ".to_string(),
            contact_name: "Ola".to_string(),
            email: Email::parse("ola@atelier.no").unwrap(),
            phone: String::new(),
            website: String::new(),
            instagram_handle: String::new(),
            message: "Wool coats".to_string(),
        };

        let (user, _) = UserAggregate::create(&applicant_account(Uuid::new_v4(), &details, "hash".into())).unwrap();

        assert!(user.is_brand);
        assert!(!user.is_seller());
        assert_eq!(user.brand_name(), "Atelier Nord");
        assert_eq!(user.email.as_str(), "ola@atelier.no");
    }
}
