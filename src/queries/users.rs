use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::{BrandProfile, UserAggregate};
use crate::error::Result;

use super::{fetch_documents, select_documents};

/// A user as returned over HTTP; never carries the password hash
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_brand: bool,
    pub is_brand_approved: bool,
    pub brand: Option<BrandProfile>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserAggregate> for PublicUser {
    fn from(user: &UserAggregate) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.to_string(),
            is_admin: user.is_admin,
            is_brand: user.is_brand,
            is_brand_approved: user.is_brand_approved,
            brand: user.brand.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BrandListing {
    pub id: Uuid,
    pub name: String,
    pub logo: String,
    pub description: String,
}

impl From<&UserAggregate> for BrandListing {
    fn from(user: &UserAggregate) -> Self {
        let profile = user.brand.clone().unwrap_or_default();
        Self {
            id: user.id,
            name: user.brand_name(),
            logo: profile.logo,
            description: profile.description,
        }
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<PublicUser>> {
    let mut qb = select_documents::<UserAggregate>();
    qb.push(" ORDER BY created_at DESC");
    let users: Vec<UserAggregate> = fetch_documents(&mut qb, pool).await?;
    Ok(users.iter().map(PublicUser::from).collect())
}

/// Approved brands, by name
pub async fn brands(pool: &PgPool) -> Result<Vec<BrandListing>> {
    let mut qb = select_documents::<UserAggregate>();
    qb.push(
        " AND (body->>'is_brand')::boolean AND (body->>'is_brand_approved')::boolean
          ORDER BY COALESCE(body->'brand'->>'name', body->>'name')",
    );
    let users: Vec<UserAggregate> = fetch_documents(&mut qb, pool).await?;
    Ok(users.iter().map(BrandListing::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Email;
    use crate::domain::user::UserCommand;
    use crate::persistence::core::Aggregate;

    #[test]
    fn test_public_user_hides_hash() {
        let command = UserCommand::Register {
            user_id: Uuid::new_v4(),
            name: "Jane".to_string(),
            email: Email::parse("jane@example.com").unwrap(),
            password_hash: "$2b$10$secret".to_string(),
            brand: None,
            is_admin: false,
        };
        let (user, _) = UserAggregate::create(&command).unwrap();

        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("jane@example.com"));
    }

    #[test]
    fn test_brand_listing_falls_back_to_user_name() {
        let command = UserCommand::Register {
            user_id: Uuid::new_v4(),
            name: "Studio".to_string(),
            email: Email::parse("studio@example.com").unwrap(),
            password_hash: String::new(),
            brand: Some(BrandProfile {
                name: "Studio Nine".to_string(),
                logo: "/logo.png".to_string(),
                ..BrandProfile::default()
            }),
            is_admin: false,
        };
        let (user, _) = UserAggregate::create(&command).unwrap();

        let listing = BrandListing::from(&user);
        assert_eq!(listing.name, "Studio Nine");
        assert_eq!(listing.logo, "/logo.png");
    }
}
