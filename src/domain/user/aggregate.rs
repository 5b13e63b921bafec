use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::Email;
use crate::persistence::core::Aggregate;
use crate::persistence::store::Document;
use super::commands::UserCommand;
use super::errors::UserError;
use super::events::*;
use super::value_objects::{BrandProfile, MIN_PASSWORD_LEN};

// ============================================================================
// User Aggregate - shoppers, brands and admins
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAggregate {
    pub id: Uuid,
    #[serde(default)]
    pub version: i64,

    pub name: String,
    pub email: Email,
    pub password_hash: String,

    pub is_admin: bool,
    pub is_brand: bool,
    pub is_brand_approved: bool,
    pub brand: Option<BrandProfile>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Checked on the plain-text password before it is hashed
pub fn validate_password(password: &str) -> Result<(), UserError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UserError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), UserError> {
    if name.trim().is_empty() {
        return Err(UserError::EmptyName);
    }
    Ok(())
}

fn validate_brand(brand: &BrandProfile) -> Result<(), UserError> {
    if brand.name.trim().is_empty() {
        return Err(UserError::EmptyBrandName);
    }
    if let Some(rate) = brand.commission_rate {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(UserError::InvalidCommissionRate);
        }
    }
    Ok(())
}

impl UserAggregate {
    /// A brand may sell only once an admin approved it
    pub fn is_seller(&self) -> bool {
        self.is_brand && self.is_brand_approved
    }

    /// Display name used on products and deliveries
    pub fn brand_name(&self) -> String {
        self.brand
            .as_ref()
            .map(|b| b.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn commission_override(&self) -> Option<Decimal> {
        self.brand.as_ref().and_then(|b| b.commission_rate)
    }

    pub fn ensure_deletable(&self) -> Result<(), UserError> {
        if self.is_admin {
            return Err(UserError::CannotDeleteAdmin);
        }
        Ok(())
    }
}

impl Aggregate for UserAggregate {
    type Event = UserEvent;
    type Command = UserCommand;
    type Error = UserError;

    fn handle_create(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            UserCommand::Register { user_id, name, email, password_hash, brand, is_admin } => {
                validate_name(name)?;
                if let Some(brand) = brand {
                    validate_brand(brand)?;
                }

                Ok(UserEvent::Registered(UserRegistered {
                    user_id: *user_id,
                    name: name.trim().to_string(),
                    email: email.clone(),
                    password_hash: password_hash.clone(),
                    is_admin: *is_admin,
                    is_brand: brand.is_some(),
                    brand: brand.clone(),
                    registered_at: Utc::now(),
                }))
            }
            _ => Err(UserError::NotInitialized),
        }
    }

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            UserEvent::Registered(e) => Ok(Self {
                id: e.user_id,
                version: 0,
                name: e.name.clone(),
                email: e.email.clone(),
                password_hash: e.password_hash.clone(),
                is_admin: e.is_admin,
                is_brand: e.is_brand,
                is_brand_approved: false,
                brand: e.brand.clone(),
                created_at: e.registered_at,
                updated_at: e.registered_at,
            }),
            _ => Err(UserError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        self.updated_at = Utc::now();

        match event {
            UserEvent::Registered(_) => {}
            UserEvent::ProfileUpdated(e) => {
                if let Some(name) = &e.name {
                    self.name = name.clone();
                }
                if let Some(email) = &e.email {
                    self.email = email.clone();
                }
                if let Some(brand) = &e.brand {
                    self.brand = Some(brand.clone());
                }
            }
            UserEvent::PasswordChanged(e) => {
                self.password_hash = e.password_hash.clone();
            }
            UserEvent::RolesUpdated(e) => {
                self.is_admin = e.is_admin;
                self.is_brand = e.is_brand;
                if !e.is_brand {
                    self.is_brand_approved = false;
                }
            }
            UserEvent::CommissionSet(e) => {
                let fallback = self.name.clone();
                let brand = self.brand.get_or_insert_with(|| BrandProfile {
                    name: fallback,
                    ..BrandProfile::default()
                });
                brand.commission_rate = e.commission_rate;
            }
            UserEvent::BrandApproved(_) => {
                self.is_brand_approved = true;
            }
            UserEvent::BrandRevoked(_) => {
                self.is_brand_approved = false;
            }
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            UserCommand::Register { .. } => Err(UserError::NotInitialized),

            UserCommand::UpdateProfile { name, email, password_hash, brand } => {
                let mut events = Vec::new();

                if let Some(name) = name {
                    validate_name(name)?;
                }
                // Only an admin sets the commission override
                let brand = brand.clone().map(|mut b| {
                    b.commission_rate = self.commission_override();
                    b
                });
                if let Some(brand) = &brand {
                    if !self.is_brand {
                        return Err(UserError::NotABrand);
                    }
                    validate_brand(brand)?;
                }

                let name = name.as_ref().map(|n| n.trim().to_string()).filter(|n| *n != self.name);
                let email = email.clone().filter(|e| *e != self.email);
                let brand = brand.filter(|b| Some(b) != self.brand.as_ref());

                if name.is_some() || email.is_some() || brand.is_some() {
                    events.push(UserEvent::ProfileUpdated(UserProfileUpdated { name, email, brand }));
                }

                if let Some(hash) = password_hash {
                    events.push(UserEvent::PasswordChanged(UserPasswordChanged {
                        password_hash: hash.clone(),
                    }));
                }

                Ok(events)
            }

            UserCommand::AdminUpdate { name, email, is_admin, is_brand, commission_rate } => {
                let mut events = Vec::new();

                if let Some(name) = name {
                    validate_name(name)?;
                }

                let name = name.as_ref().map(|n| n.trim().to_string()).filter(|n| *n != self.name);
                let email = email.clone().filter(|e| *e != self.email);
                if name.is_some() || email.is_some() {
                    events.push(UserEvent::ProfileUpdated(UserProfileUpdated { name, email, brand: None }));
                }

                let new_admin = is_admin.unwrap_or(self.is_admin);
                let new_brand = is_brand.unwrap_or(self.is_brand);
                if new_admin != self.is_admin || new_brand != self.is_brand {
                    events.push(UserEvent::RolesUpdated(UserRolesUpdated {
                        is_admin: new_admin,
                        is_brand: new_brand,
                    }));
                }

                if let Some(rate) = commission_rate {
                    if !new_brand {
                        return Err(UserError::NotABrand);
                    }
                    if let Some(r) = rate {
                        if *r < Decimal::ZERO || *r > Decimal::ONE {
                            return Err(UserError::InvalidCommissionRate);
                        }
                    }
                    if *rate != self.commission_override() {
                        events.push(UserEvent::CommissionSet(BrandCommissionSet {
                            commission_rate: *rate,
                        }));
                    }
                }

                Ok(events)
            }

            UserCommand::ApproveBrand => {
                if !self.is_brand {
                    return Err(UserError::NotABrand);
                }
                if self.is_brand_approved {
                    return Err(UserError::AlreadyApproved);
                }

                Ok(vec![UserEvent::BrandApproved(BrandApproved {
                    email: self.email.clone(),
                    contact_name: self.name.clone(),
                    brand_name: self.brand_name(),
                    approved_at: Utc::now(),
                })])
            }

            UserCommand::RevokeBrand => {
                if !self.is_brand_approved {
                    return Err(UserError::NotApproved);
                }

                Ok(vec![UserEvent::BrandRevoked(BrandRevoked { revoked_at: Utc::now() })])
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

impl Document for UserAggregate {
    const COLLECTION: &'static str = "users";
    const AGGREGATE_TYPE: &'static str = "User";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::core::DomainEvent;
    use rust_decimal_macros::dec;

    fn register(brand: Option<BrandProfile>) -> UserCommand {
        UserCommand::Register {
            user_id: Uuid::new_v4(),
            name: "Jane Doe".to_string(),
            email: Email::parse("jane@example.com").unwrap(),
            password_hash: "hash".to_string(),
            brand,
            is_admin: false,
        }
    }

    fn brand_profile() -> BrandProfile {
        BrandProfile {
            name: "Maison Jane".to_string(),
            logo: String::new(),
            description: "Slow fashion".to_string(),
            commission_rate: None,
        }
    }

    #[test]
    fn test_register_shopper() {
        let (user, event) = UserAggregate::create(&register(None)).unwrap();

        assert_eq!(user.name, "Jane Doe");
        assert!(!user.is_brand);
        assert!(!user.is_seller());
        assert_eq!(event.event_type(), "UserRegistered");
    }

    #[test]
    fn test_register_brand_is_not_yet_a_seller() {
        let (user, _) = UserAggregate::create(&register(Some(brand_profile()))).unwrap();

        assert!(user.is_brand);
        assert!(!user.is_brand_approved);
        assert!(!user.is_seller());
        assert_eq!(user.brand_name(), "Maison Jane");
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let command = UserCommand::Register {
            user_id: Uuid::new_v4(),
            name: "  ".to_string(),
            email: Email::parse("jane@example.com").unwrap(),
            password_hash: "hash".to_string(),
            brand: None,
            is_admin: false,
        };

        assert!(matches!(UserAggregate::create(&command), Err(UserError::EmptyName)));
    }

    #[test]
    fn test_register_rejects_bad_commission() {
        let mut brand = brand_profile();
        brand.commission_rate = Some(dec!(1.2));

        let result = UserAggregate::create(&register(Some(brand)));
        assert!(matches!(result, Err(UserError::InvalidCommissionRate)));
    }

    #[test]
    fn test_approve_brand() {
        let (mut user, _) = UserAggregate::create(&register(Some(brand_profile()))).unwrap();

        let events = user.execute(&UserCommand::ApproveBrand).unwrap();
        assert_eq!(events.len(), 1);
        assert!(user.is_seller());

        match &events[0] {
            UserEvent::BrandApproved(e) => {
                assert_eq!(e.brand_name, "Maison Jane");
                assert_eq!(e.email.as_str(), "jane@example.com");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_approve_twice_fails() {
        let (mut user, _) = UserAggregate::create(&register(Some(brand_profile()))).unwrap();
        user.execute(&UserCommand::ApproveBrand).unwrap();

        let result = user.handle_command(&UserCommand::ApproveBrand);
        assert!(matches!(result, Err(UserError::AlreadyApproved)));
    }

    #[test]
    fn test_approve_non_brand_fails() {
        let (user, _) = UserAggregate::create(&register(None)).unwrap();
        let result = user.handle_command(&UserCommand::ApproveBrand);
        assert!(matches!(result, Err(UserError::NotABrand)));
    }

    #[test]
    fn test_revoke_brand() {
        let (mut user, _) = UserAggregate::create(&register(Some(brand_profile()))).unwrap();
        assert!(matches!(
            user.handle_command(&UserCommand::RevokeBrand),
            Err(UserError::NotApproved)
        ));

        user.execute(&UserCommand::ApproveBrand).unwrap();
        user.execute(&UserCommand::RevokeBrand).unwrap();
        assert!(!user.is_seller());
        assert!(user.is_brand);
    }

    #[test]
    fn test_update_profile_without_changes_emits_nothing() {
        let (user, _) = UserAggregate::create(&register(None)).unwrap();

        let events = user
            .handle_command(&UserCommand::UpdateProfile {
                name: Some("Jane Doe".to_string()),
                email: Some(user.email.clone()),
                password_hash: None,
                brand: None,
            })
            .unwrap();

        assert!(events.is_empty());
    }

    #[test]
    fn test_update_profile_and_password() {
        let (mut user, _) = UserAggregate::create(&register(None)).unwrap();

        let events = user
            .execute(&UserCommand::UpdateProfile {
                name: Some("Jane Smith".to_string()),
                email: None,
                password_hash: Some("new-hash".to_string()),
                brand: None,
            })
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(user.name, "Jane Smith");
        assert_eq!(user.password_hash, "new-hash");
    }

    #[test]
    fn test_shopper_cannot_set_brand_profile() {
        let (user, _) = UserAggregate::create(&register(None)).unwrap();

        let result = user.handle_command(&UserCommand::UpdateProfile {
            name: None,
            email: None,
            password_hash: None,
            brand: Some(brand_profile()),
        });

        assert!(matches!(result, Err(UserError::NotABrand)));
    }

    #[test]
    fn test_admin_removing_brand_role_clears_approval() {
        let (mut user, _) = UserAggregate::create(&register(Some(brand_profile()))).unwrap();
        user.execute(&UserCommand::ApproveBrand).unwrap();

        user.execute(&UserCommand::AdminUpdate {
            name: None,
            email: None,
            is_admin: None,
            is_brand: Some(false),
            commission_rate: None,
        })
        .unwrap();

        assert!(!user.is_brand);
        assert!(!user.is_brand_approved);
    }

    #[test]
    fn test_profile_update_keeps_commission_override() {
        let (mut user, _) = UserAggregate::create(&register(Some(brand_profile()))).unwrap();
        user.execute(&UserCommand::ApproveBrand).unwrap();
        user.execute(&UserCommand::AdminUpdate {
            name: None,
            email: None,
            is_admin: None,
            is_brand: None,
            commission_rate: Some(Some(dec!(0.25))),
        })
        .unwrap();

        let mut brand = brand_profile();
        brand.description = "Zero waste".to_string();
        brand.commission_rate = Some(dec!(0));
        user.execute(&UserCommand::UpdateProfile {
            name: None,
            email: None,
            password_hash: None,
            brand: Some(brand),
        })
        .unwrap();

        assert_eq!(user.commission_override(), Some(dec!(0.25)));
        assert_eq!(user.brand.as_ref().unwrap().description, "Zero waste");
    }

    #[test]
    fn test_brand_cannot_grant_itself_an_override() {
        let (user, _) = UserAggregate::create(&register(Some(brand_profile()))).unwrap();

        let mut brand = brand_profile();
        brand.commission_rate = Some(dec!(0));
        let events = user
            .handle_command(&UserCommand::UpdateProfile {
                name: None,
                email: None,
                password_hash: None,
                brand: Some(brand),
            })
            .unwrap();

        assert!(events.is_empty());
    }

    #[test]
    fn test_admin_sets_and_clears_commission() {
        let (mut user, _) = UserAggregate::create(&register(Some(brand_profile()))).unwrap();

        let set = |rate| UserCommand::AdminUpdate {
            name: None,
            email: None,
            is_admin: None,
            is_brand: None,
            commission_rate: Some(rate),
        };

        let events = user.execute(&set(Some(dec!(0.1)))).unwrap();
        assert_eq!(events[0].event_type(), "BrandCommissionSet");
        assert_eq!(user.commission_override(), Some(dec!(0.1)));

        assert!(matches!(
            user.handle_command(&set(Some(dec!(1.5)))),
            Err(UserError::InvalidCommissionRate)
        ));

        user.execute(&set(None)).unwrap();
        assert_eq!(user.commission_override(), None);
    }

    #[test]
    fn test_commission_on_shopper_is_rejected() {
        let (user, _) = UserAggregate::create(&register(None)).unwrap();
        let result = user.handle_command(&UserCommand::AdminUpdate {
            name: None,
            email: None,
            is_admin: None,
            is_brand: None,
            commission_rate: Some(Some(dec!(0.1))),
        });
        assert!(matches!(result, Err(UserError::NotABrand)));
    }

    #[test]
    fn test_admin_cannot_be_deleted() {
        let command = UserCommand::Register {
            user_id: Uuid::new_v4(),
            name: "Admin".to_string(),
            email: Email::parse("admin@example.com").unwrap(),
            password_hash: "hash".to_string(),
            brand: None,
            is_admin: true,
        };
        let (admin, _) = UserAggregate::create(&command).unwrap();

        assert!(matches!(admin.ensure_deletable(), Err(UserError::CannotDeleteAdmin)));
    }

    #[test]
    fn test_password_hash_not_in_event_payload() {
        let (_, event) = UserAggregate::create(&register(None)).unwrap();
        let json = serde_json::to_string(&event).unwrap();

        assert!(!json.contains("password_hash"));
        assert!(json.contains("jane@example.com"));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_document_roundtrip_keeps_hash() {
        let (user, _) = UserAggregate::create(&register(None)).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["password_hash"], "hash");
    }
}
