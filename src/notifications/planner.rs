use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::interest::InterestEvent;
use crate::domain::order::OrderEvent;
use crate::domain::user::{UserAggregate, UserEvent};
use crate::persistence::DocumentStore;
use super::mailer::{Contact, MailError, OutgoingEmail};
use super::templates;
use super::OutboxMessage;

// ============================================================================
// Notification planning: outbox message -> e-mails
// ============================================================================

/// Resolves user ids to mail recipients
#[async_trait]
pub trait Directory: Send + Sync {
    async fn contact(&self, user_id: Uuid) -> Result<Option<Contact>, MailError>;
}

pub struct UserDirectory {
    users: DocumentStore<UserAggregate>,
}

impl UserDirectory {
    pub fn new(users: DocumentStore<UserAggregate>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Directory for UserDirectory {
    async fn contact(&self, user_id: Uuid) -> Result<Option<Contact>, MailError> {
        let user = self
            .users
            .load(user_id)
            .await
            .map_err(|e| MailError::Directory(e.to_string()))?;

        Ok(user.map(|u| Contact::new(u.email.as_str(), u.name)))
    }
}

/// Work out which e-mails a message produces. An empty plan acknowledges
/// the message without sending anything.
pub async fn plan(
    message: &OutboxMessage,
    directory: &dyn Directory,
    admin: &Contact,
) -> Result<Vec<OutgoingEmail>, MailError> {
    match message.event_type.as_str() {
        "OrderPaid" => {
            let OrderEvent::Paid(paid) = serde_json::from_value(message.payload.clone())? else {
                return Ok(vec![]);
            };

            let mut emails = Vec::new();
            match directory.contact(paid.user_id).await? {
                Some(customer) => emails.push(templates::order_receipt(customer, message.aggregate_id, &paid)),
                None => skip_missing(message, paid.user_id),
            }
            for delivery in &paid.brand_deliveries {
                match directory.contact(delivery.brand_id).await? {
                    Some(brand) => emails.push(templates::brand_new_order(
                        brand,
                        message.aggregate_id,
                        delivery.brand_id,
                        &delivery.brand_name,
                        &paid,
                    )),
                    None => skip_missing(message, delivery.brand_id),
                }
            }
            Ok(emails)
        }
        "BrandDispatched" => {
            let OrderEvent::BrandDispatched(dispatched) = serde_json::from_value(message.payload.clone())? else {
                return Ok(vec![]);
            };

            match directory.contact(dispatched.user_id).await? {
                Some(customer) => Ok(vec![templates::brand_dispatched(
                    customer,
                    message.aggregate_id,
                    &dispatched,
                )]),
                None => {
                    skip_missing(message, dispatched.user_id);
                    Ok(vec![])
                }
            }
        }
        "BrandApproved" => {
            let UserEvent::BrandApproved(approved) = serde_json::from_value(message.payload.clone())? else {
                return Ok(vec![]);
            };
            Ok(vec![templates::brand_approved(&approved)])
        }
        "InterestSubmitted" => {
            let InterestEvent::Submitted(submitted) = serde_json::from_value(message.payload.clone())? else {
                return Ok(vec![]);
            };
            Ok(vec![templates::interest_submitted(admin.clone(), &submitted)])
        }
        _ => Ok(vec![]),
    }
}

fn skip_missing(message: &OutboxMessage, user_id: Uuid) {
    tracing::warn!(
        message_id = %message.id,
        event_type = %message.event_type,
        user_id = %user_id,
        "Recipient no longer exists, skipping mail"
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::interest::{ApplicantDetails, InterestSubmitted};
    use crate::domain::order::{
        BrandDelivery, BrandDispatched, DeliveryStatus, OrderItem, OrderPaid, PaymentResult,
    };
    use crate::domain::shared::Email;
    use crate::domain::user::BrandApproved;
    use crate::persistence::core::DomainEvent;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[derive(Default)]
    pub(crate) struct FakeDirectory {
        pub contacts: HashMap<Uuid, Contact>,
    }

    impl FakeDirectory {
        pub fn with(mut self, id: Uuid, email: &str, name: &str) -> Self {
            self.contacts.insert(id, Contact::new(email, name));
            self
        }
    }

    #[async_trait]
    impl Directory for FakeDirectory {
        async fn contact(&self, user_id: Uuid) -> Result<Option<Contact>, MailError> {
            Ok(self.contacts.get(&user_id).cloned())
        }
    }

    pub(crate) fn message<E: DomainEvent>(event: E) -> OutboxMessage {
        OutboxMessage {
            id: Uuid::new_v4(),
            aggregate_id: Uuid::new_v4(),
            aggregate_type: "Test".to_string(),
            event_type: event.event_type().to_string(),
            payload: serde_json::to_value(&event).unwrap(),
            attempts: 0,
        }
    }

    fn delivery(brand_id: Uuid, name: &str) -> BrandDelivery {
        BrandDelivery {
            brand_id,
            brand_name: name.to_string(),
            items_price: dec!(20),
            item_count: 1,
            status: DeliveryStatus::Pending,
            tracking_number: None,
            dispatched_at: None,
            delivered_at: None,
        }
    }

    fn item(brand_id: Uuid) -> OrderItem {
        OrderItem {
            product_id: Uuid::new_v4(),
            name: "Tote".to_string(),
            image: String::new(),
            size: None,
            price: dec!(20),
            qty: 1,
            brand_id,
            brand_name: "Brand".to_string(),
        }
    }

    pub(crate) fn order_paid(customer: Uuid, brands: &[Uuid]) -> OrderEvent {
        OrderEvent::Paid(OrderPaid {
            user_id: customer,
            payment_result: PaymentResult::default(),
            total_price: dec!(46),
            items: brands.iter().map(|b| item(*b)).collect(),
            brand_deliveries: brands.iter().map(|b| delivery(*b, "Brand")).collect(),
            paid_at: Utc::now(),
        })
    }

    fn admin() -> Contact {
        Contact::new("admin@ventevault.com", "Admin")
    }

    #[tokio::test]
    async fn test_order_paid_mails_customer_and_each_brand() {
        let customer = Uuid::new_v4();
        let brand_a = Uuid::new_v4();
        let brand_b = Uuid::new_v4();
        let directory = FakeDirectory::default()
            .with(customer, "jane@example.com", "Jane")
            .with(brand_a, "a@brand.com", "A")
            .with(brand_b, "b@brand.com", "B");

        let emails = plan(&message(order_paid(customer, &[brand_a, brand_b])), &directory, &admin())
            .await
            .unwrap();

        let recipients: Vec<&str> = emails.iter().map(|e| e.to.email.as_str()).collect();
        assert_eq!(recipients, vec!["jane@example.com", "a@brand.com", "b@brand.com"]);
        assert_eq!(emails[0].template, "order_receipt");
        assert_eq!(emails[1].template, "brand_new_order");
    }

    #[tokio::test]
    async fn test_missing_recipient_is_skipped() {
        let customer = Uuid::new_v4();
        let brand = Uuid::new_v4();
        let directory = FakeDirectory::default().with(brand, "a@brand.com", "A");

        let emails = plan(&message(order_paid(customer, &[brand])), &directory, &admin())
            .await
            .unwrap();

        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].to.email, "a@brand.com");
    }

    #[tokio::test]
    async fn test_brand_dispatched_mails_customer() {
        let customer = Uuid::new_v4();
        let directory = FakeDirectory::default().with(customer, "jane@example.com", "Jane");
        let event = OrderEvent::BrandDispatched(BrandDispatched {
            user_id: customer,
            brand_id: Uuid::new_v4(),
            brand_name: "Knits".to_string(),
            tracking_number: None,
            dispatched_at: Utc::now(),
        });

        let emails = plan(&message(event), &directory, &admin()).await.unwrap();
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].template, "brand_dispatched");
    }

    #[tokio::test]
    async fn test_brand_approved_needs_no_lookup() {
        let event = UserEvent::BrandApproved(BrandApproved {
            email: Email::parse("owner@knits.com").unwrap(),
            contact_name: "Olive".to_string(),
            brand_name: "Knits".to_string(),
            approved_at: Utc::now(),
        });

        let emails = plan(&message(event), &FakeDirectory::default(), &admin()).await.unwrap();
        assert_eq!(emails[0].to.email, "owner@knits.com");
    }

    #[tokio::test]
    async fn test_interest_submitted_goes_to_admin() {
        let event = InterestEvent::Submitted(InterestSubmitted {
            interest_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            details: ApplicantDetails {
                brand_name: "Knits".to_string(),
                contact_name: "Olive".to_string(),
                email: Email::parse("owner@knits.com").unwrap(),
                phone: String::new(),
                website: String::new(),
                instagram_handle: String::new(),
                message: String::new(),
            },
            submitted_at: Utc::now(),
        });

        let emails = plan(&message(event), &FakeDirectory::default(), &admin()).await.unwrap();
        assert_eq!(emails[0].to, admin());
    }

    #[tokio::test]
    async fn test_other_events_are_acknowledged_without_mail() {
        let mut msg = message(order_paid(Uuid::new_v4(), &[]));
        msg.event_type = "OrderPlaced".to_string();
        msg.payload = serde_json::json!({ "type": "Placed", "data": {} });

        let emails = plan(&msg, &FakeDirectory::default(), &admin()).await.unwrap();
        assert!(emails.is_empty());
    }

    #[tokio::test]
    async fn test_garbled_payload_is_a_payload_error() {
        let mut msg = message(order_paid(Uuid::new_v4(), &[]));
        msg.payload = serde_json::json!({ "type": "Paid", "data": { "nope": true } });

        let result = plan(&msg, &FakeDirectory::default(), &admin()).await;
        assert!(matches!(result, Err(MailError::Payload(_))));
    }
}
