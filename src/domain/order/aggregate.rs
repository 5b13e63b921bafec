use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::Aggregate;
use crate::persistence::store::Document;
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::events::*;
use super::pricing::PriceBreakdown;
use super::value_objects::*;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAggregate {
    // Identity
    pub id: Uuid,
    #[serde(default)]
    pub version: i64,
    pub user_id: Uuid,

    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_result: Option<PaymentResult>,

    // Prices, fixed at placement
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub discount: Option<AppliedDiscount>,
    pub total_price: Decimal,

    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    /// Set once every brand delivery is delivered
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub brand_deliveries: Vec<BrandDelivery>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderAggregate {
    fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for item in items {
            if item.qty <= 0 {
                return Err(OrderError::InvalidQuantity(item.qty));
            }
        }

        Ok(())
    }

    fn ensure_paid(&self) -> Result<(), OrderError> {
        if !self.is_paid {
            return Err(OrderError::NotPaid);
        }
        Ok(())
    }

    fn delivery(&self, brand_id: Uuid) -> Result<&BrandDelivery, OrderError> {
        self.brand_deliveries
            .iter()
            .find(|d| d.brand_id == brand_id)
            .ok_or(OrderError::UnknownBrand(brand_id))
    }

    fn delivery_mut(&mut self, brand_id: Uuid) -> Result<&mut BrandDelivery, OrderError> {
        self.brand_deliveries
            .iter_mut()
            .find(|d| d.brand_id == brand_id)
            .ok_or(OrderError::UnknownBrand(brand_id))
    }

    pub fn contains_brand(&self, brand_id: Uuid) -> bool {
        self.brand_deliveries.iter().any(|d| d.brand_id == brand_id)
    }

    /// The order as a brand is allowed to see it: only its own lines and delivery
    pub fn view_for_brand(&self, brand_id: Uuid) -> Self {
        let mut view = self.clone();
        view.order_items.retain(|item| item.brand_id == brand_id);
        view.brand_deliveries.retain(|d| d.brand_id == brand_id);
        view
    }

    /// Quantity per product, merging lines that differ only by size
    pub fn quantities_by_product(&self) -> Vec<(Uuid, i32)> {
        let mut quantities: Vec<(Uuid, i32)> = Vec::new();
        for item in &self.order_items {
            match quantities.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, qty)) => *qty += item.qty,
                None => quantities.push((item.product_id, item.qty)),
            }
        }
        quantities
    }

    pub fn ensure_deletable(&self) -> Result<(), OrderError> {
        if self.is_paid {
            return Err(OrderError::CannotDeletePaid);
        }
        Ok(())
    }

    /// Emit `Delivered` after `pending` brand deliveries land, if that completes the order
    fn completes_with(&self, pending: &[Uuid]) -> bool {
        !self.is_delivered
            && self
                .brand_deliveries
                .iter()
                .all(|d| d.status == DeliveryStatus::Delivered || pending.contains(&d.brand_id))
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn handle_create(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            OrderCommand::Place {
                order_id,
                user_id,
                items,
                shipping_address,
                payment_method,
                discount,
                pricing,
            } => {
                Self::validate_items(items)?;
                if !shipping_address.is_complete() {
                    return Err(OrderError::IncompleteAddress);
                }

                let prices = PriceBreakdown::compute(items, discount.as_ref().map(|d| d.value), pricing);
                let discount = discount.as_ref().map(|d| AppliedDiscount {
                    discount_id: d.discount_id,
                    code: d.code.clone(),
                    amount: prices.discount,
                });

                Ok(OrderEvent::Placed(OrderPlaced {
                    order_id: *order_id,
                    user_id: *user_id,
                    items: items.clone(),
                    shipping_address: shipping_address.clone(),
                    payment_method: *payment_method,
                    brand_deliveries: split_by_brand(items),
                    prices,
                    discount,
                    placed_at: Utc::now(),
                }))
            }
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Placed(e) => Ok(Self {
                id: e.order_id,
                version: 0,
                user_id: e.user_id,
                order_items: e.items.clone(),
                shipping_address: e.shipping_address.clone(),
                payment_method: e.payment_method,
                payment_result: None,
                items_price: e.prices.items_price,
                shipping_price: e.prices.shipping_price,
                tax_price: e.prices.tax_price,
                discount: e.discount.clone(),
                total_price: e.prices.total_price,
                is_paid: false,
                paid_at: None,
                is_delivered: false,
                delivered_at: None,
                brand_deliveries: e.brand_deliveries.clone(),
                created_at: e.placed_at,
                updated_at: e.placed_at,
            }),
            _ => Err(OrderError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        self.updated_at = Utc::now();

        match event {
            OrderEvent::Placed(_) => {}
            OrderEvent::Paid(e) => {
                self.is_paid = true;
                self.paid_at = Some(e.paid_at);
                self.payment_result = Some(e.payment_result.clone());
            }
            OrderEvent::BrandDispatched(e) => {
                let delivery = self.delivery_mut(e.brand_id)?;
                delivery.status = DeliveryStatus::Dispatched;
                delivery.tracking_number = e.tracking_number.clone();
                delivery.dispatched_at = Some(e.dispatched_at);
            }
            OrderEvent::BrandDelivered(e) => {
                let delivery = self.delivery_mut(e.brand_id)?;
                delivery.status = DeliveryStatus::Delivered;
                delivery.delivered_at = Some(e.delivered_at);
            }
            OrderEvent::Delivered(e) => {
                self.is_delivered = true;
                self.delivered_at = Some(e.delivered_at);
            }
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::Place { .. } => Err(OrderError::NotInitialized),

            OrderCommand::Pay { payment_result } => {
                if self.is_paid {
                    return Err(OrderError::AlreadyPaid);
                }

                Ok(vec![OrderEvent::Paid(OrderPaid {
                    user_id: self.user_id,
                    payment_result: payment_result.clone(),
                    total_price: self.total_price,
                    items: self.order_items.clone(),
                    brand_deliveries: self.brand_deliveries.clone(),
                    paid_at: Utc::now(),
                })])
            }

            OrderCommand::DispatchBrand { brand_id, tracking_number } => {
                self.ensure_paid()?;
                let delivery = self.delivery(*brand_id)?;
                if delivery.status != DeliveryStatus::Pending {
                    return Err(OrderError::NotPending(delivery.status));
                }

                Ok(vec![OrderEvent::BrandDispatched(BrandDispatched {
                    user_id: self.user_id,
                    brand_id: *brand_id,
                    brand_name: delivery.brand_name.clone(),
                    tracking_number: tracking_number.clone().filter(|t| !t.trim().is_empty()),
                    dispatched_at: Utc::now(),
                })])
            }

            OrderCommand::DeliverBrand { brand_id } => {
                self.ensure_paid()?;
                if self.delivery(*brand_id)?.status == DeliveryStatus::Delivered {
                    return Err(OrderError::AlreadyDelivered);
                }

                let now = Utc::now();
                let mut events = vec![OrderEvent::BrandDelivered(BrandDelivered {
                    brand_id: *brand_id,
                    delivered_at: now,
                })];
                if self.completes_with(&[*brand_id]) {
                    events.push(OrderEvent::Delivered(OrderDelivered { delivered_at: now }));
                }
                Ok(events)
            }

            OrderCommand::DeliverAll => {
                self.ensure_paid()?;
                if self.is_delivered {
                    return Err(OrderError::AlreadyDelivered);
                }

                let now = Utc::now();
                let mut events: Vec<OrderEvent> = self
                    .brand_deliveries
                    .iter()
                    .filter(|d| d.status != DeliveryStatus::Delivered)
                    .map(|d| {
                        OrderEvent::BrandDelivered(BrandDelivered {
                            brand_id: d.brand_id,
                            delivered_at: now,
                        })
                    })
                    .collect();
                events.push(OrderEvent::Delivered(OrderDelivered { delivered_at: now }));
                Ok(events)
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

impl Document for OrderAggregate {
    const COLLECTION: &'static str = "orders";
    const AGGREGATE_TYPE: &'static str = "Order";
}

// ============================================================================
// Unit Tests
// ============================================================================
