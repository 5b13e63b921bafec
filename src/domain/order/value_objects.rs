use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::round2;

// ============================================================================
// Order Value Objects
// ============================================================================

/// A cart line as submitted by the storefront; carries no price
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub qty: i32,
    #[serde(default)]
    pub size: Option<String>,
}

/// A priced order line; prices come from the catalog at placement time
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub image: String,
    pub size: Option<String>,
    pub price: Decimal,
    pub qty: i32,
    pub brand_id: Uuid,
    pub brand_name: String,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ShippingAddress {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl ShippingAddress {
    pub fn is_complete(&self) -> bool {
        [&self.full_name, &self.address, &self.city, &self.postal_code, &self.country]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    PayPal,
    Stripe,
}

/// What the payment provider reported back to the storefront
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub update_time: String,
    #[serde(default)]
    pub email_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    Dispatched,
    Delivered,
}

/// Fulfilment state of one brand's share of an order
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BrandDelivery {
    pub brand_id: Uuid,
    pub brand_name: String,
    pub items_price: Decimal,
    pub item_count: i32,
    pub status: DeliveryStatus,
    pub tracking_number: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AppliedDiscount {
    pub discount_id: Uuid,
    pub code: String,
    /// Amount actually deducted, capped at the items price
    pub amount: Decimal,
}

/// A redeemable code offered at checkout, before capping
#[derive(Clone, Debug, PartialEq)]
pub struct DiscountOffer {
    pub discount_id: Uuid,
    pub code: String,
    pub value: Decimal,
}

/// Group items into one pending delivery per brand, in the order brands first appear
pub fn split_by_brand(items: &[OrderItem]) -> Vec<BrandDelivery> {
    let mut deliveries: Vec<BrandDelivery> = Vec::new();

    for item in items {
        match deliveries.iter_mut().find(|d| d.brand_id == item.brand_id) {
            Some(delivery) => {
                delivery.items_price += item.line_total();
                delivery.item_count += item.qty;
            }
            None => deliveries.push(BrandDelivery {
                brand_id: item.brand_id,
                brand_name: item.brand_name.clone(),
                items_price: item.line_total(),
                item_count: item.qty,
                status: DeliveryStatus::Pending,
                tracking_number: None,
                dispatched_at: None,
                delivered_at: None,
            }),
        }
    }

    for delivery in &mut deliveries {
        delivery.items_price = round2(delivery.items_price);
    }
    deliveries
}
