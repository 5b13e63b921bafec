use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::domain::shared::round2;
use super::value_objects::OrderItem;

// ============================================================================
// Checkout Pricing
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PriceBreakdown {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub discount: Decimal,
    pub total_price: Decimal,
}

impl PriceBreakdown {
    /// Price a cart. `discount_value` is the flat value of an applied code;
    /// it never exceeds the items price.
    pub fn compute(items: &[OrderItem], discount_value: Option<Decimal>, pricing: &PricingConfig) -> Self {
        let items_price = round2(items.iter().map(OrderItem::line_total).sum());

        let shipping_price = if items_price > pricing.free_shipping_threshold {
            Decimal::ZERO
        } else {
            pricing.flat_shipping_fee
        };

        let tax_price = round2(items_price * pricing.tax_rate);

        let discount = discount_value
            .map(|value| value.max(Decimal::ZERO).min(items_price))
            .unwrap_or(Decimal::ZERO);

        let total_price = round2(items_price + shipping_price + tax_price - discount);

        Self {
            items_price,
            shipping_price,
            tax_price,
            discount,
            total_price,
        }
    }
}
