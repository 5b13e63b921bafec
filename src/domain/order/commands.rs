use uuid::Uuid;

use crate::config::PricingConfig;
use super::value_objects::*;

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    /// Items must already be priced from the catalog
    Place {
        order_id: Uuid,
        user_id: Uuid,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        discount: Option<DiscountOffer>,
        pricing: PricingConfig,
    },
    Pay {
        payment_result: PaymentResult,
    },
    DispatchBrand {
        brand_id: Uuid,
        tracking_number: Option<String>,
    },
    DeliverBrand {
        brand_id: Uuid,
    },
    /// Admin override marking every brand delivery delivered
    DeliverAll,
}
