use uuid::Uuid;

use super::value_objects::ProductDetails;

#[derive(Debug, Clone)]
pub enum ProductCommand {
    Create {
        product_id: Uuid,
        brand_id: Uuid,
        brand_name: String,
        details: ProductDetails,
    },
    Update {
        details: ProductDetails,
    },
    AddReview {
        user_id: Uuid,
        name: String,
        rating: u8,
        comment: String,
    },
    /// Issued when an order containing the product is paid
    DecrementStock {
        qty: i32,
    },
}
