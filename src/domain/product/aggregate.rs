use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persistence::core::Aggregate;
use crate::persistence::store::Document;
use super::commands::ProductCommand;
use super::errors::ProductError;
use super::events::*;
use super::value_objects::*;

// ============================================================================
// Product Aggregate - a catalog entry owned by one brand
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAggregate {
    pub id: Uuid,
    #[serde(default)]
    pub version: i64,
    pub brand_id: Uuid,
    pub brand_name: String,
    #[serde(flatten)]
    pub details: ProductDetails,
    pub rating: f64,
    pub num_reviews: i32,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_details(details: &ProductDetails) -> Result<(), ProductError> {
    if details.name.trim().is_empty() {
        return Err(ProductError::EmptyName);
    }
    if details.price <= Decimal::ZERO {
        return Err(ProductError::InvalidPrice);
    }
    if details.count_in_stock < 0 {
        return Err(ProductError::NegativeStock);
    }
    Ok(())
}

impl ProductAggregate {
    pub fn is_owned_by(&self, brand_id: Uuid) -> bool {
        self.brand_id == brand_id
    }

    /// Fails when fewer than `qty` units are available
    pub fn ensure_in_stock(&self, qty: i32) -> Result<(), ProductError> {
        if qty <= 0 {
            return Err(ProductError::InvalidQuantity(qty));
        }
        if qty > self.details.count_in_stock {
            return Err(ProductError::InsufficientStock {
                name: self.details.name.clone(),
                available: self.details.count_in_stock,
            });
        }
        Ok(())
    }

    pub fn first_image(&self) -> String {
        self.details.images.first().cloned().unwrap_or_default()
    }

    fn recompute_rating(&mut self) {
        self.num_reviews = self.reviews.len() as i32;
        self.rating = if self.reviews.is_empty() {
            0.0
        } else {
            let sum: u32 = self.reviews.iter().map(|r| r.rating as u32).sum();
            sum as f64 / self.reviews.len() as f64
        };
    }
}

impl Aggregate for ProductAggregate {
    type Event = ProductEvent;
    type Command = ProductCommand;
    type Error = ProductError;

    fn handle_create(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            ProductCommand::Create { product_id, brand_id, brand_name, details } => {
                validate_details(details)?;

                Ok(ProductEvent::Created(ProductCreated {
                    product_id: *product_id,
                    brand_id: *brand_id,
                    brand_name: brand_name.clone(),
                    details: details.clone(),
                    created_at: Utc::now(),
                }))
            }
            _ => Err(ProductError::NotInitialized),
        }
    }

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            ProductEvent::Created(e) => Ok(Self {
                id: e.product_id,
                version: 0,
                brand_id: e.brand_id,
                brand_name: e.brand_name.clone(),
                details: e.details.clone(),
                rating: 0.0,
                num_reviews: 0,
                reviews: Vec::new(),
                created_at: e.created_at,
                updated_at: e.created_at,
            }),
            _ => Err(ProductError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        self.updated_at = Utc::now();

        match event {
            ProductEvent::Created(_) => {}
            ProductEvent::Updated(e) => {
                self.details = e.details.clone();
            }
            ProductEvent::ReviewAdded(e) => {
                self.reviews.push(e.review.clone());
                self.recompute_rating();
            }
            ProductEvent::StockDecremented(e) => {
                self.details.count_in_stock = e.remaining;
            }
        }
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::Create { .. } => Err(ProductError::NotInitialized),

            ProductCommand::Update { details } => {
                validate_details(details)?;
                if *details == self.details {
                    return Ok(vec![]);
                }
                Ok(vec![ProductEvent::Updated(ProductUpdated { details: details.clone() })])
            }

            ProductCommand::AddReview { user_id, name, rating, comment } => {
                if !(MIN_RATING..=MAX_RATING).contains(rating) {
                    return Err(ProductError::InvalidRating(*rating));
                }
                if self.reviews.iter().any(|r| r.user_id == *user_id) {
                    return Err(ProductError::AlreadyReviewed);
                }

                Ok(vec![ProductEvent::ReviewAdded(ReviewAdded {
                    review: Review {
                        user_id: *user_id,
                        name: name.clone(),
                        rating: *rating,
                        comment: comment.trim().to_string(),
                        created_at: Utc::now(),
                    },
                })])
            }

            ProductCommand::DecrementStock { qty } => {
                if *qty <= 0 {
                    return Err(ProductError::InvalidQuantity(*qty));
                }
                Ok(vec![ProductEvent::StockDecremented(StockDecremented {
                    qty: *qty,
                    remaining: (self.details.count_in_stock - qty).max(0),
                })])
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

impl Document for ProductAggregate {
    const COLLECTION: &'static str = "products";
    const AGGREGATE_TYPE: &'static str = "Product";
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_test_details() -> ProductDetails {
        ProductDetails {
            name: "Linen Shirt".to_string(),
            category: "Shirts".to_string(),
            description: "Breathable summer shirt".to_string(),
            images: vec!["/images/linen.jpg".to_string()],
            sizes: vec!["S".to_string(), "M".to_string()],
            price: dec!(49.90),
            count_in_stock: 3,
        }
    }

    fn create_test_product() -> ProductAggregate {
        let command = ProductCommand::Create {
            product_id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            brand_name: "Linnen Co".to_string(),
            details: create_test_details(),
        };
        ProductAggregate::create(&command).unwrap().0
    }

    fn review(user_id: Uuid, rating: u8) -> ProductCommand {
        ProductCommand::AddReview {
            user_id,
            name: "Reviewer".to_string(),
            rating,
            comment: "Nice".to_string(),
        }
    }

    #[test]
    fn test_create_product() {
        let product = create_test_product();
        assert_eq!(product.details.name, "Linen Shirt");
        assert_eq!(product.num_reviews, 0);
        assert_eq!(product.first_image(), "/images/linen.jpg");
    }

    #[test]
    fn test_create_rejects_zero_price() {
        let mut details = create_test_details();
        details.price = Decimal::ZERO;

        let command = ProductCommand::Create {
            product_id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            brand_name: "Linnen Co".to_string(),
            details,
        };
        assert!(matches!(ProductAggregate::create(&command), Err(ProductError::InvalidPrice)));
    }

    #[test]
    fn test_update_rejects_negative_stock() {
        let product = create_test_product();
        let mut details = create_test_details();
        details.count_in_stock = -1;

        let result = product.handle_command(&ProductCommand::Update { details });
        assert!(matches!(result, Err(ProductError::NegativeStock)));
    }

    #[test]
    fn test_rating_is_mean_of_reviews() {
        let mut product = create_test_product();
        product.execute(&review(Uuid::new_v4(), 5)).unwrap();
        product.execute(&review(Uuid::new_v4(), 4)).unwrap();

        assert_eq!(product.num_reviews, 2);
        assert!((product.rating - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_one_review_per_user() {
        let mut product = create_test_product();
        let user = Uuid::new_v4();
        product.execute(&review(user, 5)).unwrap();

        let result = product.handle_command(&review(user, 1));
        assert!(matches!(result, Err(ProductError::AlreadyReviewed)));
    }

    #[test]
    fn test_rating_out_of_range() {
        let product = create_test_product();
        assert!(matches!(
            product.handle_command(&review(Uuid::new_v4(), 0)),
            Err(ProductError::InvalidRating(0))
        ));
        assert!(matches!(
            product.handle_command(&review(Uuid::new_v4(), 6)),
            Err(ProductError::InvalidRating(6))
        ));
    }

    #[test]
    fn test_stock_check() {
        let product = create_test_product();
        assert!(product.ensure_in_stock(3).is_ok());
        assert!(matches!(
            product.ensure_in_stock(4),
            Err(ProductError::InsufficientStock { available: 3, .. })
        ));
        assert!(matches!(product.ensure_in_stock(0), Err(ProductError::InvalidQuantity(0))));
    }

    #[test]
    fn test_decrement_stock_saturates() {
        let mut product = create_test_product();
        product.execute(&ProductCommand::DecrementStock { qty: 5 }).unwrap();
        assert_eq!(product.details.count_in_stock, 0);
    }

    #[test]
    fn test_document_body_is_flat() {
        let product = create_test_product();
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["category"], "Shirts");
        assert_eq!(json["price"], "49.90");

        let back: ProductAggregate = serde_json::from_value(json).unwrap();
        assert_eq!(back.details.price, dec!(49.90));
    }
}
