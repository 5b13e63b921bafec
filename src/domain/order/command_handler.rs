use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::domain::discount::{normalize_code, DiscountAggregate, DiscountCommand};
use crate::domain::invoice::{InvoiceAggregate, InvoiceCommand, InvoiceLine};
use crate::domain::product::{ProductAggregate, ProductCommand};
use crate::domain::shared::round2;
use crate::domain::user::UserAggregate;
use crate::error::AppError;
use crate::persistence::{CommandContext, CommandHandler, DocumentStore};

use super::aggregate::OrderAggregate;
use super::commands::OrderCommand;
use super::errors::OrderError;
use super::value_objects::*;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates the commands that touch more than the order itself. Each
// operation runs in one transaction:
// - place: reprice from the catalog, check stock, redeem the discount code,
//   insert the order
// - pay: mark paid, decrement stock, issue one invoice per brand
//
// ============================================================================

/// Checkout request after authentication
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: Uuid,
    pub lines: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub discount_code: Option<String>,
}

#[derive(Clone)]
pub struct OrderCommandHandler {
    pool: PgPool,
    pricing: PricingConfig,
    orders: CommandHandler<OrderAggregate>,
    products: CommandHandler<ProductAggregate>,
    discounts: CommandHandler<DiscountAggregate>,
    invoices: CommandHandler<InvoiceAggregate>,
    users: DocumentStore<UserAggregate>,
}

impl OrderCommandHandler {
    pub fn new(pool: PgPool, pricing: PricingConfig) -> Self {
        Self {
            orders: CommandHandler::new(DocumentStore::new(pool.clone())),
            products: CommandHandler::new(DocumentStore::new(pool.clone())),
            discounts: CommandHandler::new(DocumentStore::new(pool.clone())),
            invoices: CommandHandler::new(DocumentStore::new(pool.clone())),
            users: DocumentStore::new(pool.clone()),
            pool,
            pricing,
        }
    }

    pub fn orders(&self) -> &CommandHandler<OrderAggregate> {
        &self.orders
    }

    /// Price the cart from the catalog and create the order
    pub async fn place_order(&self, request: PlaceOrder, ctx: CommandContext) -> Result<OrderAggregate, AppError> {
        if request.lines.is_empty() {
            return Err(OrderError::EmptyItems.into());
        }

        let mut tx = self.pool.begin().await?;

        let mut catalog: HashMap<Uuid, ProductAggregate> = HashMap::new();
        for line in &request.lines {
            if line.qty <= 0 {
                return Err(OrderError::InvalidQuantity(line.qty).into());
            }
            if !catalog.contains_key(&line.product_id) {
                let product = self
                    .products
                    .store()
                    .load_in(&mut tx, line.product_id)
                    .await?
                    .ok_or(AppError::NotFound("Product"))?;
                catalog.insert(line.product_id, product);
            }
        }

        let items = price_lines(&request.lines, &catalog)?;

        let redemption = match request.discount_code.as_deref().map(normalize_code) {
            Some(code) if !code.is_empty() => {
                let discount = self
                    .discounts
                    .store()
                    .find_by_field_in(&mut tx, "code", &code)
                    .await?
                    .ok_or(AppError::NotFound("Discount code"))?;
                let value = discount.check_redeemable(request.user_id, Utc::now())?;
                Some((discount, value))
            }
            _ => None,
        };

        let order_id = Uuid::now_v7();
        let command = OrderCommand::Place {
            order_id,
            user_id: request.user_id,
            items,
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            discount: redemption.as_ref().map(|(discount, value)| DiscountOffer {
                discount_id: discount.id,
                code: discount.code.clone(),
                value: *value,
            }),
            pricing: self.pricing.clone(),
        };
        let order = self.orders.create_in(&mut tx, command, ctx).await?;

        if let Some((discount, _)) = redemption {
            let redeem = DiscountCommand::Redeem {
                user_id: request.user_id,
                order_id,
                at: Utc::now(),
            };
            self.discounts.execute_loaded_in(&mut tx, discount, redeem, ctx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total_price = %order.total_price,
            brands = order.brand_deliveries.len(),
            "Order placed"
        );

        Ok(order)
    }

    /// Record payment, take the items out of stock and invoice each brand
    pub async fn pay_order(
        &self,
        order: OrderAggregate,
        payment_result: PaymentResult,
        ctx: CommandContext,
    ) -> Result<OrderAggregate, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .orders
            .execute_loaded_in(&mut tx, order, OrderCommand::Pay { payment_result }, ctx)
            .await?;

        for (product_id, qty) in order.quantities_by_product() {
            match self.products.store().load_in(&mut tx, product_id).await? {
                Some(product) => {
                    self.products
                        .execute_loaded_in(&mut tx, product, ProductCommand::DecrementStock { qty }, ctx)
                        .await?;
                }
                None => {
                    tracing::warn!(order_id = %order.id, product_id = %product_id, "Paid product no longer exists");
                }
            }
        }

        for delivery in &order.brand_deliveries {
            let brand = self.users.load_in(&mut tx, delivery.brand_id).await?;
            let command = InvoiceCommand::Issue {
                invoice_id: Uuid::now_v7(),
                order_id: order.id,
                brand_id: delivery.brand_id,
                brand_name: delivery.brand_name.clone(),
                lines: invoice_lines(&order, delivery.brand_id),
                commission_rate: commission_rate_for(brand.as_ref(), self.pricing.default_commission_rate),
            };
            self.invoices.create_in(&mut tx, command, ctx).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            invoices = order.brand_deliveries.len(),
            "Order paid"
        );

        Ok(order)
    }
}

/// Turn cart lines into order items priced from `catalog`, checking stock
/// against the total requested per product
fn price_lines(
    lines: &[CartLine],
    catalog: &HashMap<Uuid, ProductAggregate>,
) -> Result<Vec<OrderItem>, AppError> {
    let mut requested: HashMap<Uuid, i32> = HashMap::new();
    let mut items = Vec::with_capacity(lines.len());

    for line in lines {
        let product = catalog.get(&line.product_id).ok_or(AppError::NotFound("Product"))?;

        let total = requested.entry(line.product_id).or_insert(0);
        *total += line.qty;
        product.ensure_in_stock(*total)?;

        items.push(OrderItem {
            product_id: product.id,
            name: product.details.name.clone(),
            image: product.first_image(),
            size: line.size.clone().filter(|s| !s.trim().is_empty()),
            price: product.details.price,
            qty: line.qty,
            brand_id: product.brand_id,
            brand_name: product.brand_name.clone(),
        });
    }

    Ok(items)
}

fn invoice_lines(order: &OrderAggregate, brand_id: Uuid) -> Vec<InvoiceLine> {
    order
        .order_items
        .iter()
        .filter(|item| item.brand_id == brand_id)
        .map(|item| InvoiceLine {
            product_id: item.product_id,
            name: item.name.clone(),
            qty: item.qty,
            unit_price: item.price,
            amount: round2(item.line_total()),
        })
        .collect()
}

/// The brand's own rate wins over the marketplace default
fn commission_rate_for(brand: Option<&UserAggregate>, default_rate: Decimal) -> Decimal {
    brand
        .and_then(UserAggregate::commission_override)
        .unwrap_or(default_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::ProductDetails;
    use crate::domain::shared::Email;
    use crate::domain::user::{BrandProfile, UserCommand};
    use crate::persistence::core::Aggregate;
    use rust_decimal_macros::dec;

    fn create_test_product(price: Decimal, stock: i32) -> ProductAggregate {
        let command = ProductCommand::Create {
            product_id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            brand_name: "Fjord".to_string(),
            details: ProductDetails {
                name: "Rain Jacket".to_string(),
                category: "Outerwear".to_string(),
                description: String::new(),
                images: vec!["/img/jacket.jpg".to_string()],
                sizes: vec![],
                price,
                count_in_stock: stock,
            },
        };
        ProductAggregate::create(&command).unwrap().0
    }

    fn catalog_of(products: &[&ProductAggregate]) -> HashMap<Uuid, ProductAggregate> {
        products.iter().map(|p| (p.id, (*p).clone())).collect()
    }

    fn line(product_id: Uuid, qty: i32, size: Option<&str>) -> CartLine {
        CartLine {
            product_id,
            qty,
            size: size.map(str::to_string),
        }
    }

    #[test]
    fn test_price_lines_uses_catalog_price() {
        let product = create_test_product(dec!(89.50), 10);
        let items = price_lines(&[line(product.id, 2, Some("M"))], &catalog_of(&[&product])).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, dec!(89.50));
        assert_eq!(items[0].brand_id, product.brand_id);
        assert_eq!(items[0].brand_name, "Fjord");
        assert_eq!(items[0].image, "/img/jacket.jpg");
        assert_eq!(items[0].size.as_deref(), Some("M"));
    }

    #[test]
    fn test_price_lines_checks_total_stock_across_sizes() {
        let product = create_test_product(dec!(10), 3);
        let lines = [line(product.id, 2, Some("S")), line(product.id, 2, Some("L"))];

        let result = price_lines(&lines, &catalog_of(&[&product]));
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_price_lines_unknown_product() {
        let result = price_lines(&[line(Uuid::new_v4(), 1, None)], &HashMap::new());
        assert!(matches!(result, Err(AppError::NotFound("Product"))));
    }

    fn paid_order(items: Vec<OrderItem>) -> OrderAggregate {
        let command = OrderCommand::Place {
            order_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            items,
            shipping_address: ShippingAddress {
                full_name: "Jane".to_string(),
                address: "1 Main St".to_string(),
                city: "Oslo".to_string(),
                postal_code: "0150".to_string(),
                country: "Norway".to_string(),
                lat: None,
                lng: None,
            },
            payment_method: PaymentMethod::PayPal,
            discount: None,
            pricing: PricingConfig::default(),
        };
        OrderAggregate::create(&command).unwrap().0
    }

    #[test]
    fn test_invoice_lines_only_for_brand() {
        let jacket = create_test_product(dec!(100), 5);
        let scarf = create_test_product(dec!(19.99), 5);
        let items = price_lines(
            &[line(jacket.id, 1, None), line(scarf.id, 3, None)],
            &catalog_of(&[&jacket, &scarf]),
        )
        .unwrap();

        let order = paid_order(items);
        let lines = invoice_lines(&order, scarf.brand_id);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, 3);
        assert_eq!(lines[0].amount, dec!(59.97));
    }

    #[test]
    fn test_commission_rate_prefers_brand_override() {
        let register = UserCommand::Register {
            user_id: Uuid::new_v4(),
            name: "Owner".to_string(),
            email: Email::parse("owner@fjord.no").unwrap(),
            password_hash: "hash".to_string(),
            brand: Some(BrandProfile {
                name: "Fjord".to_string(),
                commission_rate: Some(dec!(0.12)),
                ..BrandProfile::default()
            }),
            is_admin: false,
        };
        let (brand, _) = UserAggregate::create(&register).unwrap();

        assert_eq!(commission_rate_for(Some(&brand), dec!(0.20)), dec!(0.12));
        assert_eq!(commission_rate_for(None, dec!(0.20)), dec!(0.20));
    }
}
