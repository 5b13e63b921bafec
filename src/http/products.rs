use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::product::{ProductAggregate, ProductCommand, ProductDetails};
use crate::domain::user::UserAggregate;
use crate::error::{AppError, Result};
use crate::persistence::CommandContext;
use crate::queries::{self, products::ProductSearch};
use super::extractors::{AuthUser, SellerOrAdmin};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(flatten)]
    pub details: ProductDetails,
    /// Required when an admin lists a product for a brand
    pub brand_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// The account a new product is listed under
fn listing_brand_id(caller: &SellerOrAdmin, requested: Option<Uuid>) -> Result<Uuid> {
    match requested {
        Some(brand_id) if caller.is_admin() => Ok(brand_id),
        Some(brand_id) if brand_id != caller.id() => {
            Err(AppError::Forbidden("Brands can only list their own products".to_string()))
        }
        Some(brand_id) => Ok(brand_id),
        None if caller.is_admin() && !caller.0.is_seller() => {
            Err(AppError::BadRequest("brand_id is required".to_string()))
        }
        None => Ok(caller.id()),
    }
}

/// Load the product and make sure the caller may change it
async fn owned_product(state: &AppState, caller: &SellerOrAdmin, id: Uuid) -> Result<ProductAggregate> {
    let product = state.products.get(id).await?;
    if !caller.is_admin() && !product.is_owned_by(caller.id()) {
        return Err(AppError::Forbidden("Not the owner of this product".to_string()));
    }
    Ok(product)
}

pub async fn search(state: web::Data<AppState>, query: web::Query<ProductSearch>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::products::search(&state.pool, &query).await?))
}

pub async fn categories(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::products::categories(&state.pool).await?))
}

pub async fn mine(state: web::Data<AppState>, seller: SellerOrAdmin) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::products::for_brand(&state.pool, seller.id()).await?))
}

pub async fn get_product(state: web::Data<AppState>, id: web::Path<Uuid>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.products.get(id.into_inner()).await?))
}

pub async fn create_product(
    state: web::Data<AppState>,
    seller: SellerOrAdmin,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let brand_id = listing_brand_id(&seller, body.brand_id)?;

    // An admin may list for any brand, which must still be able to sell
    let brand: UserAggregate = state
        .users
        .store()
        .load(brand_id)
        .await?
        .ok_or(AppError::NotFound("Brand"))?;
    if !brand.is_seller() && !(seller.is_admin() && brand.is_brand) {
        return Err(AppError::Forbidden("Brand is not approved to sell".to_string()));
    }

    let command = ProductCommand::Create {
        product_id: Uuid::now_v7(),
        brand_id,
        brand_name: brand.brand_name(),
        details: body.details,
    };
    let product = state
        .products
        .create(command, CommandContext::new(Some(seller.id())))
        .await?;

    tracing::info!(product_id = %product.id, brand_id = %brand_id, "Product created");
    Ok(HttpResponse::Created().json(product))
}

pub async fn update_product(
    state: web::Data<AppState>,
    seller: SellerOrAdmin,
    id: web::Path<Uuid>,
    body: web::Json<ProductDetails>,
) -> Result<HttpResponse> {
    let id = id.into_inner();
    owned_product(&state, &seller, id).await?;

    let command = ProductCommand::Update {
        details: body.into_inner(),
    };
    let product = state
        .products
        .execute(id, command, CommandContext::new(Some(seller.id())))
        .await?;

    Ok(HttpResponse::Ok().json(product))
}

pub async fn delete_product(
    state: web::Data<AppState>,
    seller: SellerOrAdmin,
    id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = id.into_inner();
    owned_product(&state, &seller, id).await?;
    state.products.store().delete(id).await?;

    tracing::info!(product_id = %id, user_id = %seller.id(), "Product deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Product Deleted" })))
}

pub async fn add_review(
    state: web::Data<AppState>,
    auth: AuthUser,
    id: web::Path<Uuid>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let command = ProductCommand::AddReview {
        user_id: auth.id(),
        name: auth.0.name.clone(),
        rating: body.rating,
        comment: body.comment,
    };
    let product = state
        .products
        .execute(id.into_inner(), command, CommandContext::new(Some(auth.id())))
        .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Review saved successfully.",
        "rating": product.rating,
        "num_reviews": product.num_reviews,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;

    fn caller(is_admin: bool, is_seller: bool) -> SellerOrAdmin {
        SellerOrAdmin(Claims {
            sub: Uuid::new_v4(),
            name: "Caller".to_string(),
            email: "caller@example.com".to_string(),
            is_admin,
            is_brand: is_seller,
            is_brand_approved: is_seller,
            iat: 0,
            exp: i64::MAX,
        })
    }

    #[test]
    fn test_brand_lists_under_itself() {
        let brand = caller(false, true);
        assert_eq!(listing_brand_id(&brand, None).unwrap(), brand.id());
        assert_eq!(listing_brand_id(&brand, Some(brand.id())).unwrap(), brand.id());
        assert!(listing_brand_id(&brand, Some(Uuid::new_v4())).is_err());
    }

    #[test]
    fn test_admin_must_name_a_brand() {
        let admin = caller(true, false);
        assert!(matches!(listing_brand_id(&admin, None), Err(AppError::BadRequest(_))));

        let brand_id = Uuid::new_v4();
        assert_eq!(listing_brand_id(&admin, Some(brand_id)).unwrap(), brand_id);
    }

    #[test]
    fn test_create_request_flattens_details() {
        let body: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "name": "Linen Shirt",
            "category": "Shirts",
            "price": "49.90",
            "count_in_stock": 5
        }))
        .unwrap();

        assert_eq!(body.details.name, "Linen Shirt");
        assert!(body.brand_id.is_none());
        assert!(body.details.sizes.is_empty());
    }
}
