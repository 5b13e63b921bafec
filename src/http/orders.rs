use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Claims;
use crate::domain::order::{CartLine, OrderAggregate, OrderCommand, PaymentMethod, PaymentResult, PlaceOrder, ShippingAddress};
use crate::error::{AppError, Result};
use crate::persistence::CommandContext;
use crate::queries;
use super::extractors::{AdminUser, AuthUser, SellerOrAdmin};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub order_items: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub discount_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BrandFilter {
    pub brand: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    /// Required when an admin acts for a brand
    pub brand_id: Option<Uuid>,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeliverBrandRequest {
    pub brand_id: Option<Uuid>,
}

/// What the caller may see of an order: everything for its owner or an
/// admin, only its own lines for a brand in the order
fn visible_order(order: OrderAggregate, claims: &Claims) -> Result<OrderAggregate> {
    if claims.is_admin || order.user_id == claims.sub {
        return Ok(order);
    }
    if claims.is_seller() && order.contains_brand(claims.sub) {
        return Ok(order.view_for_brand(claims.sub));
    }
    Err(AppError::NotFound("Order"))
}

/// The brand whose delivery is being updated
fn acting_brand(caller: &SellerOrAdmin, requested: Option<Uuid>) -> Result<Uuid> {
    match requested {
        Some(brand_id) if caller.is_admin() || brand_id == caller.id() => Ok(brand_id),
        Some(_) => Err(AppError::Forbidden("Brands can only update their own deliveries".to_string())),
        None if caller.is_admin() && !caller.0.is_seller() => {
            Err(AppError::BadRequest("brand_id is required".to_string()))
        }
        None => Ok(caller.id()),
    }
}

pub async fn place_order(
    state: web::Data<AppState>,
    auth: AuthUser,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let request = PlaceOrder {
        user_id: auth.id(),
        lines: body.order_items,
        shipping_address: body.shipping_address,
        payment_method: body.payment_method,
        discount_code: body.discount_code,
    };

    let order = state
        .orders
        .place_order(request, CommandContext::new(Some(auth.id())))
        .await?;
    state.metrics.orders_placed.inc();

    Ok(HttpResponse::Created().json(order))
}

pub async fn list_orders(
    state: web::Data<AppState>,
    _admin: AdminUser,
    filter: web::Query<BrandFilter>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::orders::list(&state.pool, filter.brand).await?))
}

pub async fn mine(state: web::Data<AppState>, auth: AuthUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::orders::mine(&state.pool, auth.id()).await?))
}

pub async fn brand_orders(state: web::Data<AppState>, seller: SellerOrAdmin) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::orders::for_brand(&state.pool, seller.id()).await?))
}

pub async fn summary(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::orders::summary(&state.pool).await?))
}

pub async fn brand_summary(state: web::Data<AppState>, seller: SellerOrAdmin) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::orders::brand_summary(&state.pool, seller.id()).await?))
}

pub async fn get_order(state: web::Data<AppState>, auth: AuthUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let order = state.orders.orders().get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(visible_order(order, &auth.0)?))
}

pub async fn pay_order(
    state: web::Data<AppState>,
    auth: AuthUser,
    id: web::Path<Uuid>,
    body: web::Json<PaymentResult>,
) -> Result<HttpResponse> {
    let order = state.orders.orders().get(id.into_inner()).await?;
    if !auth.may_act_for(order.user_id) {
        return Err(AppError::NotFound("Order"));
    }

    let order = state
        .orders
        .pay_order(order, body.into_inner(), CommandContext::new(Some(auth.id())))
        .await?;
    state.metrics.orders_paid.inc();

    Ok(HttpResponse::Ok().json(order))
}

pub async fn dispatch_brand(
    state: web::Data<AppState>,
    seller: SellerOrAdmin,
    id: web::Path<Uuid>,
    body: web::Json<DispatchRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let brand_id = acting_brand(&seller, body.brand_id)?;
    let command = OrderCommand::DispatchBrand {
        brand_id,
        tracking_number: body.tracking_number.filter(|t| !t.trim().is_empty()),
    };

    let order = state
        .orders
        .orders()
        .execute(id.into_inner(), command, CommandContext::new(Some(seller.id())))
        .await?;
    Ok(HttpResponse::Ok().json(visible_order(order, &seller.0)?))
}

pub async fn deliver_brand(
    state: web::Data<AppState>,
    seller: SellerOrAdmin,
    id: web::Path<Uuid>,
    body: Option<web::Json<DeliverBrandRequest>>,
) -> Result<HttpResponse> {
    let requested = body.and_then(|b| b.into_inner().brand_id);
    let brand_id = acting_brand(&seller, requested)?;

    let order = state
        .orders
        .orders()
        .execute(
            id.into_inner(),
            OrderCommand::DeliverBrand { brand_id },
            CommandContext::new(Some(seller.id())),
        )
        .await?;
    Ok(HttpResponse::Ok().json(visible_order(order, &seller.0)?))
}

pub async fn deliver_order(state: web::Data<AppState>, admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let order = state
        .orders
        .orders()
        .execute(id.into_inner(), OrderCommand::DeliverAll, CommandContext::new(Some(admin.id())))
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn delete_order(state: web::Data<AppState>, admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let id = id.into_inner();
    let order = state.orders.orders().get(id).await?;
    order.ensure_deletable()?;
    state.orders.orders().store().delete(id).await?;

    tracing::info!(order_id = %id, admin_id = %admin.id(), "Order deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Order Deleted" })))
}

pub async fn order_invoices(state: web::Data<AppState>, _admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::invoices::for_order(&state.pool, id.into_inner()).await?))
}
