use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::discount::{normalize_code, DiscountCommand};
use crate::error::{AppError, Result};
use crate::persistence::CommandContext;
use super::extractors::{AdminUser, AuthUser};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDiscountRequest {
    pub code: String,
    pub value: Decimal,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDiscountRequest {
    pub value: Option<Decimal>,
    pub is_active: Option<bool>,
    /// Absent leaves the expiry alone; `null` clears it
    #[serde(default, deserialize_with = "super::double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ValidatedCode {
    pub code: String,
    pub value: Decimal,
}

pub async fn create(
    state: web::Data<AppState>,
    admin: AdminUser,
    body: web::Json<CreateDiscountRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let command = DiscountCommand::Create {
        discount_id: Uuid::now_v7(),
        code: body.code,
        value: body.value,
        expires_at: body.expires_at,
    };
    let discount = state
        .discounts
        .create(command, CommandContext::new(Some(admin.id())))
        .await?;

    tracing::info!(discount_id = %discount.id, code = %discount.code, "Discount code created");
    Ok(HttpResponse::Created().json(discount))
}

pub async fn list(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.discounts.store().list().await?))
}

pub async fn update(
    state: web::Data<AppState>,
    admin: AdminUser,
    id: web::Path<Uuid>,
    body: web::Json<UpdateDiscountRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let command = DiscountCommand::Update {
        value: body.value,
        is_active: body.is_active,
        expires_at: body.expires_at,
    };
    let discount = state
        .discounts
        .execute(id.into_inner(), command, CommandContext::new(Some(admin.id())))
        .await?;
    Ok(HttpResponse::Ok().json(discount))
}

pub async fn delete(state: web::Data<AppState>, _admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    if !state.discounts.store().delete(id.into_inner()).await? {
        return Err(AppError::NotFound("Discount code"));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Discount Code Deleted" })))
}

/// Check a code for the caller before checkout
pub async fn validate(
    state: web::Data<AppState>,
    auth: AuthUser,
    body: web::Json<ValidateRequest>,
) -> Result<HttpResponse> {
    let code = normalize_code(&body.code);
    let discount = state
        .discounts
        .store()
        .find_by_field("code", &code)
        .await?
        .ok_or(AppError::NotFound("Discount code"))?;

    let value = discount.check_redeemable(auth.id(), Utc::now())?;
    Ok(HttpResponse::Ok().json(ValidatedCode {
        code: discount.code,
        value,
    }))
}
