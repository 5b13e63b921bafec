use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::domain::invoice::InvoiceCommand;
use crate::error::Result;
use crate::persistence::CommandContext;
use crate::queries;
use super::extractors::{AdminUser, SellerOrAdmin};
use super::orders::BrandFilter;
use super::state::AppState;

pub async fn list(
    state: web::Data<AppState>,
    _admin: AdminUser,
    filter: web::Query<BrandFilter>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::invoices::list(&state.pool, filter.brand).await?))
}

pub async fn mine(state: web::Data<AppState>, seller: SellerOrAdmin) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::invoices::list(&state.pool, Some(seller.id())).await?))
}

pub async fn settle(state: web::Data<AppState>, admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let invoice = state
        .invoices
        .execute(id.into_inner(), InvoiceCommand::Settle, CommandContext::new(Some(admin.id())))
        .await?;

    tracing::info!(invoice_id = %invoice.id, brand_id = %invoice.brand_id, payout = %invoice.payout, "Invoice settled");
    Ok(HttpResponse::Ok().json(invoice))
}
