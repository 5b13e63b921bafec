use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::instagram::InstagramCommand;
use crate::error::Result;
use crate::persistence::CommandContext;
use crate::queries;
use super::extractors::AdminUser;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CurateRequest {
    pub is_displayed: Option<bool>,
    pub display_order: Option<i32>,
}

/// Public storefront feed
pub async fn feed(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::instagram::feed(&state.pool).await?))
}

pub async fn list_all(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::instagram::list_all(&state.pool).await?))
}

pub async fn sync(state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse> {
    let report = state.instagram.sync(CommandContext::new(Some(admin.id()))).await?;
    Ok(HttpResponse::Ok().json(report))
}

pub async fn curate(
    state: web::Data<AppState>,
    admin: AdminUser,
    id: web::Path<Uuid>,
    body: web::Json<CurateRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let command = InstagramCommand::Curate {
        is_displayed: body.is_displayed,
        display_order: body.display_order,
    };
    let post = state
        .instagram
        .posts()
        .execute(id.into_inner(), command, CommandContext::new(Some(admin.id())))
        .await?;
    Ok(HttpResponse::Ok().json(post))
}
