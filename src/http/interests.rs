use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::domain::interest::{ApplicantDetails, InterestAggregate, InterestStatus};
use crate::domain::shared::Email;
use crate::domain::user::{validate_password, UserError};
use crate::error::Result;
use crate::persistence::CommandContext;
use crate::queries::{self, users::PublicUser};
use super::extractors::AdminUser;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub brand_name: String,
    pub contact_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub instagram_handle: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<InterestStatus>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub interest: InterestAggregate,
    pub user: PublicUser,
}

/// Brand sign-up: creates the unapproved brand account and the application
pub async fn submit(state: web::Data<AppState>, body: web::Json<SubmitRequest>) -> Result<HttpResponse> {
    let body = body.into_inner();
    let email = Email::parse(&body.email).ok_or_else(|| UserError::InvalidEmail(body.email.clone()))?;
    validate_password(&body.password)?;
    let password_hash = hash_password(body.password).await?;

    let details = ApplicantDetails {
        brand_name: body.brand_name,
        contact_name: body.contact_name,
        email,
        phone: body.phone,
        website: body.website,
        instagram_handle: body.instagram_handle,
        message: body.message,
    };
    let (user, interest) = state
        .interests
        .submit(details, password_hash, CommandContext::new(None))
        .await?;

    Ok(HttpResponse::Created().json(SubmitResponse {
        user: PublicUser::from(&user),
        interest,
    }))
}

pub async fn list(
    state: web::Data<AppState>,
    _admin: AdminUser,
    filter: web::Query<StatusFilter>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::interests::list(&state.pool, filter.status).await?))
}

pub async fn approve(state: web::Data<AppState>, admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let interest = state
        .interests
        .approve(id.into_inner(), CommandContext::new(Some(admin.id())))
        .await?;
    Ok(HttpResponse::Ok().json(interest))
}

pub async fn reject(
    state: web::Data<AppState>,
    admin: AdminUser,
    id: web::Path<Uuid>,
    body: Option<web::Json<RejectRequest>>,
) -> Result<HttpResponse> {
    let reason = body.and_then(|b| b.into_inner().reason);
    let interest = state
        .interests
        .reject(id.into_inner(), reason, CommandContext::new(Some(admin.id())))
        .await?;
    Ok(HttpResponse::Ok().json(interest))
}
