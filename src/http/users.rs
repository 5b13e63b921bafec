use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, TokenService};
use crate::domain::shared::Email;
use crate::domain::user::{validate_password, BrandProfile, UserAggregate, UserCommand, UserError};
use crate::error::{AppError, Result};
use crate::persistence::CommandContext;
use crate::queries::{self, users::PublicUser};
use super::extractors::{AdminUser, AuthUser};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub brand: Option<BrandProfile>,
}

#[derive(Debug, Deserialize)]
pub struct AdminUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    pub is_brand: Option<bool>,
    /// Absent leaves the override alone; `null` falls back to the default rate
    #[serde(default, deserialize_with = "super::double_option")]
    pub commission_rate: Option<Option<Decimal>>,
}

/// A user together with a fresh token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub token: String,
}

fn parse_email(raw: &str) -> Result<Email> {
    Email::parse(raw).ok_or_else(|| UserError::InvalidEmail(raw.to_string()).into())
}

fn signed_in(tokens: &TokenService, user: &UserAggregate) -> Result<AuthResponse> {
    Ok(AuthResponse {
        user: PublicUser::from(user),
        token: tokens.issue(user)?,
    })
}

pub async fn register(
    state: web::Data<AppState>,
    tokens: web::Data<TokenService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let email = parse_email(&body.email)?;
    validate_password(&body.password)?;
    let password_hash = hash_password(body.password).await?;

    let command = UserCommand::Register {
        user_id: Uuid::now_v7(),
        name: body.name,
        email,
        password_hash,
        brand: None,
        is_admin: false,
    };
    let user = state.users.create(command, CommandContext::new(None)).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(HttpResponse::Created().json(signed_in(&tokens, &user)?))
}

pub async fn signin(
    state: web::Data<AppState>,
    tokens: web::Data<TokenService>,
    body: web::Json<SigninRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let email = Email::parse(&body.email).ok_or_else(invalid)?;
    let user = state
        .users
        .store()
        .find_by_field("email", email.as_str())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(body.password, user.password_hash.clone()).await? {
        return Err(invalid());
    }

    Ok(HttpResponse::Ok().json(signed_in(&tokens, &user)?))
}

pub async fn update_profile(
    state: web::Data<AppState>,
    tokens: web::Data<TokenService>,
    auth: AuthUser,
    body: web::Json<ProfileRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let email = body.email.as_deref().map(parse_email).transpose()?;
    let password_hash = match body.password {
        Some(password) if !password.is_empty() => {
            validate_password(&password)?;
            Some(hash_password(password).await?)
        }
        _ => None,
    };

    let command = UserCommand::UpdateProfile {
        name: body.name,
        email,
        password_hash,
        brand: body.brand,
    };
    let user = state
        .users
        .execute(auth.id(), command, CommandContext::new(Some(auth.id())))
        .await?;

    Ok(HttpResponse::Ok().json(signed_in(&tokens, &user)?))
}

pub async fn get_user(state: web::Data<AppState>, _auth: AuthUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let user = state.users.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

pub async fn list_users(state: web::Data<AppState>, _admin: AdminUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::users::list(&state.pool).await?))
}

pub async fn list_brands(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(queries::users::brands(&state.pool).await?))
}

pub async fn admin_update_user(
    state: web::Data<AppState>,
    admin: AdminUser,
    id: web::Path<Uuid>,
    body: web::Json<AdminUpdateRequest>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let command = UserCommand::AdminUpdate {
        name: body.name,
        email: body.email.as_deref().map(parse_email).transpose()?,
        is_admin: body.is_admin,
        is_brand: body.is_brand,
        commission_rate: body.commission_rate,
    };
    let user = state
        .users
        .execute(id.into_inner(), command, CommandContext::new(Some(admin.id())))
        .await?;

    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

pub async fn delete_user(state: web::Data<AppState>, admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let id = id.into_inner();
    let user = state.users.get(id).await?;
    user.ensure_deletable()?;
    state.users.store().delete(id).await?;

    tracing::info!(user_id = %id, admin_id = %admin.id(), "User deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "User Deleted" })))
}

pub async fn approve_brand(state: web::Data<AppState>, admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let user = state
        .users
        .execute(id.into_inner(), UserCommand::ApproveBrand, CommandContext::new(Some(admin.id())))
        .await?;
    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

pub async fn revoke_brand(state: web::Data<AppState>, admin: AdminUser, id: web::Path<Uuid>) -> Result<HttpResponse> {
    let user = state
        .users
        .execute(id.into_inner(), UserCommand::RevokeBrand, CommandContext::new(Some(admin.id())))
        .await?;
    Ok(HttpResponse::Ok().json(PublicUser::from(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, ResponseError};

    #[test]
    fn test_bad_email_is_400() {
        let err = parse_email("not-an-email").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_email_is_lower_cased() {
        assert_eq!(parse_email(" Jane@Example.COM ").unwrap().as_str(), "jane@example.com");
    }

    #[test]
    fn test_admin_update_commission_absent_vs_null() {
        let absent: AdminUpdateRequest = serde_json::from_str(r#"{ "is_brand": true }"#).unwrap();
        assert_eq!(absent.commission_rate, None);

        let cleared: AdminUpdateRequest = serde_json::from_str(r#"{ "commission_rate": null }"#).unwrap();
        assert_eq!(cleared.commission_rate, Some(None));

        let set: AdminUpdateRequest = serde_json::from_str(r#"{ "commission_rate": "0.12" }"#).unwrap();
        assert_eq!(set.commission_rate, Some(Some(Decimal::new(12, 2))));
    }

    #[test]
    fn test_auth_response_flattens_user() {
        let response = AuthResponse {
            user: PublicUser {
                id: Uuid::new_v4(),
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
                is_admin: false,
                is_brand: false,
                is_brand_approved: false,
                brand: None,
                created_at: chrono::Utc::now(),
            },
            token: "t".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["token"], "t");
        assert!(json.get("password_hash").is_none());
    }
}
