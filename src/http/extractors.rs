use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use async_trait::async_trait;
use futures_util::future::{FutureExt, LocalBoxFuture};
use uuid::Uuid;

use crate::auth::{Claims, TokenService};
use crate::domain::user::UserAggregate;
use crate::error::AppError;
use crate::persistence::DocumentStore;

// ============================================================================
// Authentication extractors
// ============================================================================
//
// Missing or bad bearer tokens are 401; a valid token without the
// required role is 403. Roles come from the stored account, not from the
// token, so revocations and demotions apply to tokens already issued.
//
// ============================================================================

/// Where the extractors read an account's current roles
#[async_trait]
pub trait Accounts: Send + Sync {
    async fn account(&self, id: Uuid) -> Result<Option<UserAggregate>, AppError>;
}

#[async_trait]
impl Accounts for DocumentStore<UserAggregate> {
    async fn account(&self, id: Uuid) -> Result<Option<UserAggregate>, AppError> {
        Ok(self.load(id).await?)
    }
}

/// Any signed-in user
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// A signed-in admin
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

/// An approved brand or an admin
#[derive(Debug, Clone)]
pub struct SellerOrAdmin(pub Claims);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.sub
    }

    /// Owners and admins may act on a user's own records
    pub fn may_act_for(&self, owner_id: Uuid) -> bool {
        self.0.is_admin || self.0.sub == owner_id
    }
}

impl AdminUser {
    pub fn id(&self) -> Uuid {
        self.0.sub
    }
}

impl SellerOrAdmin {
    pub fn id(&self) -> Uuid {
        self.0.sub
    }

    pub fn is_admin(&self) -> bool {
        self.0.is_admin
    }
}

fn authenticate(req: &HttpRequest) -> Result<(Claims, web::Data<dyn Accounts>), AppError> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("token service not configured")))?;
    let accounts = req
        .app_data::<web::Data<dyn Accounts>>()
        .cloned()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("account lookup not configured")))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("No Token".to_string()))?;

    let claims = tokens.decode(token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized("Invalid Token".to_string())
    })?;

    Ok((claims, accounts))
}

/// Verify the token, reload the account, then apply the role guard
fn extract_with<T, G>(req: &HttpRequest, guard: G) -> LocalBoxFuture<'static, Result<T, AppError>>
where
    T: 'static,
    G: FnOnce(Claims) -> Result<T, AppError> + 'static,
{
    let authenticated = authenticate(req);

    async move {
        let (claims, accounts) = authenticated?;
        let user = accounts.account(claims.sub).await?.ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "Token for a deleted account");
            AppError::Unauthorized("Invalid Token".to_string())
        })?;
        guard(claims.refreshed(&user))
    }
    .boxed_local()
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        extract_with(req, |claims| Ok(AuthUser(claims)))
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        extract_with(req, |claims| {
            if claims.is_admin {
                Ok(AdminUser(claims))
            } else {
                Err(AppError::Forbidden("Invalid Admin Token".to_string()))
            }
        })
    }
}

impl FromRequest for SellerOrAdmin {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        extract_with(req, |claims| {
            if claims.is_admin || claims.is_seller() {
                Ok(SellerOrAdmin(claims))
            } else {
                Err(AppError::Forbidden("Invalid Brand Token".to_string()))
            }
        })
    }
}
