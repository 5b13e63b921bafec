use base64::{engine::general_purpose::URL_SAFE_NO_PAD as B64, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::domain::user::UserAggregate;

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// Bearer tokens - compact HS256 JWTs
// ============================================================================

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// What a token asserts about its holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_brand: bool,
    pub is_brand_approved: bool,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &UserAggregate, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.to_string(),
            is_admin: user.is_admin,
            is_brand: user.is_brand,
            is_brand_approved: user.is_brand_approved,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Same token window, with the roles and identity the account has now
    pub fn refreshed(self, user: &UserAggregate) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.to_string(),
            is_admin: user.is_admin,
            is_brand: user.is_brand,
            is_brand_approved: user.is_brand_approved,
            ..self
        }
    }

    pub fn is_seller(&self) -> bool {
        self.is_brand && self.is_brand_approved
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,
}

#[derive(Clone)]
pub struct TokenService {
    /// Keyed once, cloned per token
    mac: HmacSha256,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(config.jwt_secret.as_bytes())?,
            ttl: Duration::days(config.token_ttl_days),
        })
    }

    pub fn issue(&self, user: &UserAggregate) -> Result<String, serde_json::Error> {
        self.encode(&Claims::for_user(user, self.ttl))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, serde_json::Error> {
        let header = B64.encode(HEADER);
        let payload = B64.encode(serde_json::to_vec(claims)?);
        let signing_input = format!("{}.{}", header, payload);

        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let signature = B64.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let signature = B64.decode(signature).map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac.clone();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature).map_err(|_| TokenError::BadSignature)?;

        let payload = B64.decode(payload).map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}
