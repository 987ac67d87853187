//! Bearer-token authentication shared by every REST module.
//!
//! The REST host owns one [`JwtAuth`] and installs it as a request extension;
//! handlers take [`AuthUser`] as an argument to require a valid token.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::problem::{self, ProblemResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Vendor,
    Admin,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
            Role::Guest => "guest",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "vendor" => Ok(Role::Vendor),
            "admin" => Ok(Role::Admin),
            "guest" => Ok(Role::Guest),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    Missing,
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
    #[error("authentication is not configured")]
    NotConfigured,
}

/// HS256 signer/verifier.
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtAuth {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner of the record, or an admin.
    pub fn can_act_for(&self, owner: Uuid) -> bool {
        self.id == owner || self.is_admin()
    }

    pub fn require_role(&self, role: Role) -> Result<(), ProblemResponse> {
        if self.role == role {
            Ok(())
        } else {
            Err(problem::forbidden(format!(
                "{} role required",
                role.as_str()
            )))
        }
    }
}

fn bearer(parts: &Parts) -> Option<&str> {
    if let Some(v) = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        return v.strip_prefix("Bearer ").map(str::trim);
    }
    // EventSource cannot set headers, so the stream endpoint passes `?token=`.
    parts
        .uri
        .query()?
        .split('&')
        .find_map(|kv| kv.strip_prefix("token="))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .extensions
            .get::<Arc<JwtAuth>>()
            .cloned()
            .ok_or_else(|| problem::internal_error(AuthError::NotConfigured.to_string()))?;
        let token = bearer(parts).ok_or_else(|| problem::unauthorized(AuthError::Missing.to_string()))?;
        let claims = auth.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            problem::unauthorized("invalid or expired token")
        })?;
        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn app(auth: Arc<JwtAuth>) -> Router {
        Router::new()
            .route(
                "/me",
                get(|user: AuthUser| async move { user.id.to_string() }),
            )
            .layer(Extension(auth))
    }

    async fn call(router: Router, uri: &str, header: Option<String>) -> http::StatusCode {
        let mut req = http::Request::builder().uri(uri);
        if let Some(h) = header {
            req = req.header("authorization", h);
        }
        router
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn issued_token_verifies_and_carries_role() {
        let auth = JwtAuth::new("secret", 1);
        let id = Uuid::new_v4();
        let token = auth.issue(id, Role::Vendor).unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Vendor);
        assert!(claims.exp > claims.iat);

        assert!(JwtAuth::new("other", 1).verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = JwtAuth::new("secret", -2);
        let token = auth.issue(Uuid::new_v4(), Role::User).unwrap();
        assert!(matches!(auth.verify(&token), Err(AuthError::Invalid(_))));
    }

    #[tokio::test]
    async fn extractor_accepts_header_or_query_token() {
        let auth = Arc::new(JwtAuth::new("secret", 1));
        let token = auth.issue(Uuid::new_v4(), Role::User).unwrap();

        assert_eq!(
            call(app(auth.clone()), "/me", Some(format!("Bearer {token}"))).await,
            http::StatusCode::OK
        );
        assert_eq!(
            call(app(auth.clone()), &format!("/me?token={token}"), None).await,
            http::StatusCode::OK
        );
        assert_eq!(
            call(app(auth.clone()), "/me", None).await,
            http::StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(app(auth), "/me", Some("Bearer nope".into())).await,
            http::StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn ownership_and_roles() {
        let owner = Uuid::new_v4();
        let user = AuthUser {
            id: owner,
            role: Role::User,
        };
        let admin = AuthUser {
            id: Uuid::new_v4(),
            role: Role::Admin,
        };
        assert!(user.can_act_for(owner));
        assert!(admin.can_act_for(owner));
        assert!(!AuthUser { id: Uuid::new_v4(), role: Role::Vendor }.can_act_for(owner));
        assert!(user.require_role(Role::Vendor).is_err());
        assert_eq!("vendor".parse::<Role>().unwrap(), Role::Vendor);
    }
}
