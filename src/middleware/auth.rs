use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::Claims;
use crate::config;
use crate::error::ApiError;

/// Authenticated caller context extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_from_headers(&parts.headers).map_err(ApiError::unauthorized)?;
        let claims = validate_jwt(&token).map_err(ApiError::unauthorized)?;
        Ok(AuthUser::from(claims))
    }
}

/// Guard for admin-only routes. Rejects unauthenticated and non-admin callers
/// with 401 before the handler body runs.
#[derive(Clone, Debug)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::unauthorized("Admin privileges required"));
        }
        Ok(AdminUser(user))
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid JWT token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn rejects_missing_header() {
        let err = extract_jwt_from_headers(&HeaderMap::new()).unwrap_err();
        assert!(err.contains("Missing"));
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let err = extract_jwt_from_headers(&headers_with("Basic abc123")).unwrap_err();
        assert!(err.contains("Bearer"));
    }

    #[test]
    fn rejects_empty_token() {
        let err = extract_jwt_from_headers(&headers_with("Bearer   ")).unwrap_err();
        assert!(err.contains("Empty"));
    }

    #[test]
    fn extracts_and_validates_signed_token() {
        let token = generate_jwt(&Claims::new("u-admin".into(), true)).unwrap();
        let extracted =
            extract_jwt_from_headers(&headers_with(&format!("Bearer {}", token))).unwrap();
        let claims = validate_jwt(&extracted).unwrap();
        assert_eq!(claims.username, "u-admin");
        assert!(claims.is_admin);
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(validate_jwt("not-a-jwt").is_err());
    }
}
