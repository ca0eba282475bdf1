use axum::{
    extract::Request,
    http::header::{AUTHORIZATION, COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::account::Account;

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_PATH: &str = "/admin/login";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

pub fn issue_session(account: &Account, secret: &str, ttl_minutes: i64) -> Result<String> {
    let exp = (Utc::now() + chrono::Duration::minutes(ttl_minutes)).timestamp() as usize;
    let claims = Claims {
        sub: account.id.to_string(),
        email: account.email.clone(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to issue session token: {}", e)))
}

/// An expired, malformed, or missing token is simply no session.
pub fn verify_session(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

/// Value for the Set-Cookie header carrying a fresh session.
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// Admin paths require a session, except the ones that exist to
/// establish one. API paths authorize per request and are never
/// redirected.
pub fn is_guarded_path(path: &str) -> bool {
    if path.starts_with("/api") {
        return false;
    }
    if !path.starts_with("/admin") {
        return false;
    }
    !is_session_entry_path(path)
}

fn is_session_entry_path(path: &str) -> bool {
    path.contains("/login") || path.contains("/signup") || path.contains("/fix-accounts")
}

fn session_token(req: &Request) -> Option<String> {
    if let Some(cookies) = req.headers().get(COOKIE).and_then(|v| v.to_str().ok()) {
        for pair in cookies.split(';') {
            if let Some(value) = pair
                .trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
            {
                return Some(value.to_string());
            }
        }
    }
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Navigation guard for the admin screens: no live session means a
/// redirect to the login page. Skipped wholesale in development unless
/// the override flag is set.
pub async fn route_guard(mut req: Request, next: Next) -> Response {
    let config = crate::config::get_config();

    if config.is_development() && !config.enforce_auth_in_dev {
        return next.run(req).await;
    }

    let path = req.uri().path().to_string();
    if !is_guarded_path(&path) {
        return next.run(req).await;
    }

    match session_token(&req).and_then(|token| verify_session(&token, &config.jwt_secret)) {
        Some(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        None => Redirect::to(LOGIN_PATH).into_response(),
    }
}
