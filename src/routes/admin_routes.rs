use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::dto::admin_dto::{AccountView, LoginPayload, SignupPayload};
use crate::middleware::auth;
use crate::AppState;

/// Sign in, then bootstrap the privilege record. Bootstrapping is
/// best-effort: its failure is logged and the login still succeeds.
pub async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> Response {
    if let Err(e) = payload.validate() {
        return unauthorized(e.to_string());
    }

    let account = match state
        .account_service
        .sign_in(&payload.email, &payload.password)
        .await
    {
        Ok(account) => account,
        Err(e) => {
            tracing::warn!(email = %payload.email, error = %e, "login rejected");
            return unauthorized("Invalid credentials".to_string());
        }
    };

    if let Err(e) = state.profile_service.ensure_admin(&account).await {
        tracing::error!(account = %account.id, error = %e, "failed to ensure admin profile");
    }

    let config = crate::config::get_config();
    let token = match auth::issue_session(&account, &config.jwt_secret, config.session_ttl_minutes)
    {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue session");
            return unauthorized("Invalid credentials".to_string());
        }
    };

    (
        [(header::SET_COOKIE, auth::session_cookie(&token))],
        Json(json!({
            "success": true,
            "message": "Admin logged in successfully",
            "user": AccountView::from(account),
        })),
    )
        .into_response()
}

/// Create (or adopt) the identity, then seed its privilege record with
/// the submitted contact details.
pub async fn signup(State(state): State<AppState>, Json(payload): Json<SignupPayload>) -> Response {
    if let Err(e) = payload.validate() {
        return failure(StatusCode::BAD_REQUEST, e.to_string());
    }

    // The profiles table may predate migrations on older deployments.
    if let Err(e) = state.profile_service.ensure_schema().await {
        tracing::warn!(error = %e, "profiles schema ensure failed, continuing signup");
    }

    let account = match state
        .account_service
        .find_or_create(
            &payload.email,
            &payload.password,
            Some(&payload.name),
            payload.designation.as_deref(),
            payload.phone.as_deref(),
        )
        .await
    {
        Ok(account) => account,
        Err(e) => {
            tracing::error!(email = %payload.email, error = %e, "signup failed");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create admin account".to_string(),
            );
        }
    };

    if let Err(e) = state
        .profile_service
        .upsert_privilege(
            account.id,
            Some(&account.email),
            Some(&payload.name),
            payload.designation.as_deref(),
            payload.phone.as_deref(),
        )
        .await
    {
        tracing::error!(account = %account.id, error = %e, "failed to create admin profile");
    }

    Json(json!({
        "success": true,
        "message": "Admin account created successfully",
        "userId": account.id,
    }))
    .into_response()
}

/// Operator repair tool: re-arm the privilege record of every known
/// identity and report per-identity outcomes.
pub async fn fix_accounts(State(state): State<AppState>) -> Response {
    let accounts = match state.account_service.list().await {
        Ok(accounts) => accounts,
        Err(e) => {
            tracing::error!(error = %e, "failed to list accounts");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fix admin accounts".to_string(),
            );
        }
    };

    let (message, users) = state.profile_service.fix_all_accounts(&accounts).await;
    Json(json!({
        "success": true,
        "message": message,
        "users": users,
    }))
    .into_response()
}

pub async fn setup_db(State(state): State<AppState>) -> Response {
    match state.profile_service.ensure_schema().await {
        Ok(existed) => Json(json!({
            "success": true,
            "message": "Database setup completed successfully, all users are now admins",
            "tableExists": existed,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "database setup failed");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database setup failed".to_string(),
            )
        }
    }
}

pub async fn stats(State(state): State<AppState>) -> Response {
    let total = match state.candidate_service.total_count().await {
        Ok(total) => total,
        Err(e) => {
            tracing::error!(error = %e, "failed to count candidates");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch candidate counts".to_string(),
            );
        }
    };
    let by_status = match state.candidate_service.status_counts().await {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!(error = %e, "failed to count candidates by status");
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch candidates by status".to_string(),
            );
        }
    };

    Json(json!({
        "success": true,
        "totalCount": total,
        "statusCounts": by_status,
    }))
    .into_response()
}

fn unauthorized(message: String) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}
