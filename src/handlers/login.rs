use axum::{extract::State, response::IntoResponse, Json};

use crate::dtos::{LoginRequest, LoginResponse};
use crate::error::BridgeError;
use crate::services::metrics::record_login_outcome;
use crate::services::portal::{replay_cookie, LoginAttempt, LoginOutcome};
use crate::utils::hash_portal_password;
use crate::AppState;

/// Submit credentials to the portal over the tracked session.
///
/// Accepts either the pre-hashed credential or a plaintext password, which is
/// run through the portal's hash recipe here. Field checks happen before any
/// network call.
pub async fn submit_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, BridgeError> {
    if req.username.is_empty() {
        return Err(BridgeError::MissingField("username"));
    }
    if req.captcha.is_empty() {
        return Err(BridgeError::MissingField("captcha"));
    }

    let hashed_password = match (&req.hashed_password, &req.password) {
        (Some(hashed), _) if !hashed.is_empty() => hashed.clone(),
        (_, Some(password)) if !password.is_empty() => {
            hash_portal_password(password, &req.captcha)
        }
        _ => return Err(BridgeError::MissingField("hashedPassword")),
    };

    // An empty session id is the degraded captcha path: no token was ever
    // established, which is a session problem rather than a caller typo.
    if req.session_id.is_empty() {
        return Err(BridgeError::SessionMissing);
    }

    let replay = state
        .sessions
        .get(&req.session_id)
        .await
        .ok_or(BridgeError::SessionMissing)?;

    let attempt = LoginAttempt {
        username: req.username,
        hashed_password,
        captcha_answer: req.captcha,
        session_token: req.session_id,
    };

    let outcome = state.portal.submit_login(&attempt, &replay).await?;

    let response = match outcome {
        LoginOutcome::Success { session_token } => {
            // The post-login token supersedes the pre-login one; re-register
            // so result fetches replay the right cookie.
            state
                .sessions
                .put(&session_token, &replay_cookie(&session_token))
                .await;
            record_login_outcome("success");
            tracing::info!(username = %attempt.username, "portal login succeeded");
            LoginResponse {
                success: true,
                message: "Login successful".to_string(),
                session_id: Some(session_token),
            }
        }
        LoginOutcome::InvalidCaptcha => {
            record_login_outcome("invalid_captcha");
            LoginResponse {
                success: false,
                message: "Invalid captcha. Please try again.".to_string(),
                session_id: None,
            }
        }
        LoginOutcome::InvalidCredentials => {
            record_login_outcome("invalid_credentials");
            LoginResponse {
                success: false,
                message: "Invalid username or password.".to_string(),
                session_id: None,
            }
        }
        LoginOutcome::Failed => {
            record_login_outcome("failed");
            tracing::warn!(username = %attempt.username, "unrecognized portal login response");
            LoginResponse {
                success: false,
                message: "Login failed. Please try again.".to_string(),
                session_id: None,
            }
        }
    };

    Ok(Json(response))
}
