use axum::{extract::State, response::IntoResponse, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::dtos::CaptchaResponse;
use crate::error::BridgeError;
use crate::AppState;

/// Fetch a fresh captcha challenge from the portal and register the session
/// cookie minted alongside it.
pub async fn fetch_captcha(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BridgeError> {
    // Opportunistic cleanup; cheap enough to run on every challenge.
    state.sessions.sweep().await;

    let challenge = state.portal.fetch_captcha().await?;

    let session_id = match challenge.session {
        Some(minted) => {
            state.sessions.put(&minted.token, &minted.replay_cookie).await;
            tracing::debug!(token = %minted.token, "portal session registered");
            minted.token
        }
        // Degraded mode: the caller still gets the image, but a login with an
        // empty session id will fail before reaching the portal.
        None => String::new(),
    };

    Ok(Json(CaptchaResponse {
        success: true,
        captcha_image: format!("data:image/png;base64,{}", STANDARD.encode(&challenge.image)),
        session_id,
    }))
}
