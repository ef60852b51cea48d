//! HTTP client for the examination portal.
//!
//! Talks to three upstream endpoints: the captcha servlet, the login form
//! handler, and the results search. Redirects are never auto-followed (the
//! login redirect target is itself the success signal) and every call carries
//! an explicit timeout. Responses are read as status + text and handed to
//! [`crate::services::classify`]; transport failures are mapped to the bridge
//! taxonomy before they leave this module.

use crate::config::PortalConfig;
use crate::error::BridgeError;
use crate::services::classify::{classify_login, classify_results, LoginClass, ResultsClass};
use anyhow::anyhow;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, redirect, Client};
use std::time::Duration;

static SESSION_COOKIE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"JSESSIONID=([^;]+)").expect("valid session cookie pattern"));

#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    config: PortalConfig,
}

/// A freshly fetched captcha challenge.
pub struct CaptchaChallenge {
    pub image: Vec<u8>,
    /// Absent when the portal issued no recognizable session cookie.
    pub session: Option<MintedSession>,
}

pub struct MintedSession {
    pub token: String,
    pub replay_cookie: String,
}

/// One login submission. All fields must be non-empty before this is built.
#[derive(Debug)]
pub struct LoginAttempt {
    pub username: String,
    pub hashed_password: String,
    pub captcha_answer: String,
    pub session_token: String,
}

#[derive(Debug)]
pub enum LoginOutcome {
    /// Logged in. `session_token` is the most recent token: the rotated one
    /// when the portal issued a fresh cookie, otherwise the pre-login token.
    Success { session_token: String },
    InvalidCaptcha,
    InvalidCredentials,
    Failed,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch a one-time captcha image and the session cookie minted with it.
    pub async fn fetch_captcha(&self) -> Result<CaptchaChallenge, BridgeError> {
        // Cache-busting query; the servlet serves a stale image otherwise.
        let url = format!(
            "{}/CaptchaServlet?{}",
            self.config.base_url,
            Utc::now().timestamp_millis()
        );

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "captcha fetch rejected by portal");
            return Err(BridgeError::UpstreamUnavailable(anyhow!(
                "portal returned {status} for captcha"
            )));
        }

        let session = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|raw| {
                extract_session_token(raw).map(|token| MintedSession {
                    replay_cookie: replay_cookie(&token),
                    token,
                })
            });

        if session.is_none() {
            tracing::warn!("captcha response carried no session cookie");
        }

        let image = response
            .bytes()
            .await
            .map_err(map_transport_error)?
            .to_vec();

        Ok(CaptchaChallenge { image, session })
    }

    /// Replay the tracked session to submit hashed credentials.
    pub async fn submit_login(
        &self,
        attempt: &LoginAttempt,
        replay_cookie_value: &str,
    ) -> Result<LoginOutcome, BridgeError> {
        let url = format!("{}/Login", self.config.base_url);
        let form = [
            ("username", attempt.username.as_str()),
            ("passwd", attempt.hashed_password.as_str()),
            ("captcha", attempt.captcha_answer.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .header(header::COOKIE, replay_cookie_value)
            .header(header::USER_AGENT, &self.config.user_agent)
            .form(&form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        // The portal may rotate the session cookie post-login.
        let rotated_token = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(extract_session_token);

        let body = response.text().await.map_err(map_transport_error)?;
        tracing::debug!(
            %status,
            location = location.as_deref().unwrap_or("-"),
            rotated = rotated_token.is_some(),
            "portal login response"
        );

        let outcome = match classify_login(status, location.as_deref(), &body) {
            LoginClass::Success => LoginOutcome::Success {
                session_token: rotated_token.unwrap_or_else(|| attempt.session_token.clone()),
            },
            LoginClass::InvalidCaptcha => LoginOutcome::InvalidCaptcha,
            LoginClass::InvalidCredentials => LoginOutcome::InvalidCredentials,
            LoginClass::Failed => LoginOutcome::Failed,
        };

        Ok(outcome)
    }

    /// Fetch raw result records for one semester (`100` = all semesters).
    pub async fn fetch_results(
        &self,
        replay_cookie_value: &str,
        semester: &str,
    ) -> Result<ResultsClass, BridgeError> {
        let url = format!("{}/StudentSearchProcess", self.config.base_url);
        let referer = format!("{}/student/studenthome.jsp", self.config.base_url);

        // The portal distinguishes browser from programmatic clients via
        // headers and blocks the latter.
        let response = self
            .client
            .get(&url)
            .query(&[("flag", "2"), ("euno", semester)])
            .header(header::COOKIE, replay_cookie_value)
            .header(header::USER_AGENT, &self.config.user_agent)
            .header(header::ACCEPT, "application/json, text/plain, */*")
            .header(header::REFERER, referer)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        // Never trust the declared content type; read text and classify.
        let body = response.text().await.map_err(map_transport_error)?;
        tracing::debug!(%status, bytes = body.len(), "portal results response");

        Ok(classify_results(status, &body))
    }
}

/// Cookie value replayed on requests for the given session token.
pub fn replay_cookie(token: &str) -> String {
    format!("JSESSIONID={token}")
}

fn extract_session_token(raw_cookie: &str) -> Option<String> {
    SESSION_COOKIE_RE
        .captures(raw_cookie)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_owned())
}

fn map_transport_error(err: reqwest::Error) -> BridgeError {
    if err.is_timeout() {
        BridgeError::UpstreamTimeout
    } else {
        BridgeError::UpstreamUnavailable(err.into())
    }
}
