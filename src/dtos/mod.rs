use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaResponse {
    pub success: bool,
    /// `data:image/png;base64,...` payload ready for an `<img>` src.
    pub captcha_image: String,
    /// Empty when the portal issued no session cookie (degraded mode).
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    /// Pre-hashed credential: base64(SHA-256(password || captcha)).
    pub hashed_password: Option<String>,
    /// Plaintext alternative; the bridge hashes it with the captcha answer.
    pub password: Option<String>,
    #[serde(default)]
    pub captcha: String,
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    /// Most recent session token; supersedes the one the caller sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub session_id: Option<String>,
    pub semester: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
