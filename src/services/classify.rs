//! Response classification for the undocumented portal endpoints.
//!
//! The portal has no response contract; outcomes are recognized by sniffing
//! redirect targets and body fragments. The rules live here as an explicit,
//! ordered list so a marker change upstream is a one-line fix with an
//! existing failing test. Unrecognized responses always degrade to the
//! generic case instead of erroring.

use reqwest::StatusCode;

/// Redirect target / body fragment marking a logged-in student session.
pub const STUDENT_HOME_MARKER: &str = "studenthome";

/// Body fragment the portal emits when the captcha answer was wrong.
pub const CAPTCHA_FAILURE_MARKER: &str = "Captcha validation fails";

/// Body fragments the portal emits for rejected credentials.
pub const INVALID_CREDENTIAL_MARKERS: [&str; 2] = ["Invalid", "incorrect"];

/// Body fragments identifying the portal's login page, served (sometimes with
/// status 200) when a session is no longer valid.
pub const LOGIN_PAGE_MARKERS: [&str; 2] = ["StudentLogin.jsp", "login.jsp"];

const FORM_TAG_MARKER: &str = "<form";
const PASSWORD_FIELD_MARKER: &str = "password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginClass {
    Success,
    InvalidCaptcha,
    InvalidCredentials,
    /// Upstream behavior not recognized.
    Failed,
}

/// Classify a login response. Rules apply in priority order: the success
/// signals win over any error marker that happens to appear in the body.
pub fn classify_login(status: StatusCode, location: Option<&str>, body: &str) -> LoginClass {
    if location.is_some_and(|l| l.contains(STUDENT_HOME_MARKER))
        || status == StatusCode::FOUND
        || body.contains(STUDENT_HOME_MARKER)
    {
        return LoginClass::Success;
    }

    if body.contains(CAPTCHA_FAILURE_MARKER) {
        return LoginClass::InvalidCaptcha;
    }

    if INVALID_CREDENTIAL_MARKERS.iter().any(|m| body.contains(m)) {
        return LoginClass::InvalidCredentials;
    }

    LoginClass::Failed
}

#[derive(Debug)]
pub enum ResultsClass {
    /// Parsed records, possibly empty. A non-array JSON body also lands here
    /// as zero records, matching the portal's "nothing published" shape.
    Records(Vec<serde_json::Value>),
    SessionExpired,
    /// Body did not parse as JSON; most often a login page in an unexpected
    /// shape, so callers treat this as session-expiry-adjacent.
    Unparseable,
    UpstreamError(StatusCode),
}

/// Classify a results response. The login-page check runs before the status
/// check because the portal sometimes serves its login page with status 200.
pub fn classify_results(status: StatusCode, body: &str) -> ResultsClass {
    let looks_like_login_page = status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || LOGIN_PAGE_MARKERS.iter().any(|m| body.contains(m))
        || (body.contains(FORM_TAG_MARKER) && body.contains(PASSWORD_FIELD_MARKER));

    if looks_like_login_page {
        return ResultsClass::SessionExpired;
    }

    if !status.is_success() {
        return ResultsClass::UpstreamError(status);
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Array(records)) => ResultsClass::Records(records),
        Ok(_) => ResultsClass::Records(Vec::new()),
        Err(_) => ResultsClass::Unparseable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_redirect_location_wins() {
        let class = classify_login(
            StatusCode::OK,
            Some("/web/student/studenthome.jsp"),
            "ignored",
        );
        assert_eq!(class, LoginClass::Success);
    }

    #[test]
    fn login_status_302_wins() {
        assert_eq!(
            classify_login(StatusCode::FOUND, None, ""),
            LoginClass::Success
        );
    }

    #[test]
    fn login_body_marker_wins_regardless_of_status() {
        let body = "<html>redirecting to studenthome.jsp</html>";
        assert_eq!(
            classify_login(StatusCode::OK, None, body),
            LoginClass::Success
        );
    }

    #[test]
    fn login_success_outranks_error_markers_in_same_body() {
        let body = "studenthome ... Invalid session warning";
        assert_eq!(
            classify_login(StatusCode::OK, None, body),
            LoginClass::Success
        );
    }

    #[test]
    fn login_captcha_marker_outranks_credential_markers() {
        let body = "Captcha validation fails: Invalid input";
        assert_eq!(
            classify_login(StatusCode::OK, None, body),
            LoginClass::InvalidCaptcha
        );
    }

    #[test]
    fn login_credential_markers() {
        assert_eq!(
            classify_login(StatusCode::OK, None, "Invalid username or password"),
            LoginClass::InvalidCredentials
        );
        assert_eq!(
            classify_login(StatusCode::OK, None, "username or password is incorrect"),
            LoginClass::InvalidCredentials
        );
    }

    #[test]
    fn login_unrecognized_body_degrades_to_failed() {
        assert_eq!(
            classify_login(StatusCode::OK, None, "<html>something else</html>"),
            LoginClass::Failed
        );
    }

    #[test]
    fn results_auth_status_is_session_expired() {
        assert!(matches!(
            classify_results(StatusCode::UNAUTHORIZED, "[]"),
            ResultsClass::SessionExpired
        ));
        assert!(matches!(
            classify_results(StatusCode::FORBIDDEN, "[]"),
            ResultsClass::SessionExpired
        ));
    }

    #[test]
    fn results_login_page_body_with_200_is_session_expired() {
        let body = "<html><a href=\"StudentLogin.jsp\">login</a></html>";
        assert!(matches!(
            classify_results(StatusCode::OK, body),
            ResultsClass::SessionExpired
        ));
    }

    #[test]
    fn results_password_form_is_session_expired() {
        let body = "<html><form method=\"post\"><input type=\"password\"></form></html>";
        assert!(matches!(
            classify_results(StatusCode::OK, body),
            ResultsClass::SessionExpired
        ));
    }

    #[test]
    fn results_form_without_password_field_is_not_expired() {
        let body = "<form action=\"/search\"><input type=\"text\"></form>";
        assert!(matches!(
            classify_results(StatusCode::OK, body),
            ResultsClass::Unparseable
        ));
    }

    #[test]
    fn results_non_success_status_is_upstream_error() {
        assert!(matches!(
            classify_results(StatusCode::INTERNAL_SERVER_ERROR, ""),
            ResultsClass::UpstreamError(StatusCode::INTERNAL_SERVER_ERROR)
        ));
    }

    #[test]
    fn results_empty_array_is_zero_records() {
        match classify_results(StatusCode::OK, "[]") {
            ResultsClass::Records(records) => assert!(records.is_empty()),
            other => panic!("unexpected class: {:?}", other),
        }
    }

    #[test]
    fn results_non_array_json_is_zero_records() {
        match classify_results(StatusCode::OK, "{\"notice\": \"none\"}") {
            ResultsClass::Records(records) => assert!(records.is_empty()),
            other => panic!("unexpected class: {:?}", other),
        }
    }

    #[test]
    fn results_records_pass_through() {
        let body = r#"[{"subject": "CS101", "marks": 87}]"#;
        match classify_results(StatusCode::OK, body) {
            ResultsClass::Records(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0]["subject"], "CS101");
            }
            other => panic!("unexpected class: {:?}", other),
        }
    }

    #[test]
    fn results_unparseable_body() {
        assert!(matches!(
            classify_results(StatusCode::OK, "this is not json"),
            ResultsClass::Unparseable
        ));
    }
}
