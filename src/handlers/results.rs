use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::dtos::{ResultsQuery, ResultsResponse};
use crate::error::BridgeError;
use crate::services::classify::ResultsClass;
use crate::services::metrics::record_result_fetch;
use crate::AppState;

/// Sentinel semester selector meaning "all semesters".
const ALL_SEMESTERS: &str = "100";

/// Fetch raw result records over an authenticated session. The records pass
/// through unmodified; grade computation happens downstream.
pub async fn fetch_results(
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> Result<impl IntoResponse, BridgeError> {
    let session_id = query
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or(BridgeError::SessionMissing)?;
    let semester = query
        .semester
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ALL_SEMESTERS.to_string());

    // Local liveness check; the portal remains the authority and may still
    // reject the replayed cookie below.
    let replay = state
        .sessions
        .get(&session_id)
        .await
        .ok_or(BridgeError::SessionExpired)?;

    let class = state.portal.fetch_results(&replay, &semester).await?;

    match class {
        ResultsClass::Records(records) if records.is_empty() => {
            record_result_fetch("empty");
            Ok(Json(ResultsResponse {
                success: true,
                results: Some(Vec::new()),
                message: Some("No results found".to_string()),
            }))
        }
        ResultsClass::Records(records) => {
            record_result_fetch("success");
            tracing::debug!(count = records.len(), %semester, "result records fetched");
            Ok(Json(ResultsResponse {
                success: true,
                results: Some(records),
                message: None,
            }))
        }
        ResultsClass::SessionExpired => {
            record_result_fetch("session_expired");
            Err(BridgeError::SessionExpired)
        }
        ResultsClass::Unparseable => {
            record_result_fetch("invalid_response");
            Err(BridgeError::InvalidUpstreamResponse)
        }
        ResultsClass::UpstreamError(status) => {
            record_result_fetch("upstream_error");
            Err(BridgeError::UpstreamUnavailable(anyhow::anyhow!(
                "portal returned {status} for results"
            )))
        }
    }
}
