//! Problem Details assertions for HTTP-level tests.
//!
//! Mirrors the backend's RFC 7807 body without depending on backend types, so
//! integration tests assert against the wire contract rather than Rust enums.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use serde::Deserialize;

/// Wire shape of an error body.
#[derive(Debug, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Read an error response, check the status and the trace id header parity,
/// and hand back the parsed problem for further assertions.
pub async fn read_problem(resp: ServiceResponse<BoxBody>, expected_status: StatusCode) -> Problem {
    assert_eq!(resp.status(), expected_status, "unexpected status");

    let header_trace_id = resp
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("x-trace-id header should be present on error responses");

    let body = actix_web::test::read_body(resp).await;
    let problem: Problem =
        serde_json::from_slice(&body).expect("error body should be Problem Details JSON");

    assert_eq!(problem.status, expected_status.as_u16());
    assert_eq!(
        problem.trace_id, header_trace_id,
        "trace_id in body should match x-trace-id header"
    );
    problem
}

/// Assert status and error code in one call.
pub async fn assert_problem(
    resp: ServiceResponse<BoxBody>,
    expected_status: StatusCode,
    expected_code: &str,
) -> Problem {
    let problem = read_problem(resp, expected_status).await;
    assert_eq!(problem.code, expected_code, "detail: {}", problem.detail);
    problem
}
