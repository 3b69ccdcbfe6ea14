//! Bearer-token request guard.
//!
//! Stateless: the expected header value is captured at instance
//! construction, so a token rotation takes effect only after the
//! supervisor rebuilds the instance. In-flight connections on the old
//! instance keep the old token until they drain.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

/// Pure check: does the provided `Authorization` header match the expected
/// literal `Bearer <token>` form?
///
/// Absent header means unauthorized. Comparison is exact string equality;
/// no confidentiality guarantee is claimed beyond keeping tokens out of
/// logs.
#[must_use]
pub fn authorized(provided: Option<&str>, expected_header: &str) -> bool {
    provided == Some(expected_header)
}

/// Middleware: validate the bearer token, or answer 401 with an empty body.
///
/// `expected` holds the full pre-formatted "Bearer <token>" string so the
/// hot path is a single comparison without allocation. No handler work
/// happens on failure.
pub(crate) async fn validate_bearer(
    expected: Arc<str>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if authorized(provided, expected.as_ref()) {
        return Ok(next.run(req).await);
    }

    tracing::warn!(
        path = %req.uri().path(),
        "Unauthorized API request - missing or invalid token"
    );
    let mut res = Response::new(axum::body::Body::empty());
    *res.status_mut() = StatusCode::UNAUTHORIZED;
    res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        header::HeaderValue::from_static("Bearer"),
    );
    Ok(res)
}
