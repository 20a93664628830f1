//! Request ID middleware.
//!
//! Every request carries an id that shows up in the trace span, in Sentry
//! events and in the `x-request-id` response header, so a customer's
//! "something went wrong" can be matched to the log line.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id that is passed through unchanged.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that ensures every request has a request ID.
///
/// A well-formed `x-request-id` from the reverse proxy is reused; anything
/// missing, oversized or not plain ASCII is replaced with a UUID v4.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = upstream_request_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn upstream_request_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request_with(id: &str) -> Request {
        Request::builder()
            .header(REQUEST_ID_HEADER, id)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_upstream_id_is_reused() {
        assert_eq!(
            upstream_request_id(&request_with("abc-123")).as_deref(),
            Some("abc-123")
        );
    }

    #[test]
    fn test_oversized_upstream_id_is_ignored() {
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        assert_eq!(upstream_request_id(&request_with(&long)), None);
    }

    #[test]
    fn test_missing_upstream_id() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(upstream_request_id(&request), None);
    }
}
