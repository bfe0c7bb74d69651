//! Request counting middleware.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::infrastructure::metrics::HTTP_REQUEST_TOTAL;

/// Label used for requests that matched no route.
const UNMATCHED: &str = "unmatched";

/// Counts every request by method, route template and response status.
///
/// The `endpoint` label is the matched route (`/{code}`), never the raw path,
/// so label cardinality stays bounded.
pub async fn track(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED.to_owned());

    let response = next.run(request).await;

    metrics::counter!(
        HTTP_REQUEST_TOTAL,
        "method" => method,
        "endpoint" => endpoint,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    response
}
