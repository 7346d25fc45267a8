use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header the functions platform uses to identify one invocation
pub const INVOCATION_ID_HEADER: &str = "fn-invoke-id";

/// Run the request inside a span tagged with its invocation id and echo the
/// id back in the response headers.
pub async fn invocation_id_middleware(request: Request, next: Next) -> Response {
    let invocation_id = request
        .headers()
        .get(INVOCATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        invocation_id = %invocation_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&invocation_id) {
        response.headers_mut().insert(INVOCATION_ID_HEADER, value);
    }
    response
}
