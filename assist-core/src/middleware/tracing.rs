use axum::http::{HeaderName, HeaderValue};
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Ensure every request carries an `x-request-id`, minting one when the
/// caller did not supply it, and echo it on the response so clients can
/// correlate log lines.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = match req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| HeaderValue::from_str(s).ok())
    {
        Some(existing) => existing,
        None => {
            let minted = Uuid::new_v4().to_string();
            // A fresh UUID is always a valid header value.
            HeaderValue::from_str(&minted)
                .unwrap_or_else(|_| HeaderValue::from_static("invalid-request-id"))
        }
    };

    req.headers_mut()
        .insert(&REQUEST_ID_HEADER, request_id.clone());

    let mut response = next.run(req).await;
    response.headers_mut().insert(&REQUEST_ID_HEADER, request_id);
    response
}
