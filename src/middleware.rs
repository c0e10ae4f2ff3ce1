use axum::{extract::Request, middleware::Next, response::Response};
use tracing::info;

pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    let status = response.status().as_u16();

    info!(
        method = %method,
        url = %uri,
        status = status,
        "HTTP request"
    );

    response
}
