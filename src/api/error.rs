use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;
use crate::metadata::SearchError;
use crate::service::ServiceError;

/// HTTP-facing error: typed service failures become status codes with a
/// small JSON body; unexpected store errors are logged and answered with
/// a generic message.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Service(ServiceError),
    Search(SearchError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": "User not logged in"
                }),
            ),
            Self::Service(ServiceError::Invalid(msg)) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "invalid_input",
                    "message": msg
                }),
            ),
            Self::Service(ServiceError::Db(DbError::Conflict(msg))) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": msg
                }),
            ),
            Self::Service(ServiceError::Db(DbError::NotFound(msg))) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": msg
                }),
            ),
            Self::Service(ServiceError::Db(DbError::Timeout(msg))) => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({
                    "error": "timeout",
                    "message": format!("Timed out: {}", msg)
                }),
            ),
            Self::Service(e) => {
                tracing::error!("Service error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Search(e) => {
                tracing::error!("Metadata search error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": "metadata_unavailable",
                        "message": "movie search is currently unavailable"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_maps_to_409() {
        let err = ApiError::Service(ServiceError::Db(DbError::Conflict("dup".into())));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::Service(ServiceError::Db(DbError::NotFound("gone".into())));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_maps_to_400() {
        let err = ApiError::Service(ServiceError::Invalid("bad rating".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timeout_maps_to_504() {
        let err = ApiError::Service(ServiceError::Db(DbError::Timeout("database is busy".into())));
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn unexpected_store_errors_map_to_500() {
        let err = ApiError::Service(ServiceError::Db(DbError::Sqlx(sqlx::Error::PoolClosed)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
