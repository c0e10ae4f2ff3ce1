use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiError;
use crate::db::DbError;
use crate::server::AppState;
use crate::service::ServiceError;

/// The authenticated user id, stashed in request extensions by
/// `auth_middleware` when a valid session token is presented.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or(ApiError::Unauthorized)
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(req.headers()) {
        // An unknown token just means no user; a store failure must not
        // be mistaken for one, or an outage logs everybody out.
        match state.service.session_user(&token).await {
            Ok(user_id) => {
                req.extensions_mut().insert(CurrentUser(user_id));
            }
            Err(ServiceError::Db(DbError::NotFound(_))) => {}
            Err(e) => return ApiError::Service(e).into_response(),
        }
    }

    next.run(req).await
}

pub fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    headers
        .get("X-Session-Token")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::db::{
        AccountRepo, DbResult, MovieRepo, Repository, ReviewEntry, ReviewRepo, Session,
        SessionRepo, SqliteRepository, User, WishlistItem, WishlistRepo,
    };
    use crate::metadata::{MovieSearch, SearchError, SearchResult};
    use crate::password::Sha256Hasher;
    use crate::server::{build_router, AppState};
    use crate::service::ReviewService;
    use crate::trivia::LocalTriviaGenerator;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(extract_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn session_token_header_is_a_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Session-Token", "tok".parse().unwrap());
        assert_eq!(extract_token(&headers), Some("tok".to_string()));
    }

    #[test]
    fn missing_token_is_none() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    /// Repository whose every operation fails as if the store were down.
    struct DownRepo;

    fn store_down() -> crate::db::DbError {
        crate::db::DbError::Sqlx(sqlx::Error::PoolClosed)
    }

    #[async_trait]
    impl AccountRepo for DownRepo {
        async fn create_user(&self, _: &str, _: &str, _: &str) -> DbResult<i64> {
            Err(store_down())
        }
        async fn get_user(&self, _: &str) -> DbResult<User> {
            Err(store_down())
        }
        async fn get_user_by_id(&self, _: i64) -> DbResult<User> {
            Err(store_down())
        }
    }

    #[async_trait]
    impl MovieRepo for DownRepo {
        async fn find_or_create_movie(&self, _: &str) -> DbResult<i64> {
            Err(store_down())
        }
        async fn get_movie_id(&self, _: &str) -> DbResult<i64> {
            Err(store_down())
        }
    }

    #[async_trait]
    impl ReviewRepo for DownRepo {
        async fn insert_review(&self, _: i64, _: i64, _: i32, _: &str) -> DbResult<i64> {
            Err(store_down())
        }
        async fn list_reviews(&self, _: i64) -> DbResult<Vec<ReviewEntry>> {
            Err(store_down())
        }
        async fn reviewed_titles(&self, _: i64) -> DbResult<Vec<String>> {
            Err(store_down())
        }
    }

    #[async_trait]
    impl WishlistRepo for DownRepo {
        async fn add_wishlist_entry(&self, _: i64, _: i64) -> DbResult<()> {
            Err(store_down())
        }
        async fn remove_wishlist_entry(&self, _: i64, _: i64) -> DbResult<()> {
            Err(store_down())
        }
        async fn list_wishlist(&self, _: i64) -> DbResult<Vec<WishlistItem>> {
            Err(store_down())
        }
    }

    #[async_trait]
    impl SessionRepo for DownRepo {
        async fn create_session(&self, _: &Session) -> DbResult<()> {
            Err(store_down())
        }
        async fn get_session(&self, _: &str) -> DbResult<Session> {
            Err(store_down())
        }
        async fn delete_session(&self, _: &str) -> DbResult<()> {
            Err(store_down())
        }
    }

    impl Repository for DownRepo {}

    struct NoopSearch;

    #[async_trait]
    impl MovieSearch for NoopSearch {
        async fn search(&self, _: &str) -> Result<Vec<SearchResult>, SearchError> {
            Ok(Vec::new())
        }
    }

    fn router_with_repo(repo: Arc<dyn Repository>) -> axum::Router {
        let service = Arc::new(ReviewService::new(
            repo,
            Arc::new(Sha256Hasher),
            Arc::new(LocalTriviaGenerator::new(5)),
        ));
        build_router(AppState::new(service, Arc::new(NoopSearch)))
    }

    #[tokio::test]
    async fn store_outage_during_session_lookup_is_not_unauthorized() {
        let app = router_with_repo(Arc::new(DownRepo));

        let response = app
            .oneshot(
                Request::get("/api/profile")
                    .header("Authorization", "Bearer sometoken")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_token_stays_anonymous() {
        let repo = Arc::new(SqliteRepository::in_memory().await.unwrap());
        let app = router_with_repo(repo);

        let response = app
            .oneshot(
                Request::get("/api/profile")
                    .header("Authorization", "Bearer bogus")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
