use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use super::auth::{extract_token, CurrentUser};
use super::error::ApiError;
use super::types::*;
use crate::db::{ReviewEntry, WishlistItem};
use crate::server::AppState;
use crate::service::UserProfile;
use crate::trivia::TriviaQuestion;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let user_id = state
        .service
        .create_account(&req.username, &req.password, &req.email)
        .await?;
    let session = state.service.open_session(user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user_id,
            token: session.token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user_id = state.service.authenticate(&req.username, &req.password).await?;
    let session = state.service.open_session(user_id).await?;

    Ok(Json(SessionResponse {
        user_id,
        token: session.token,
    }))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    if let Some(token) = extract_token(&headers) {
        state.service.close_session(&token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.service.user_profile(user.0).await?))
}

pub async fn submit_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ReviewRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .submit_review(user.0, &req.title, req.rating, &req.comment)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn list_reviews(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<ReviewEntry>>, ApiError> {
    Ok(Json(state.service.list_reviews(user.0).await?))
}

pub async fn search(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    let query = match params.query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => return Ok(Json(Vec::new())),
    };

    // Flag results already on the caller's wishlist, keyed by title like
    // everything else on the wishlist path.
    let wishlist_titles: Vec<String> = match user {
        Some(user) => state
            .service
            .list_wishlist(user.0)
            .await?
            .into_iter()
            .map(|item| item.title)
            .collect(),
        None => Vec::new(),
    };

    let results = state.search.search(&query).await?;

    Ok(Json(
        results
            .into_iter()
            .map(|r| SearchResultResponse {
                in_wishlist: wishlist_titles.contains(&r.title),
                id: r.external_id,
                title: r.title,
                year: r.year,
                image_url: r.image_url,
            })
            .collect(),
    ))
}

pub async fn list_wishlist(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<WishlistItem>>, ApiError> {
    Ok(Json(state.service.list_wishlist(user.0).await?))
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<WishlistRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .service
        .add_to_wishlist(user.0, req.id.as_deref(), &req.title)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<WishlistRequest>,
) -> Result<StatusCode, ApiError> {
    state.service.remove_from_wishlist(user.0, &req.title).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn trivia(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<TriviaQuestion>>, ApiError> {
    Ok(Json(state.service.request_trivia(user.0).await?))
}
