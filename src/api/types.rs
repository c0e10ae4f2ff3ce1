use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: i64,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub title: String,
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub image_url: Option<String>,
    pub in_wishlist: bool,
}

/// The `id` is the search provider's external id; the title is what the
/// wishlist is actually keyed on.
#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
}
