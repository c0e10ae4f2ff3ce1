use async_trait::async_trait;

use super::model::*;

#[async_trait]
pub trait AccountRepo: Send + Sync {
    /// Inserts a new user and returns the generated id.
    /// A duplicate username fails with `DbError::Conflict`.
    async fn create_user(&self, username: &str, password: &str, email: &str) -> DbResult<i64>;
    async fn get_user(&self, username: &str) -> DbResult<User>;
    async fn get_user_by_id(&self, id: i64) -> DbResult<User>;
}

#[async_trait]
pub trait MovieRepo: Send + Sync {
    /// Resolves a title to a movie id, inserting the row if absent.
    /// Idempotent under concurrent callers: the UNIQUE(title) constraint
    /// guarantees at most one row and the loser re-selects the winner's id.
    async fn find_or_create_movie(&self, title: &str) -> DbResult<i64>;
    async fn get_movie_id(&self, title: &str) -> DbResult<i64>;
}

#[async_trait]
pub trait ReviewRepo: Send + Sync {
    async fn insert_review(
        &self,
        user_id: i64,
        movie_id: i64,
        rating: i32,
        comment: &str,
    ) -> DbResult<i64>;
    async fn list_reviews(&self, user_id: i64) -> DbResult<Vec<ReviewEntry>>;
    /// Distinct titles the user has reviewed, for the trivia generator.
    async fn reviewed_titles(&self, user_id: i64) -> DbResult<Vec<String>>;
}

#[async_trait]
pub trait WishlistRepo: Send + Sync {
    /// A duplicate (user, movie) pair fails with `DbError::Conflict`.
    async fn add_wishlist_entry(&self, user_id: i64, movie_id: i64) -> DbResult<()>;
    /// Deleting an absent entry is a no-op success.
    async fn remove_wishlist_entry(&self, user_id: i64, movie_id: i64) -> DbResult<()>;
    async fn list_wishlist(&self, user_id: i64) -> DbResult<Vec<WishlistItem>>;
}

#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn create_session(&self, session: &Session) -> DbResult<()>;
    async fn get_session(&self, token: &str) -> DbResult<Session>;
    async fn delete_session(&self, token: &str) -> DbResult<()>;
}

pub trait Repository:
    AccountRepo + MovieRepo + ReviewRepo + WishlistRepo + SessionRepo + Send + Sync
{
}
