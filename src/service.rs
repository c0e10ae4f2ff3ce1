use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::db::{DbError, Repository, ReviewEntry, Session, WishlistItem};
use crate::password::{PasswordError, PasswordHasher};
use crate::trivia::{TriviaError, TriviaGenerator, TriviaQuestion};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Trivia(#[from] TriviaError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub sign_up_date: DateTime<Utc>,
}

/// Account, review and wishlist operations over the injected repository.
/// Request handlers call this directly; it owns validation, password
/// hashing and the hand-off to the trivia generator.
pub struct ReviewService {
    repo: Arc<dyn Repository>,
    hasher: Arc<dyn PasswordHasher>,
    trivia: Arc<dyn TriviaGenerator>,
}

fn require(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl ReviewService {
    pub fn new(
        repo: Arc<dyn Repository>,
        hasher: Arc<dyn PasswordHasher>,
        trivia: Arc<dyn TriviaGenerator>,
    ) -> Self {
        Self { repo, hasher, trivia }
    }

    /// Registers a new account and returns its id. A taken username
    /// surfaces as `DbError::Conflict`.
    pub async fn create_account(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> ServiceResult<i64> {
        require("username", username)?;
        require("password", password)?;
        require("email", email)?;

        let hashed = self.hasher.hash(password)?;
        let id = self.repo.create_user(username, &hashed, email).await?;
        Ok(id)
    }

    /// Returns the user id on a username/password match. Unknown users and
    /// wrong passwords are the same NotFound, so callers cannot probe for
    /// which usernames exist.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<i64> {
        let user = self.repo.get_user(username).await.map_err(|e| match e {
            DbError::NotFound(_) => bad_credentials(),
            e => e.into(),
        })?;

        if !self.hasher.verify(password, &user.password) {
            return Err(bad_credentials());
        }

        Ok(user.id)
    }

    pub async fn user_profile(&self, user_id: i64) -> ServiceResult<UserProfile> {
        let user = self.repo.get_user_by_id(user_id).await?;
        Ok(UserProfile {
            username: user.username,
            email: user.email,
            sign_up_date: user.sign_up_date,
        })
    }

    pub async fn submit_review(
        &self,
        user_id: i64,
        title: &str,
        rating: i32,
        comment: &str,
    ) -> ServiceResult<()> {
        require("title", title)?;
        if !(0..=10).contains(&rating) {
            return Err(ServiceError::Invalid(format!(
                "rating must be between 0 and 10, got {}",
                rating
            )));
        }

        let movie_id = self.repo.find_or_create_movie(title).await?;
        self.repo.insert_review(user_id, movie_id, rating, comment).await?;
        Ok(())
    }

    pub async fn list_reviews(&self, user_id: i64) -> ServiceResult<Vec<ReviewEntry>> {
        Ok(self.repo.list_reviews(user_id).await?)
    }

    /// The external id from the search provider is accepted but the title
    /// is authoritative: the movie row is resolved or created by title.
    pub async fn add_to_wishlist(
        &self,
        user_id: i64,
        external_id: Option<&str>,
        title: &str,
    ) -> ServiceResult<()> {
        require("title", title)?;
        if let Some(external_id) = external_id {
            debug!(external_id, title, "resolving wishlist add by title");
        }

        let movie_id = self.repo.find_or_create_movie(title).await?;
        self.repo.add_wishlist_entry(user_id, movie_id).await?;
        Ok(())
    }

    /// Unknown titles are NotFound; removing an entry that is already gone
    /// is a no-op success.
    pub async fn remove_from_wishlist(&self, user_id: i64, title: &str) -> ServiceResult<()> {
        let movie_id = self.repo.get_movie_id(title).await?;
        self.repo.remove_wishlist_entry(user_id, movie_id).await?;
        Ok(())
    }

    pub async fn list_wishlist(&self, user_id: i64) -> ServiceResult<Vec<WishlistItem>> {
        Ok(self.repo.list_wishlist(user_id).await?)
    }

    /// Hands the user's reviewed titles to the trivia generator and returns
    /// its questions unchanged. A user with no reviews hands over an empty
    /// list; what that yields is the generator's business.
    pub async fn request_trivia(&self, user_id: i64) -> ServiceResult<Vec<TriviaQuestion>> {
        let titles = self.repo.reviewed_titles(user_id).await?;
        Ok(self.trivia.generate(&titles).await?)
    }

    pub async fn open_session(&self, user_id: i64) -> ServiceResult<Session> {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id,
            created: Utc::now(),
        };
        self.repo.create_session(&session).await?;
        Ok(session)
    }

    pub async fn session_user(&self, token: &str) -> ServiceResult<i64> {
        let session = self.repo.get_session(token).await?;
        Ok(session.user_id)
    }

    pub async fn close_session(&self, token: &str) -> ServiceResult<()> {
        self.repo.delete_session(token).await?;
        Ok(())
    }
}

fn bad_credentials() -> ServiceError {
    ServiceError::Db(DbError::NotFound(
        "Account doesn't exist or info is wrong".to_string(),
    ))
}
