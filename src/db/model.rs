use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// One-way password digest, never the plaintext.
    pub password: String,
    pub email: String,
    pub sign_up_date: DateTime<Utc>,
}

/// A review as listed back to its author, joined with the movie title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub title: String,
    pub rating: i32,
    pub comment: String,
    pub review_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub movie_id: i64,
    pub title: String,
    pub added_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Timed out: {0}")]
    Timeout(String),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut => {
                DbError::Timeout("waiting for a database connection".to_string())
            }
            sqlx::Error::Database(db) if is_busy(db.as_ref()) => {
                DbError::Timeout("database is busy".to_string())
            }
            e => DbError::Sqlx(e),
        }
    }
}

// SQLITE_BUSY (5) and SQLITE_LOCKED (6); extended codes keep the primary
// code in the low byte.
fn is_busy(db: &dyn sqlx::error::DatabaseError) -> bool {
    db.code()
        .and_then(|c| c.parse::<u32>().ok())
        .map(|c| matches!(c & 0xff, 5 | 6))
        .unwrap_or(false)
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct StubDbError(&'static str);

    impl fmt::Display for StubDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "database is locked")
        }
    }

    impl StdError for StubDbError {}

    impl DatabaseError for StubDbError {
        fn message(&self) -> &str {
            "database is locked"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    #[test]
    fn pool_timeout_maps_to_timeout() {
        let err = DbError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DbError::Timeout(_)));
    }

    #[test]
    fn sqlite_busy_maps_to_timeout() {
        // Primary SQLITE_BUSY and the extended SQLITE_BUSY_SNAPSHOT (517).
        for code in ["5", "6", "517"] {
            let err = DbError::from(sqlx::Error::Database(Box::new(StubDbError(code))));
            assert!(matches!(err, DbError::Timeout(_)), "code {}", code);
        }
    }

    #[test]
    fn other_database_errors_stay_store_errors() {
        let err = DbError::from(sqlx::Error::Database(Box::new(StubDbError("1"))));
        assert!(matches!(err, DbError::Sqlx(_)));
    }
}
