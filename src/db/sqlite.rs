use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{error, info};

use super::model::*;
use super::repo::*;

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(db_path: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(db_path)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        let repo = Self { pool };

        // Schema apply failures are logged and swallowed; only a store
        // that cannot be opened at all aborts startup.
        if let Err(e) = repo.init_schema().await {
            error!("Error during database initialization: {}", e);
        }

        info!("Database initialized at {}", db_path);

        Ok(repo)
    }

    /// Single-connection in-memory store. Used by tests and demos; a pooled
    /// `sqlite::memory:` handle would open one empty database per connection.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.init_schema().await?;

        Ok(repo)
    }

    async fn init_schema(&self) -> DbResult<()> {
        let schema = include_str!("schema.sql");
        sqlx::query(schema).execute(&self.pool).await?;
        Ok(())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

fn parse_date(s: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Sqlx(sqlx::Error::Decode(Box::new(e))))
}

#[async_trait]
impl AccountRepo for SqliteRepository {
    async fn create_user(&self, username: &str, password: &str, email: &str) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO users (username, password, email, sign_up_date) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(password)
        .bind(email)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict(format!("Username already taken: {}", username))
            } else {
                e.into()
            }
        })?;

        Ok(result.last_insert_rowid())
    }

    async fn get_user(&self, username: &str) -> DbResult<User> {
        let result = sqlx::query_as::<_, (i64, String, String, String, String)>(
            "SELECT id, username, password, email, sign_up_date FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound(format!("User not found: {}", username)),
            _ => e.into(),
        })?;

        Ok(User {
            id: result.0,
            username: result.1,
            password: result.2,
            email: result.3,
            sign_up_date: parse_date(&result.4)?,
        })
    }

    async fn get_user_by_id(&self, id: i64) -> DbResult<User> {
        let result = sqlx::query_as::<_, (i64, String, String, String, String)>(
            "SELECT id, username, password, email, sign_up_date FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound(format!("User not found: {}", id)),
            _ => e.into(),
        })?;

        Ok(User {
            id: result.0,
            username: result.1,
            password: result.2,
            email: result.3,
            sign_up_date: parse_date(&result.4)?,
        })
    }
}

#[async_trait]
impl MovieRepo for SqliteRepository {
    async fn find_or_create_movie(&self, title: &str) -> DbResult<i64> {
        // Conflict-as-success: if another caller inserted the title first,
        // rows_affected is 0 and the existing id is re-selected.
        let result = sqlx::query("INSERT INTO movies (title) VALUES (?) ON CONFLICT(title) DO NOTHING")
            .bind(title)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(result.last_insert_rowid());
        }

        self.get_movie_id(title).await
    }

    async fn get_movie_id(&self, title: &str) -> DbResult<i64> {
        let result = sqlx::query_as::<_, (i64,)>("SELECT id FROM movies WHERE title = ?")
            .bind(title)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => DbError::NotFound(format!("Movie not found: {}", title)),
                _ => e.into(),
            })?;

        Ok(result.0)
    }
}

#[async_trait]
impl ReviewRepo for SqliteRepository {
    async fn insert_review(
        &self,
        user_id: i64,
        movie_id: i64,
        rating: i32,
        comment: &str,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO reviews (user_id, movie_id, rating, comment, review_date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(rating)
        .bind(comment)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list_reviews(&self, user_id: i64) -> DbResult<Vec<ReviewEntry>> {
        let results = sqlx::query_as::<_, (String, i32, String, String)>(
            "SELECT m.title, r.rating, r.comment, r.review_date
             FROM reviews r
             JOIN movies m ON r.movie_id = m.id
             WHERE r.user_id = ?
             ORDER BY r.review_date, r.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut reviews = Vec::with_capacity(results.len());
        for r in results {
            reviews.push(ReviewEntry {
                title: r.0,
                rating: r.1,
                comment: r.2,
                review_date: parse_date(&r.3)?,
            });
        }

        Ok(reviews)
    }

    async fn reviewed_titles(&self, user_id: i64) -> DbResult<Vec<String>> {
        let results = sqlx::query_as::<_, (String,)>(
            "SELECT DISTINCT m.title
             FROM reviews r
             JOIN movies m ON r.movie_id = m.id
             WHERE r.user_id = ?
             ORDER BY m.title",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results.into_iter().map(|r| r.0).collect())
    }
}

#[async_trait]
impl WishlistRepo for SqliteRepository {
    async fn add_wishlist_entry(&self, user_id: i64, movie_id: i64) -> DbResult<()> {
        sqlx::query("INSERT INTO wishlist (user_id, movie_id, added_date) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(movie_id)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::Conflict(format!("Movie {} already on wishlist", movie_id))
                } else {
                    e.into()
                }
            })?;

        Ok(())
    }

    async fn remove_wishlist_entry(&self, user_id: i64, movie_id: i64) -> DbResult<()> {
        sqlx::query("DELETE FROM wishlist WHERE user_id = ? AND movie_id = ?")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_wishlist(&self, user_id: i64) -> DbResult<Vec<WishlistItem>> {
        let results = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT m.id, m.title, w.added_date
             FROM wishlist w
             JOIN movies m ON w.movie_id = m.id
             WHERE w.user_id = ?
             ORDER BY w.added_date, m.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(results.len());
        for r in results {
            items.push(WishlistItem {
                movie_id: r.0,
                title: r.1,
                added_date: parse_date(&r.2)?,
            });
        }

        Ok(items)
    }
}

#[async_trait]
impl SessionRepo for SqliteRepository {
    async fn create_session(&self, session: &Session) -> DbResult<()> {
        sqlx::query("INSERT INTO sessions (token, user_id, created) VALUES (?, ?, ?)")
            .bind(&session.token)
            .bind(session.user_id)
            .bind(session.created.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> DbResult<Session> {
        let result = sqlx::query_as::<_, (String, i64, String)>(
            "SELECT token, user_id, created FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => DbError::NotFound("Session not found".to_string()),
            _ => e.into(),
        })?;

        Ok(Session {
            token: result.0,
            user_id: result.1,
            created: parse_date(&result.2)?,
        })
    }

    async fn delete_session(&self, token: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

impl Repository for SqliteRepository {}
