//! User accounts and API keys

use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::Database;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, is_active, is_staff, \
                            is_superuser, date_joined, last_login";

/// Prefix that makes keys recognizable in config files and logs
pub const API_KEY_PREFIX: &str = "sum_";

/// Generate a fresh random API key
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}

/// Hex SHA-256 of an API key, the only form that is persisted
pub fn hash_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

impl Database {
    /// Create a user and return it with its plaintext API key (shown once)
    pub async fn create_user(&self, new: &NewUser) -> AppResult<(User, String)> {
        let username = new.username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request("Username must not be empty"));
        }

        let api_key = generate_api_key();
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (username, email, first_name, last_name, is_active, is_staff, is_superuser,
                 date_joined, api_key_hash)
            VALUES ($1, $2, $3, $4, 1, $5, $6, $7, $8)
            "#,
        )
        .bind(username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.is_staff)
        .bind(new.is_superuser)
        .bind(Utc::now())
        .bind(hash_api_key(&api_key))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            if err.code == ErrorCode::DbConflict {
                AppError::new(err.code, format!("User \"{}\" already exists", username))
            } else {
                err
            }
        })?;

        let user = self.get_user_by_id(result.last_insert_rowid()).await?;
        info!(user = %user.username, "👤 User created");
        Ok((user, api_key))
    }

    async fn get_user_by_id(&self, id: i64) -> AppResult<User> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Resolve an active user from an API key and stamp `last_login`
    pub async fn authenticate(&self, api_key: &str) -> AppResult<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE api_key_hash = $1 AND is_active = 1",
            USER_COLUMNS
        );
        let Some(mut user) = sqlx::query_as::<_, User>(&sql)
            .bind(hash_api_key(api_key))
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let now = Utc::now();
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(now)
            .bind(user.id)
            .execute(&self.pool)
            .await?;
        user.last_login = Some(now);
        Ok(Some(user))
    }

    /// Replace a user's API key, returning the new plaintext key
    pub async fn rotate_api_key(&self, username: &str) -> AppResult<String> {
        let api_key = generate_api_key();
        let result = sqlx::query("UPDATE users SET api_key_hash = $1 WHERE username = $2")
            .bind(hash_api_key(&api_key))
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!("API key rotation for unknown user {}", username);
            return Err(AppError::user_not_found(username));
        }
        info!(user = %username, "🔑 API key rotated");
        Ok(api_key)
    }

    /// Inactive users keep their key hash but fail `authenticate`
    pub async fn set_active(&self, username: &str, active: bool) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE username = $2")
            .bind(active)
            .bind(username)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::user_not_found(username));
        }
        info!(user = %username, active, "User activity changed");
        Ok(())
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn count_users(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Users with no grants at all; superusers are skipped
    pub async fn users_without_models(&self) -> AppResult<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {} FROM users u
            WHERE u.is_superuser = 0
              AND NOT EXISTS (SELECT 1 FROM model_assignments a WHERE a.user_id = u.id)
            ORDER BY u.username
            "#,
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_shape_and_hash() {
        let key = generate_api_key();
        assert!(key.starts_with(API_KEY_PREFIX));
        assert_eq!(key.len(), API_KEY_PREFIX.len() + 48);
        assert_ne!(key, generate_api_key());

        let hash = hash_api_key("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let db = Database::in_memory().await.unwrap();
        let (user, key) = db.create_user(&NewUser::new("alice")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.is_active);
        assert!(user.last_login.is_none());

        let authed = db.authenticate(&key).await.unwrap().unwrap();
        assert_eq!(authed.id, user.id);
        assert!(authed.last_login.is_some());

        let stored = db.get_by_username("alice").await.unwrap().unwrap();
        assert!(stored.last_login.is_some());

        assert!(db.authenticate("sum_wrong").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let db = Database::in_memory().await.unwrap();
        db.create_user(&NewUser::new("bob")).await.unwrap();
        let err = db.create_user(&NewUser::new("bob")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DbConflict);
        assert_eq!(err.message, "User \"bob\" already exists");
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_authenticate() {
        let db = Database::in_memory().await.unwrap();
        let (_, key) = db.create_user(&NewUser::new("carol")).await.unwrap();
        db.set_active("carol", false).await.unwrap();
        assert!(db.authenticate(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rotate_invalidates_old_key() {
        let db = Database::in_memory().await.unwrap();
        let (_, old) = db.create_user(&NewUser::new("dave")).await.unwrap();
        let new = db.rotate_api_key("dave").await.unwrap();

        assert!(db.authenticate(&old).await.unwrap().is_none());
        assert!(db.authenticate(&new).await.unwrap().is_some());

        let err = db.rotate_api_key("nobody").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
        assert_eq!(err.message, "User \"nobody\" does not exist");
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let db = Database::in_memory().await.unwrap();
        db.create_user(&NewUser::new("zed")).await.unwrap();
        db.create_user(&NewUser::new("amy")).await.unwrap();

        let names: Vec<_> = db
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["amy", "zed"]);
        assert_eq!(db.count_users().await.unwrap(), 2);
    }
}
