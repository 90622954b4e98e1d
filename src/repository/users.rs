//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{Role, User, UserView},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (primary authentication method)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if username or email is already taken
    pub async fn username_or_email_exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($2))",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new user
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_id())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Username or email already taken".to_string())
            }
            _ => AppError::from(e),
        })?;

        Ok(user)
    }

    /// List users with role names and active-loan counts, for the admin
    /// account overview
    pub async fn list_with_loan_counts(&self) -> AppResult<Vec<UserView>> {
        let users = sqlx::query_as::<_, UserView>(
            r#"
            SELECT u.user_id, u.username, u.email, u.role_id, r.role_name,
                   (SELECT COUNT(*) FROM loans l
                    WHERE l.user_id = u.user_id AND l.return_date IS NULL) AS active_loans,
                   u.created_at
            FROM users u
            JOIN roles r ON u.role_id = r.role_id
            ORDER BY u.role_id, u.username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Change a user's role
    pub async fn update_role(&self, id: i32, role: Role) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET role_id = $1 WHERE user_id = $2")
            .bind(role.as_id())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Delete a user. Blocked while the user holds active loans; the check
    /// and the delete share one transaction.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let active_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND return_date IS NULL",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if active_loans > 0 {
            return Err(AppError::UserHasActiveLoans { active_loans });
        }

        // The loan ledger is append-only, so accounts with past loans keep
        // their rows and cannot be hard-deleted.
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => AppError::Conflict(
                    "User has loan history and cannot be deleted".to_string(),
                ),
                _ => AppError::from(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Whether any admin account exists (startup bootstrap check)
    pub async fn admin_exists(&self) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role_id = $1)")
                .bind(Role::Admin.as_id())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Count users holding a given role
    pub async fn count_by_role(&self, role: Role) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(role.as_id())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
