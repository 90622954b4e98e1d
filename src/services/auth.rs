//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterUser, RequestContext, Role, User, UserClaims, UserView},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password, returning a JWT token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !self.verify_password(&user.password_hash, password) {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token(&user)?;
        Ok((token, user))
    }

    /// Self-registration; new accounts are always members
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        request.validate()?;
        if request.password != request.confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        if self
            .repository
            .users
            .username_or_email_exists(&request.username, &request.email)
            .await?
        {
            return Err(AppError::Conflict(
                "Username or email already taken".to_string(),
            ));
        }

        let hash = self.hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request.username, &request.email, &hash, Role::Member)
            .await?;

        tracing::info!(user_id = user.user_id, "member account registered");
        Ok(user)
    }

    /// Get the calling user's account
    pub async fn me(&self, ctx: &RequestContext) -> AppResult<User> {
        self.repository.users.get_by_id(ctx.user_id).await
    }

    /// List all accounts with role names and loan counts (admin only)
    pub async fn list_users(&self, ctx: &RequestContext) -> AppResult<Vec<UserView>> {
        ctx.require_admin()?;
        self.repository.users.list_with_loan_counts().await
    }

    /// Change another user's role (admin only). Admins cannot change the
    /// role of their own active account.
    pub async fn update_role(
        &self,
        ctx: &RequestContext,
        target_user_id: i32,
        role_id: i16,
    ) -> AppResult<()> {
        ctx.require_admin()?;

        let role = Role::from_id(role_id)
            .ok_or_else(|| AppError::Validation(format!("Unknown role id {}", role_id)))?;

        if target_user_id == ctx.user_id {
            return Err(AppError::Authorization(
                "You cannot change the role of your own account".to_string(),
            ));
        }

        self.repository.users.update_role(target_user_id, role).await?;
        tracing::info!(target_user_id, role = %role, "user role updated");
        Ok(())
    }

    /// Delete another user's account (admin only). Blocked while the user
    /// holds active loans; admins cannot delete their own account.
    pub async fn delete_user(&self, ctx: &RequestContext, target_user_id: i32) -> AppResult<()> {
        ctx.require_admin()?;

        if target_user_id == ctx.user_id {
            return Err(AppError::Authorization(
                "You cannot delete your own active account".to_string(),
            ));
        }

        self.repository.users.delete(target_user_id).await?;
        tracing::info!(target_user_id, "user account deleted");
        Ok(())
    }

    /// Create the configured admin account at startup when none exists
    pub async fn ensure_bootstrap_admin(&self) -> AppResult<()> {
        if self.repository.users.admin_exists().await? {
            return Ok(());
        }

        let Some(ref password) = self.config.bootstrap_admin_password else {
            tracing::warn!("no admin account exists and no bootstrap password is configured");
            return Ok(());
        };

        let username = &self.config.bootstrap_admin_username;
        let hash = self.hash_password(password)?;
        let email = format!("{}@localhost", username);
        self.repository
            .users
            .create(username, &email, &hash, Role::Admin)
            .await?;

        tracing::warn!(
            username,
            "bootstrap admin account created; change its password"
        );
        Ok(())
    }

    fn create_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.user_id,
            username: user.username.clone(),
            role: user.role(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(&self, hash: &str, password: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}
