//! User model, roles and request context

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// User roles. Admin and librarian are staff; members only request
/// and hold loans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin = 1,
    Librarian = 2,
    Member = 3,
}

impl Role {
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Librarian),
            3 => Some(Role::Member),
            _ => None,
        }
    }

    pub fn as_id(&self) -> i16 {
        *self as i16
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Librarian => "librarian",
            Role::Member => "member",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Librarian)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: i16,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_id(self.role_id).unwrap_or(Role::Member)
    }
}

/// User with role name and loan counts for the admin listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserView {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role_id: i16,
    pub role_name: String,
    pub active_loans: i64,
    pub created_at: DateTime<Utc>,
}

/// Self-registration request; new accounts are always members
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 3, message = "username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "a valid email address is required"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub confirm_password: String,
}

/// Role change request (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRole {
    pub role_id: i16,
}

/// JWT claims carried by the Bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: i32,
    pub username: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

/// Authenticated identity and role, passed explicitly into every
/// service call instead of being read from ambient state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl RequestContext {
    pub fn require_staff(&self) -> AppResult<()> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Staff role required for this operation".to_string(),
            ))
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator role required for this operation".to_string(),
            ))
        }
    }

    pub fn require_member(&self) -> AppResult<()> {
        if self.role == Role::Member {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Staff members must process loans through the loans desk".to_string(),
            ))
        }
    }
}

impl From<UserClaims> for RequestContext {
    fn from(claims: UserClaims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> RequestContext {
        RequestContext {
            user_id: 42,
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn role_ids_round_trip() {
        for role in [Role::Admin, Role::Librarian, Role::Member] {
            assert_eq!(Role::from_id(role.as_id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn librarian_is_staff_but_not_admin() {
        let c = ctx(Role::Librarian);
        assert!(c.require_staff().is_ok());
        assert!(c.require_admin().is_err());
        assert!(c.require_member().is_err());
    }

    #[test]
    fn member_is_not_staff() {
        let c = ctx(Role::Member);
        assert!(c.require_staff().is_err());
        assert!(c.require_member().is_ok());
    }

    #[test]
    fn claims_round_trip_through_token() {
        let claims = UserClaims {
            sub: 7,
            username: "reader".to_string(),
            role: Role::Member,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        };
        let token = claims.create_token("test-secret").unwrap();
        let decoded = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, 7);
        assert_eq!(decoded.role, Role::Member);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
