//! User management endpoints (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{UpdateUserRole, UserView},
};

use super::AuthenticatedUser;

/// List all accounts with role names and active-loan counts
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<UserView>),
        (status = 403, description = "Administrator role required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> AppResult<Json<Vec<UserView>>> {
    let users = state.services.auth.list_users(&ctx).await?;
    Ok(Json(users))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/users/{id}/role",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUserRole,
    responses(
        (status = 204, description = "Role updated"),
        (status = 403, description = "Administrator role required or own account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateUserRole>,
) -> AppResult<StatusCode> {
    state
        .services
        .auth
        .update_role(&ctx, id, request.role_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a user account; blocked while the user holds active loans
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Administrator role required or own account"),
        (status = 404, description = "User not found"),
        (status = 422, description = "User has active loans")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.auth.delete_user(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
