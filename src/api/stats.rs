//! Statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// Catalog counts
#[derive(Serialize, ToSchema)]
pub struct BookStats {
    pub titles: i64,
    pub total_copies: i64,
}

/// Loan activity counts
#[derive(Serialize, ToSchema)]
pub struct LoanStats {
    pub active: i64,
    pub overdue: i64,
}

/// Membership counts
#[derive(Serialize, ToSchema)]
pub struct UserStats {
    pub members: i64,
}

/// Dashboard statistics
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub books: BookStats,
    pub loans: LoanStats,
    pub users: UserStats,
}

/// Get dashboard statistics (staff only)
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = StatsResponse),
        (status = 403, description = "Staff role required")
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.stats.get_stats(&ctx).await?;
    Ok(Json(stats))
}
