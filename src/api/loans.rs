//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{LoanQuery, LoanView},
};

use super::AuthenticatedUser;

/// Loan request; the borrower is the authenticated caller
#[derive(Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Book ID
    pub book_id: i32,
}

/// Loan response with the calculated due date
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    /// Loan ID
    pub loan_id: i32,
    /// Due date (ISO 8601 format)
    pub due_date: DateTime<Utc>,
    /// Status message
    pub message: String,
}

/// Return confirmation
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// Title of the returned book
    pub book_title: String,
}

/// Request a loan for the authenticated member
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 403, description = "Caller is not a member"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Loan limit reached, duplicate loan or out of stock")
    )
)]
pub async fn request_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let (loan_id, due_date) = state
        .services
        .loans
        .request_loan(&ctx, request.book_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            loan_id,
            due_date,
            message: format!("Loan accepted, due {}", due_date.format("%Y-%m-%d")),
        }),
    ))
}

/// Process a return (staff only)
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan returned", body = ReturnResponse),
        (status = 403, description = "Staff role required"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let book_title = state.services.loans.process_return(&ctx, loan_id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        book_title,
    }))
}

/// List loans across all members (staff only)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans with status", body = Vec<LoanView>),
        (status = 403, description = "Staff role required")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanView>>> {
    let loans = state.services.loans.list_loans(&ctx, &query).await?;
    Ok(Json(loans))
}

/// Active loans held by the authenticated user
#[utoipa::path(
    get,
    path = "/loans/me",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's active loans", body = Vec<LoanView>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanView>>> {
    let loans = state.services.loans.my_loans(&ctx).await?;
    Ok(Json(loans))
}
