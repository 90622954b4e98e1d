//! Loan management service

use chrono::{DateTime, Utc};

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::loan::{LoanQuery, LoanView},
    models::user::RequestContext,
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, policy: LoansConfig) -> Self {
        Self { repository, policy }
    }

    /// Request a loan for the calling member. Staff process loans through
    /// their own flow and are rejected here.
    pub async fn request_loan(
        &self,
        ctx: &RequestContext,
        book_id: i32,
    ) -> AppResult<(i32, DateTime<Utc>)> {
        ctx.require_member()?;

        let (loan_id, due_date) = self
            .repository
            .loans
            .create(ctx.user_id, book_id, &self.policy)
            .await?;

        tracing::info!(
            user_id = ctx.user_id,
            book_id,
            loan_id,
            "loan created, due {}",
            due_date
        );
        Ok((loan_id, due_date))
    }

    /// Process a return on behalf of a member; records which staff member
    /// handled it. Returns the book title for the confirmation message.
    pub async fn process_return(&self, ctx: &RequestContext, loan_id: i32) -> AppResult<String> {
        ctx.require_staff()?;

        let book_title = self
            .repository
            .loans
            .return_loan(loan_id, ctx.user_id)
            .await?;

        tracing::info!(loan_id, staff_id = ctx.user_id, "loan returned");
        Ok(book_title)
    }

    /// List loans across all members (staff only)
    pub async fn list_loans(&self, ctx: &RequestContext, query: &LoanQuery) -> AppResult<Vec<LoanView>> {
        ctx.require_staff()?;
        self.repository.loans.list(query).await
    }

    /// Active loans held by the calling user
    pub async fn my_loans(&self, ctx: &RequestContext) -> AppResult<Vec<LoanView>> {
        self.repository.loans.list_for_user(ctx.user_id).await
    }
}
