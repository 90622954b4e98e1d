//! Statistics service

use crate::{
    api::stats::{BookStats, LoanStats, StatsResponse, UserStats},
    error::AppResult,
    models::user::{RequestContext, Role},
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Dashboard counts for staff: catalog size, loan activity, members
    pub async fn get_stats(&self, ctx: &RequestContext) -> AppResult<StatsResponse> {
        ctx.require_staff()?;

        let (titles, total_copies) = self.repository.books.counts().await?;
        let active_loans = self.repository.loans.count_active().await?;
        let overdue_loans = self.repository.loans.count_overdue().await?;
        let members = self.repository.users.count_by_role(Role::Member).await?;

        Ok(StatsResponse {
            books: BookStats {
                titles,
                total_copies,
            },
            loans: LoanStats {
                active: active_loans,
                overdue: overdue_loans,
            },
            users: UserStats { members },
        })
    }
}
