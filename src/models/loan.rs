//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Loan model from database. A loan is active while `return_date` is null;
/// rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub loan_id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub returned_by_user_id: Option<i32>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Display status derived from the due and return dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Overdue,
    Returned,
    ReturnedLate,
}

impl LoanStatus {
    /// Lateness is a read-time fact, never stored.
    pub fn derive(
        due_date: DateTime<Utc>,
        return_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        match return_date {
            Some(returned) if returned > due_date => LoanStatus::ReturnedLate,
            Some(_) => LoanStatus::Returned,
            None if due_date < now => LoanStatus::Overdue,
            None => LoanStatus::Active,
        }
    }
}

/// Loan with book and member details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanView {
    pub loan_id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub member_user_id: i32,
    pub member_username: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
}

/// Status filter for the loans listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatusFilter {
    #[default]
    Active,
    All,
}

/// Loans listing filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LoanQuery {
    /// `active` (default) or `all`
    pub status: Option<LoanStatusFilter>,
    /// Restrict to overdue active loans
    pub late: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dates() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now, now + Duration::days(14))
    }

    #[test]
    fn active_before_due_date() {
        let (now, due) = dates();
        assert_eq!(LoanStatus::derive(due, None, now), LoanStatus::Active);
    }

    #[test]
    fn overdue_after_due_date() {
        let (_, due) = dates();
        let later = due + Duration::days(1);
        assert_eq!(LoanStatus::derive(due, None, later), LoanStatus::Overdue);
    }

    #[test]
    fn returned_on_time() {
        let (now, due) = dates();
        let returned = now + Duration::days(7);
        assert_eq!(
            LoanStatus::derive(due, Some(returned), returned),
            LoanStatus::Returned
        );
    }

    #[test]
    fn returned_late_when_past_due() {
        let (_, due) = dates();
        let returned = due + Duration::hours(1);
        assert_eq!(
            LoanStatus::derive(due, Some(returned), returned),
            LoanStatus::ReturnedLate
        );
    }
}
