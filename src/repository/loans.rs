//! Loans repository for database operations.
//!
//! The loan-request pipeline and the return pipeline each run inside a
//! single transaction; any early return drops the transaction and rolls
//! everything back.

use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::{LoanQuery, LoanStatus, LoanStatusFilter, LoanView},
    repository::books::active_loan_count,
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a new loan for a borrower.
    ///
    /// Validation and insert happen in one transaction. The book row is
    /// locked first, so two concurrent requests for the last copy
    /// serialize here and the second sees the first's committed insert.
    pub async fn create(
        &self,
        borrower_id: i32,
        book_id: i32,
        policy: &LoansConfig,
    ) -> AppResult<(i32, DateTime<Utc>)> {
        let mut tx = self.pool.begin().await?;

        // Lock the borrower row so a member's concurrent requests
        // serialize and cannot overshoot the loan limit. Lock order is
        // always user first, then book.
        sqlx::query_scalar::<_, i32>("SELECT user_id FROM users WHERE user_id = $1 FOR UPDATE")
            .bind(borrower_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", borrower_id)))?;

        let total_copies: i32 =
            sqlx::query_scalar("SELECT total_copies FROM books WHERE book_id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let active_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND return_date IS NULL",
        )
        .bind(borrower_id)
        .fetch_one(&mut *tx)
        .await?;

        if active_loans >= policy.max_loans {
            return Err(AppError::LoanLimitExceeded {
                current: active_loans,
                max: policy.max_loans,
            });
        }

        let already_loaned: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = $1 AND book_id = $2 AND return_date IS NULL)",
        )
        .bind(borrower_id)
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_loaned {
            return Err(AppError::DuplicateActiveLoan);
        }

        let currently_loaned = active_loan_count(&mut *tx, book_id).await?;
        if i64::from(total_copies) <= currently_loaned {
            return Err(AppError::OutOfStock {
                total_copies,
                currently_loaned,
            });
        }

        let now = Utc::now();
        let due_date = now + Duration::days(policy.loan_period_days);

        let loan_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO loans (user_id, book_id, loan_date, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING loan_id
            "#,
        )
        .bind(borrower_id)
        .bind(book_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match &e {
            // The partial unique index on active (user, book) pairs backs
            // up the read check under concurrency.
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateActiveLoan,
            _ => AppError::from(e),
        })?;

        tx.commit().await?;
        Ok((loan_id, due_date))
    }

    /// Mark a loan as returned and record the staff member who processed
    /// it. Returns the book title for the confirmation message.
    ///
    /// The update is guarded by `return_date IS NULL`: a concurrent double
    /// return affects zero rows and is rejected, never silently accepted.
    pub async fn return_loan(&self, loan_id: i32, staff_id: i32) -> AppResult<String> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE loans
            SET return_date = $1, returned_by_user_id = $2
            WHERE loan_id = $3 AND return_date IS NULL
            "#,
        )
        .bind(now)
        .bind(staff_id)
        .bind(loan_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE loan_id = $1)")
                    .bind(loan_id)
                    .fetch_one(&mut *tx)
                    .await?;
            return Err(if exists {
                AppError::AlreadyReturned(loan_id)
            } else {
                AppError::NotFound(format!("Loan with id {} not found", loan_id))
            });
        }

        let book_title: String = sqlx::query_scalar(
            r#"
            SELECT b.title FROM loans l
            JOIN books b ON l.book_id = b.book_id
            WHERE l.loan_id = $1
            "#,
        )
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(book_title)
    }

    /// List loans with book and member details, newest first
    pub async fn list(&self, query: &LoanQuery) -> AppResult<Vec<LoanView>> {
        let status = query.status.unwrap_or_default();
        let late_only = query.late.unwrap_or(false);

        let mut conditions = vec!["1=1".to_string()];
        if status == LoanStatusFilter::Active || late_only {
            conditions.push("l.return_date IS NULL".to_string());
        }
        if late_only {
            conditions.push("l.due_date < NOW()".to_string());
        }
        let where_clause = conditions.join(" AND ");

        let sql = format!(
            r#"
            SELECT l.loan_id, l.book_id, b.title AS book_title,
                   u.user_id AS member_user_id, u.username AS member_username,
                   l.loan_date, l.due_date, l.return_date
            FROM loans l
            JOIN users u ON l.user_id = u.user_id
            JOIN books b ON l.book_id = b.book_id
            WHERE {}
            ORDER BY l.loan_date DESC
            "#,
            where_clause
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let now = Utc::now();
        Ok(rows.into_iter().map(|row| Self::view_from_row(row, now)).collect())
    }

    /// Active loans held by one user, soonest due first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanView>> {
        let rows = sqlx::query(
            r#"
            SELECT l.loan_id, l.book_id, b.title AS book_title,
                   u.user_id AS member_user_id, u.username AS member_username,
                   l.loan_date, l.due_date, l.return_date
            FROM loans l
            JOIN users u ON l.user_id = u.user_id
            JOIN books b ON l.book_id = b.book_id
            WHERE l.user_id = $1 AND l.return_date IS NULL
            ORDER BY l.due_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        Ok(rows.into_iter().map(|row| Self::view_from_row(row, now)).collect())
    }

    fn view_from_row(row: sqlx::postgres::PgRow, now: DateTime<Utc>) -> LoanView {
        let due_date: DateTime<Utc> = row.get("due_date");
        let return_date: Option<DateTime<Utc>> = row.get("return_date");
        LoanView {
            loan_id: row.get("loan_id"),
            book_id: row.get("book_id"),
            book_title: row.get("book_title"),
            member_user_id: row.get("member_user_id"),
            member_username: row.get("member_username"),
            loan_date: row.get("loan_date"),
            due_date,
            return_date,
            status: LoanStatus::derive(due_date, return_date, now),
        }
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE return_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count overdue loans
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE return_date IS NULL AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
