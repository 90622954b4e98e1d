//! Books repository for database operations.
//!
//! Catalog writes that interact with the loan ledger (shrinking stock,
//! deletion) run inside a transaction that locks the book row, so the
//! active-loan count cannot move between the check and the write.

use sqlx::{PgConnection, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookAvailability, BookQuery, BookView, CreateBook, UpdateBook},
};

/// Count active loans for a book on the given connection. Used both from
/// the pool and from inside open transactions.
pub(crate) async fn active_loan_count(conn: &mut PgConnection, book_id: i32) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM loans WHERE book_id = $1 AND return_date IS NULL",
    )
    .bind(book_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE book_id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Availability for a single book: total copies, active loans and the
    /// derived available count
    pub async fn availability(&self, book_id: i32) -> AppResult<BookAvailability> {
        let row = sqlx::query(
            r#"
            SELECT b.total_copies,
                   (SELECT COUNT(*) FROM loans l
                    WHERE l.book_id = b.book_id AND l.return_date IS NULL) AS currently_loaned
            FROM books b
            WHERE b.book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        Ok(BookAvailability::new(
            row.get("total_copies"),
            row.get("currently_loaned"),
        ))
    }

    /// List books with per-row availability, optionally filtered by a
    /// search term over title, author, ISBN and genre
    pub async fn search_with_availability(&self, query: &BookQuery) -> AppResult<Vec<BookView>> {
        let pattern = query
            .search
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("%{}%", s.trim()));

        let books = sqlx::query_as::<_, BookView>(
            r#"
            SELECT b.book_id, b.isbn, b.title, b.author, b.publisher,
                   b.publication_year, b.genre, b.total_copies,
                   (SELECT COUNT(*) FROM loans l
                    WHERE l.book_id = b.book_id AND l.return_date IS NULL) AS currently_loaned,
                   GREATEST(b.total_copies - (SELECT COUNT(*) FROM loans l
                    WHERE l.book_id = b.book_id AND l.return_date IS NULL), 0) AS available_copies
            FROM books b
            WHERE $1::text IS NULL
               OR b.title ILIKE $1
               OR b.author ILIKE $1
               OR b.isbn ILIKE $1
               OR b.genre ILIKE $1
            ORDER BY b.title
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<i32> {
        let book_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (isbn, title, author, publisher, publication_year, genre, total_copies)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING book_id
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(&book.genre)
        .bind(book.total_copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(book_id)
    }

    /// Update a book. Reducing `total_copies` below the current active-loan
    /// count is rejected with no write.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        // Lock the row; loan inserts for this book block until commit.
        let existing: Option<i32> =
            sqlx::query_scalar("SELECT total_copies FROM books WHERE book_id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let currently_loaned = active_loan_count(&mut *tx, id).await?;
        if i64::from(book.total_copies) < currently_loaned {
            return Err(AppError::InsufficientCopiesForActiveLoans {
                requested: book.total_copies,
                currently_loaned,
            });
        }

        sqlx::query(
            r#"
            UPDATE books
            SET isbn = $1, title = $2, author = $3, publisher = $4,
                publication_year = $5, genre = $6, total_copies = $7
            WHERE book_id = $8
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(&book.genre)
        .bind(book.total_copies)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a book. Blocked while any active loan references it; the
    /// check and the delete share one transaction.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i32> =
            sqlx::query_scalar("SELECT book_id FROM books WHERE book_id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        let currently_loaned = active_loan_count(&mut *tx, id).await?;
        if currently_loaned > 0 {
            return Err(AppError::BookHasActiveLoans { currently_loaned });
        }

        sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Count catalog titles and total copies
    pub async fn counts(&self) -> AppResult<(i64, i64)> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS titles, COALESCE(SUM(total_copies), 0)::bigint AS copies FROM books",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok((row.get("titles"), row.get("copies")))
    }
}
