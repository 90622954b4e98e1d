//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub book_id: i32,
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub genre: Option<String>,
    pub total_copies: i32,
}

/// Book with live availability counts for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookView {
    pub book_id: i32,
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub genre: Option<String>,
    pub total_copies: i32,
    pub currently_loaned: i64,
    pub available_copies: i64,
}

/// Availability snapshot for a single book.
/// Never stored; always recomputed from books + loans.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct BookAvailability {
    pub total_copies: i32,
    pub currently_loaned: i64,
    pub available_copies: i64,
}

impl BookAvailability {
    /// A negative raw value means the stock invariant was violated;
    /// clamp for display and leave a trace.
    pub fn new(total_copies: i32, currently_loaned: i64) -> Self {
        let raw = i64::from(total_copies) - currently_loaned;
        if raw < 0 {
            tracing::warn!(
                total_copies,
                currently_loaned,
                "negative availability computed, clamping to zero"
            );
        }
        Self {
            total_copies,
            currently_loaned,
            available_copies: raw.max(0),
        }
    }

    pub fn in_stock(&self) -> bool {
        self.available_copies > 0
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub genre: Option<String>,
    #[validate(range(min = 1, message = "at least one copy is required"))]
    pub total_copies: i32,
}

/// Update book request. `total_copies` may drop to zero, but never below
/// the number of copies currently on loan.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub isbn: Option<String>,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    pub publisher: Option<String>,
    pub publication_year: Option<i16>,
    pub genre: Option<String>,
    #[validate(range(min = 0, message = "total copies cannot be negative"))]
    pub total_copies: i32,
}

/// Catalog search filter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    /// Matches title, author, ISBN or genre (substring, case-insensitive)
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_subtracts_active_loans() {
        let a = BookAvailability::new(5, 2);
        assert_eq!(a.available_copies, 3);
        assert!(a.in_stock());
    }

    #[test]
    fn availability_zero_when_fully_loaned() {
        let a = BookAvailability::new(2, 2);
        assert_eq!(a.available_copies, 0);
        assert!(!a.in_stock());
    }

    #[test]
    fn availability_clamps_corrupted_counts() {
        let a = BookAvailability::new(1, 3);
        assert_eq!(a.available_copies, 0);
        assert_eq!(a.currently_loaned, 3);
    }

    #[test]
    fn create_book_requires_title_author_and_stock() {
        let book = CreateBook {
            isbn: None,
            title: String::new(),
            author: "Someone".to_string(),
            publisher: None,
            publication_year: None,
            genre: None,
            total_copies: 0,
        };
        let report = book.validate().unwrap_err();
        assert!(report.field_errors().contains_key("title"));
        assert!(report.field_errors().contains_key("total_copies"));
    }
}
