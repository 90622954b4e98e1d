//! Catalog management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{Book, BookAvailability, BookQuery, BookView, CreateBook, UpdateBook},
    models::user::RequestContext,
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books with availability, optionally filtered by a search term
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<BookView>> {
        self.repository.books.search_with_availability(query).await
    }

    /// Get a single book with its availability
    pub async fn get_book(&self, id: i32) -> AppResult<(Book, BookAvailability)> {
        let book = self.repository.books.get_by_id(id).await?;
        let availability = self.repository.books.availability(id).await?;
        Ok((book, availability))
    }

    /// Add a book to the catalog (staff only)
    pub async fn add_book(&self, ctx: &RequestContext, book: CreateBook) -> AppResult<i32> {
        ctx.require_staff()?;
        book.validate()?;

        let book_id = self.repository.books.create(&book).await?;
        tracing::info!(
            book_id,
            total_copies = book.total_copies,
            "book added to catalog"
        );
        Ok(book_id)
    }

    /// Update a book (staff only). The repository rejects any edit that
    /// would shrink stock below the copies currently on loan.
    pub async fn update_book(
        &self,
        ctx: &RequestContext,
        id: i32,
        book: UpdateBook,
    ) -> AppResult<()> {
        ctx.require_staff()?;
        book.validate()?;

        self.repository.books.update(id, &book).await
    }

    /// Delete a book (staff only); blocked while active loans exist
    pub async fn delete_book(&self, ctx: &RequestContext, id: i32) -> AppResult<()> {
        ctx.require_staff()?;
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "book deleted from catalog");
        Ok(())
    }
}
