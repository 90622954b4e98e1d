//! Catalog management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookAvailability, BookQuery, BookView, CreateBook, UpdateBook},
};

use super::AuthenticatedUser;

/// Response for book creation
#[derive(Serialize, ToSchema)]
pub struct CreateBookResponse {
    pub book_id: i32,
    pub message: String,
}

/// Single book with live availability
#[derive(Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub currently_loaned: i64,
    pub available_copies: i64,
}

/// List books with availability
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Books with availability", body = Vec<BookView>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<BookView>>> {
    let books = state.services.catalog.list_books(&query).await?;
    Ok(Json(books))
}

/// Get a single book with availability
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let (book, availability) = state.services.catalog.get_book(id).await?;
    let BookAvailability {
        currently_loaned,
        available_copies,
        ..
    } = availability;

    Ok(Json(BookDetails {
        book,
        currently_loaned,
        available_copies,
    }))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = CreateBookResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Staff role required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<CreateBookResponse>)> {
    let title = book.title.clone();
    let total_copies = book.total_copies;
    let book_id = state.services.catalog.add_book(&ctx, book).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookResponse {
            book_id,
            message: format!("Added '{}' with {} copies", title, total_copies),
        }),
    ))
}

/// Update a book. Shrinking stock below the copies currently on loan is
/// rejected.
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 204, description = "Book updated"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Total copies below active loans")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(book): Json<UpdateBook>,
) -> AppResult<StatusCode> {
    state.services.catalog.update_book(&ctx, id, book).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a book; blocked while active loans exist
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book has active loans")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(ctx): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
