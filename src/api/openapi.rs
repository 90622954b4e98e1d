//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health, loans, stats, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BookHaven API",
        version = "1.0.0",
        description = "Library Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::register,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Loans
        loans::request_loan,
        loans::return_loan,
        loans::list_loans,
        loans::my_loans,
        // Users
        users::list_users,
        users::update_user_role,
        users::delete_user,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Books
            crate::models::book::Book,
            crate::models::book::BookView,
            crate::models::book::BookAvailability,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::BookDetails,
            books::CreateBookResponse,
            // Loans
            loans::CreateLoanRequest,
            loans::LoanResponse,
            loans::ReturnResponse,
            crate::models::loan::LoanView,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanStatusFilter,
            // Users
            crate::models::user::Role,
            crate::models::user::RegisterUser,
            crate::models::user::UpdateUserRole,
            crate::models::user::UserView,
            // Stats
            stats::StatsResponse,
            stats::BookStats,
            stats::LoanStats,
            stats::UserStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "loans", description = "Loan management"),
        (name = "users", description = "User administration"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
