//! Data models for the BookHaven API

pub mod book;
pub mod loan;
pub mod user;

pub use book::{Book, BookAvailability, BookQuery, BookView, CreateBook, UpdateBook};
pub use loan::{Loan, LoanQuery, LoanStatus, LoanStatusFilter, LoanView};
pub use user::{RequestContext, Role, User, UserClaims, UserView};
