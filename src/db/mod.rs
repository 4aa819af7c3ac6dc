//! Persistence module split across logical submodules.

mod authors;
mod books;
mod categories;
mod connection;
mod loans;
mod reports;
mod seed;

pub use authors::{delete_author, fetch_authors, rename_author};
pub use books::{create_book, delete_book, fetch_book_titles, fetch_books, update_book};
pub use categories::fetch_categories;
pub use connection::{ensure_schema, initialize, open_store};
pub use loans::{create_loan, fetch_loans};
pub use reports::{
    fetch_book_listings, fetch_books_in_years, fetch_books_per_category, fetch_totals,
    fetch_year_bounds,
};
pub use seed::seed_if_empty;

/// In-memory store with schema and seed data, shared by the unit tests.
#[cfg(test)]
pub(crate) fn test_store() -> rusqlite::Connection {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    initialize(&mut conn).unwrap();
    conn
}
