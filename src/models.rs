//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. The table and column names stay in Portuguese (`autores`, `livros`,
//! ...) for compatibility with existing store files, while the Rust side uses
//! English field names. These types are plain data holders so other layers can
//! focus on presentation and persistence logic.

use std::fmt;

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `autores` table.
pub struct Author {
    /// Primary key assigned by the store.
    pub id: i64,
    /// Display name (`nome`).
    pub name: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `categorias` table.
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A raw row of the `livros` table. The author and category ids are not
/// guaranteed to resolve: deleting an author or category leaves them dangling.
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub category_id: i64,
    /// Publication year (`ano`).
    pub year: i64,
    /// Copies on the shelf (`quantidade_disponivel`). Edited by hand and never
    /// derived from outstanding loans.
    pub available_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row of the `emprestimos` table.
pub struct Loan {
    pub id: i64,
    pub book_id: i64,
    /// Stored as ISO `YYYY-MM-DD` text.
    pub loan_date: NaiveDate,
    pub returned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A book joined with its author and category names. Only books whose
/// references both resolve show up in listings.
pub struct BookListing {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub year: i64,
    pub available_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Id/title pair used to populate book pickers.
pub struct BookTitle {
    pub id: i64,
    pub title: String,
}

impl fmt::Display for BookTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Inclusive range of publication years.
pub struct YearRange {
    pub start: i64,
    pub end: i64,
}

impl YearRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Headline numbers for the summary screen. `available_copies` is the sum of
/// every book's available count and is independent of loan state.
pub struct LibraryTotals {
    pub available_copies: i64,
    pub loans: i64,
    pub returned_loans: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Number of books filed under one category. Empty categories report zero.
pub struct CategoryCount {
    pub category_id: i64,
    pub category: String,
    pub book_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Input for `create_book`. References are optional because a form may be
/// submitted before anything was picked; validation rejects the gaps.
pub struct BookDraft {
    pub title: String,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub year: i64,
    pub available_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Input for `update_book`. The publication year is not editable.
pub struct BookUpdate {
    pub title: String,
    pub author_id: Option<i64>,
    pub category_id: Option<i64>,
    pub available_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Input for `create_loan`. `book_id` is `None` when there was no book to pick.
pub struct LoanDraft {
    pub book_id: Option<i64>,
    pub loan_date: NaiveDate,
    pub returned: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Rows inserted per table by a seeding pass. All zero once a store has been
/// initialized.
pub struct SeedReport {
    pub authors: usize,
    pub categories: usize,
    pub books: usize,
    pub loans: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.authors + self.categories + self.books + self.loans == 0
    }
}
