//! Read-only views over the catalog: joined listings, the year filter and the
//! numbers shown on the summary screen.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::models::{BookListing, CategoryCount, LibraryTotals, YearRange};

/// Every book whose author and category both still exist, joined with their
/// names. Inner joins drop books with dangling references.
pub fn fetch_book_listings(conn: &Connection) -> Result<Vec<BookListing>> {
    let mut stmt = conn
        .prepare(
            "SELECT l.id, l.titulo, a.nome, c.nome, l.ano, l.quantidade_disponivel
             FROM livros l
             INNER JOIN autores a ON l.autor_id = a.id
             INNER JOIN categorias c ON l.categoria_id = c.id
             ORDER BY l.id",
        )
        .context("failed to prepare book listing query")?;

    let listings = stmt
        .query_map([], listing_from_row)
        .context("failed to load book listings")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect book listings")?;

    Ok(listings)
}

/// Oldest and newest publication year in the store, or `None` when there are
/// no books. Callers start their year filter from these bounds.
pub fn fetch_year_bounds(conn: &Connection) -> Result<Option<YearRange>> {
    let (min, max): (Option<i64>, Option<i64>) = conn
        .query_row("SELECT MIN(ano), MAX(ano) FROM livros", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .context("failed to load year bounds")?;

    Ok(min.zip(max).map(|(start, end)| YearRange::new(start, end)))
}

/// Joined listings published within `range` (bounds included), oldest first.
/// An inverted range matches nothing.
pub fn fetch_books_in_years(conn: &Connection, range: YearRange) -> Result<Vec<BookListing>> {
    let mut stmt = conn
        .prepare(
            "SELECT l.id, l.titulo, a.nome, c.nome, l.ano, l.quantidade_disponivel
             FROM livros l
             JOIN autores a ON l.autor_id = a.id
             JOIN categorias c ON l.categoria_id = c.id
             WHERE l.ano BETWEEN ?1 AND ?2
             ORDER BY l.ano, l.id",
        )
        .context("failed to prepare year range query")?;

    let listings = stmt
        .query_map(params![range.start, range.end], listing_from_row)
        .context("failed to load books in year range")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books in year range")?;

    Ok(listings)
}

/// Sum of available copies plus the loan and returned-loan counts.
pub fn fetch_totals(conn: &Connection) -> Result<LibraryTotals> {
    let available_copies: i64 = conn
        .query_row(
            "SELECT COALESCE(SUM(quantidade_disponivel), 0) FROM livros",
            [],
            |row| row.get(0),
        )
        .context("failed to sum available copies")?;

    let loans: i64 = conn
        .query_row("SELECT COUNT(*) FROM emprestimos", [], |row| row.get(0))
        .context("failed to count loans")?;

    let returned_loans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM emprestimos WHERE devolvido = 1",
            [],
            |row| row.get(0),
        )
        .context("failed to count returned loans")?;

    Ok(LibraryTotals {
        available_copies,
        loans,
        returned_loans,
    })
}

/// Book count per category. The left join keeps categories without books.
pub fn fetch_books_per_category(conn: &Connection) -> Result<Vec<CategoryCount>> {
    let mut stmt = conn
        .prepare(
            "SELECT c.id, c.nome, COUNT(l.id)
             FROM categorias c
             LEFT JOIN livros l ON c.id = l.categoria_id
             GROUP BY c.id
             ORDER BY c.id",
        )
        .context("failed to prepare category count query")?;

    let counts = stmt
        .query_map([], |row| {
            Ok(CategoryCount {
                category_id: row.get(0)?,
                category: row.get(1)?,
                book_count: row.get(2)?,
            })
        })
        .context("failed to load category counts")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect category counts")?;

    Ok(counts)
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<BookListing> {
    Ok(BookListing {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        category: row.get(3)?,
        year: row.get(4)?,
        available_count: row.get(5)?,
    })
}
