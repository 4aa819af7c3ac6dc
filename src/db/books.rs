use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::models::{Book, BookDraft, BookTitle, BookUpdate};
use crate::validation::{require_at_least, require_existing, require_id, require_text, Reference};

/// Every row of `livros`, dangling references included. The joined listings
/// in `reports` are the place to go for display names.
pub fn fetch_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, titulo, autor_id, categoria_id, ano, quantidade_disponivel
             FROM livros
             ORDER BY id",
        )
        .context("failed to prepare book query")?;

    let books = stmt
        .query_map([], |row| {
            Ok(Book {
                id: row.get(0)?,
                title: row.get(1)?,
                author_id: row.get(2)?,
                category_id: row.get(3)?,
                year: row.get(4)?,
                available_count: row.get(5)?,
            })
        })
        .context("failed to load books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    Ok(books)
}

/// Id/title pairs for the book pickers (loans, edit, delete).
pub fn fetch_book_titles(conn: &Connection) -> Result<Vec<BookTitle>> {
    let mut stmt = conn
        .prepare("SELECT id, titulo FROM livros ORDER BY id")
        .context("failed to prepare book title query")?;

    let titles = stmt
        .query_map([], |row| {
            Ok(BookTitle {
                id: row.get(0)?,
                title: row.get(1)?,
            })
        })
        .context("failed to load book titles")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect book titles")?;

    Ok(titles)
}

/// Validate a draft and insert it, returning the stored row with its new id.
pub fn create_book(conn: &Connection, draft: &BookDraft) -> Result<Book> {
    let book = validate_draft(conn, draft)
        .inspect_err(|err| warn!(%err, "rejected new book"))?;

    conn.execute(
        "INSERT INTO livros (titulo, autor_id, categoria_id, ano, quantidade_disponivel)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            book.title,
            book.author_id,
            book.category_id,
            book.year,
            book.available_count
        ],
    )
    .context("failed to insert book")?;

    let book = Book {
        id: conn.last_insert_rowid(),
        ..book
    };
    info!(book_id = book.id, title = %book.title, "created book");
    Ok(book)
}

/// Overwrite title, author, category and available count. The publication year
/// is left as it is. Fails with "Book not found" when no row has `id`.
pub fn update_book(conn: &Connection, id: i64, update: &BookUpdate) -> Result<()> {
    let title = require_text("Title", &update.title)
        .inspect_err(|err| warn!(book_id = id, %err, "rejected book update"))?;
    let (author_id, category_id) =
        require_references(conn, update.author_id, update.category_id)
            .inspect_err(|err| warn!(book_id = id, %err, "rejected book update"))?;
    let available_count = require_at_least("Available copies", update.available_count, 0)
        .inspect_err(|err| warn!(book_id = id, %err, "rejected book update"))?;

    let updated = conn
        .execute(
            "UPDATE livros
             SET titulo = ?1, autor_id = ?2, categoria_id = ?3, quantidade_disponivel = ?4
             WHERE id = ?5",
            params![title, author_id, category_id, available_count, id],
        )
        .context("failed to update book")?;

    if updated == 0 {
        Err(anyhow!("Book not found"))
    } else {
        info!(book_id = id, title, "updated book");
        Ok(())
    }
}

/// Remove a book row. Loans of the book stay in `emprestimos`. An id that is
/// already gone is reported as an error instead of being ignored.
pub fn delete_book(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM livros WHERE id = ?1", params![id])
        .context("failed to delete book")?;

    if deleted == 0 {
        Err(anyhow!("Book not found"))
    } else {
        info!(book_id = id, "deleted book");
        Ok(())
    }
}

/// Turn a draft into a ready-to-insert row (id still unset). A blank title is
/// rejected, but the title is stored exactly as submitted.
fn validate_draft(conn: &Connection, draft: &BookDraft) -> Result<Book> {
    require_text("Title", &draft.title)?;
    let (author_id, category_id) = require_references(conn, draft.author_id, draft.category_id)?;
    let year = require_at_least("Year", draft.year, 1)?;
    let available_count = require_at_least("Available copies", draft.available_count, 0)?;

    Ok(Book {
        id: 0,
        title: draft.title.clone(),
        author_id,
        category_id,
        year,
        available_count,
    })
}

fn require_references(
    conn: &Connection,
    author_id: Option<i64>,
    category_id: Option<i64>,
) -> Result<(i64, i64)> {
    let author_id = require_id("Author", author_id)?;
    let category_id = require_id("Category", category_id)?;
    require_existing(conn, Reference::Author, author_id)?;
    require_existing(conn, Reference::Category, category_id)?;
    Ok((author_id, category_id))
}
