use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::models::SeedReport;

const SEED_AUTHORS: &[&str] = &[
    "J.K. Rowling",
    "George R. R. Martin",
    "J.R.R. Tolkien",
    "Agatha Christie",
    "Stephen King",
];

const SEED_CATEGORIES: &[&str] = &[
    "Fantasia",
    "Mistério",
    "Terror",
    "Ficção Científica",
    "Romance",
];

/// `(title, author_id, category_id, year, available_count)`
const SEED_BOOKS: &[(&str, i64, i64, i64, i64)] = &[
    ("Harry Potter and the Sorcerer's Stone", 1, 1, 1997, 5),
    ("Harry Potter and the Chamber of Secrets", 1, 1, 1998, 4),
    ("A Game of Thrones", 2, 1, 1996, 3),
    ("A Clash of Kings", 2, 1, 1998, 3),
    ("The Hobbit", 3, 1, 1937, 6),
    ("The Lord of the Rings", 3, 1, 1954, 5),
    ("Murder on the Orient Express", 4, 2, 1934, 4),
    ("And Then There Were None", 4, 2, 1939, 4),
    ("The Shining", 5, 3, 1977, 5),
    ("It", 5, 3, 1986, 4),
    ("Carrie", 5, 3, 1974, 3),
    ("Misery", 5, 3, 1987, 2),
];

/// `(book_id, loan_date, returned)`
const SEED_LOANS: &[(i64, &str, bool)] = &[
    (1, "2025-05-27", false),
    (2, "2025-05-26", true),
    (3, "2025-05-25", false),
    (4, "2025-05-24", true),
    (5, "2025-05-23", false),
    (6, "2025-05-22", true),
    (7, "2025-05-21", false),
    (8, "2025-05-20", true),
    (9, "2025-05-19", false),
    (10, "2025-05-18", true),
];

/// Insert the fixed reference rows into every table that is still empty.
///
/// Emptiness is decided per table by a row count. All inserts share a single
/// transaction, so an interrupted first run never leaves a half-seeded table
/// behind that the row-count check would then skip forever.
pub fn seed_if_empty(conn: &mut Connection) -> Result<SeedReport> {
    let tx = conn
        .transaction()
        .context("failed to start seed transaction")?;
    let mut report = SeedReport::default();

    if row_count(&tx, "autores")? == 0 {
        let mut stmt = tx
            .prepare("INSERT INTO autores (nome) VALUES (?1)")
            .context("failed to prepare author seed")?;
        for name in SEED_AUTHORS {
            stmt.execute(params![name])
                .context("failed to seed author")?;
        }
        report.authors = SEED_AUTHORS.len();
    }

    if row_count(&tx, "categorias")? == 0 {
        let mut stmt = tx
            .prepare("INSERT INTO categorias (nome) VALUES (?1)")
            .context("failed to prepare category seed")?;
        for name in SEED_CATEGORIES {
            stmt.execute(params![name])
                .context("failed to seed category")?;
        }
        report.categories = SEED_CATEGORIES.len();
    }

    if row_count(&tx, "livros")? == 0 {
        let mut stmt = tx
            .prepare(
                "INSERT INTO livros (titulo, autor_id, categoria_id, ano, quantidade_disponivel)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .context("failed to prepare book seed")?;
        for (title, author_id, category_id, year, available) in SEED_BOOKS {
            stmt.execute(params![title, author_id, category_id, year, available])
                .context("failed to seed book")?;
        }
        report.books = SEED_BOOKS.len();
    }

    if row_count(&tx, "emprestimos")? == 0 {
        let mut stmt = tx
            .prepare(
                "INSERT INTO emprestimos (livro_id, data_emprestimo, devolvido)
                 VALUES (?1, ?2, ?3)",
            )
            .context("failed to prepare loan seed")?;
        for (book_id, loan_date, returned) in SEED_LOANS {
            stmt.execute(params![book_id, loan_date, returned])
                .context("failed to seed loan")?;
        }
        report.loans = SEED_LOANS.len();
    }

    tx.commit().context("failed to commit seed data")?;

    if report.is_empty() {
        debug!("store already seeded");
    } else {
        info!(
            authors = report.authors,
            categories = report.categories,
            books = report.books,
            loans = report.loans,
            "seeded empty tables"
        );
    }

    Ok(report)
}

fn row_count(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .with_context(|| format!("failed to count rows in {table}"))
}
