use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::models::SeedReport;

use super::seed::seed_if_empty;

/// Open (creating when needed) the store at `path`, make sure all four tables
/// exist, and seed any empty table. Safe to call on every startup.
pub fn open_store(path: &Path) -> Result<(Connection, SeedReport)> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let mut conn = Connection::open(path).context("failed to open SQLite database")?;
    info!(path = %path.display(), "opened library store");

    let report = initialize(&mut conn)?;
    Ok((conn, report))
}

/// Prepare an already opened connection: schema first, then seed data.
pub fn initialize(conn: &mut Connection) -> Result<SeedReport> {
    ensure_schema(conn)?;
    seed_if_empty(conn)
}

/// Create the four tables when absent. Foreign-key enforcement is switched off
/// explicitly: deleting an author or category must leave the referencing books
/// in place with their old ids, and the `FOREIGN KEY` clauses are kept only so
/// the file layout stays identical to existing stores.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = OFF", [])
        .context("failed to disable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS autores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create autores table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS categorias (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create categorias table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS livros (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            titulo TEXT NOT NULL,
            autor_id INTEGER NOT NULL,
            categoria_id INTEGER NOT NULL,
            ano INTEGER NOT NULL,
            quantidade_disponivel INTEGER NOT NULL,
            FOREIGN KEY (autor_id) REFERENCES autores(id),
            FOREIGN KEY (categoria_id) REFERENCES categorias(id)
        )",
        [],
    )
    .context("failed to create livros table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS emprestimos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            livro_id INTEGER NOT NULL,
            data_emprestimo TEXT NOT NULL,
            devolvido boolean NOT NULL,
            FOREIGN KEY (livro_id) REFERENCES livros(id)
        )",
        [],
    )
    .context("failed to create emprestimos table")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn schema_creates_all_tables_and_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(
            table_names(&conn),
            vec!["autores", "categorias", "emprestimos", "livros"]
        );
    }

    #[test]
    fn foreign_keys_stay_disabled() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 0);
    }

    #[test]
    fn open_store_creates_missing_directories() {
        let dir = std::env::temp_dir().join(format!(
            "library-manager-open-{}-{}",
            std::process::id(),
            line!()
        ));
        let path = dir.join("nested").join("biblioteca.db");
        let _ = fs::remove_dir_all(&dir);

        let (conn, report) = open_store(&path).unwrap();
        assert!(path.exists());
        assert!(!report.is_empty());
        drop(conn);

        let (_conn, second) = open_store(&path).unwrap();
        assert!(second.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }
}
