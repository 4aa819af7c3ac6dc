use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::models::Author;
use crate::validation::require_text;

/// Id/name pairs for every author, in insertion order. Feeds the author pickers
/// and the authors screen.
pub fn fetch_authors(conn: &Connection) -> Result<Vec<Author>> {
    let mut stmt = conn
        .prepare("SELECT id, nome FROM autores ORDER BY id")
        .context("failed to prepare author query")?;

    let authors = stmt
        .query_map([], |row| {
            Ok(Author {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .context("failed to load authors")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect authors")?;

    Ok(authors)
}

/// Replace an author's name. Surrounding whitespace is dropped and a blank
/// name is rejected before the update runs. Fails with "Author not found"
/// when no row has `id`.
pub fn rename_author(conn: &Connection, id: i64, name: &str) -> Result<()> {
    let name = require_text("Author name", name)
        .inspect_err(|err| warn!(author_id = id, %err, "rejected author rename"))?;

    let updated = conn
        .execute(
            "UPDATE autores SET nome = ?1 WHERE id = ?2",
            params![name, id],
        )
        .context("failed to update author")?;

    if updated == 0 {
        Err(anyhow!("Author not found"))
    } else {
        info!(author_id = id, name, "renamed author");
        Ok(())
    }
}

/// Remove an author row. Books written by the author are left untouched and
/// keep pointing at the deleted id, which hides them from joined listings.
/// Deleting an id that no longer exists fails with "Author not found".
pub fn delete_author(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM autores WHERE id = ?1", params![id])
        .context("failed to delete author")?;

    if deleted == 0 {
        Err(anyhow!("Author not found"))
    } else {
        info!(author_id = id, "deleted author");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_store;
    use crate::error::ValidationError;

    #[test]
    fn lists_seeded_authors_in_order() {
        let conn = test_store();
        let authors = fetch_authors(&conn).unwrap();

        assert_eq!(authors.len(), 5);
        assert_eq!(
            authors[0],
            Author {
                id: 1,
                name: "J.K. Rowling".into()
            }
        );
        assert_eq!(authors[4].name, "Stephen King");
    }

    #[test]
    fn rename_trims_and_stores_new_name() {
        let conn = test_store();
        rename_author(&conn, 3, "  John Ronald Reuel Tolkien ").unwrap();

        let authors = fetch_authors(&conn).unwrap();
        assert_eq!(authors[2].name, "John Ronald Reuel Tolkien");
    }

    #[test]
    fn blank_rename_is_rejected_without_writing() {
        let conn = test_store();
        let err = rename_author(&conn, 1, "   ").unwrap_err();

        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::Missing {
                field: "Author name"
            })
        );
        assert_eq!(fetch_authors(&conn).unwrap()[0].name, "J.K. Rowling");
    }

    #[test]
    fn rename_of_unknown_author_fails() {
        let conn = test_store();
        let err = rename_author(&conn, 99, "Nobody").unwrap_err();
        assert_eq!(err.to_string(), "Author not found");
    }

    #[test]
    fn delete_of_unknown_author_fails() {
        let conn = test_store();
        let err = delete_author(&conn, 99).unwrap_err();

        assert!(err.downcast_ref::<ValidationError>().is_none());
        assert_eq!(err.to_string(), "Author not found");
        assert_eq!(fetch_authors(&conn).unwrap().len(), 5);
    }

    #[test]
    fn delete_removes_only_the_author_row() {
        let conn = test_store();
        delete_author(&conn, 4).unwrap();

        let authors = fetch_authors(&conn).unwrap();
        assert_eq!(authors.len(), 4);
        assert!(authors.iter().all(|author| author.id != 4));

        let books_by_deleted: i64 = conn
            .query_row("SELECT COUNT(*) FROM livros WHERE autor_id = 4", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(books_by_deleted, 2);

        assert!(delete_author(&conn, 4).is_err());
    }
}
