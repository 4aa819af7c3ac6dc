//! Presence and range checks shared by every mutation. Nothing in here writes
//! to the store; the persistence helpers run these first and only issue the
//! statement once all of them pass.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::ValidationError;

/// Tables whose rows other rows point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reference {
    Author,
    Category,
    Book,
}

impl Reference {
    fn table(self) -> &'static str {
        match self {
            Reference::Author => "autores",
            Reference::Category => "categorias",
            Reference::Book => "livros",
        }
    }

    fn entity(self) -> &'static str {
        match self {
            Reference::Author => "Author",
            Reference::Category => "Category",
            Reference::Book => "Book",
        }
    }
}

/// Trim `value` and reject it when nothing is left.
pub(crate) fn require_text<'a>(
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Missing { field })
    } else {
        Ok(trimmed)
    }
}

/// Unwrap an optional selection.
pub(crate) fn require_id(field: &'static str, value: Option<i64>) -> Result<i64, ValidationError> {
    value.ok_or(ValidationError::Missing { field })
}

pub(crate) fn require_at_least(
    field: &'static str,
    value: i64,
    min: i64,
) -> Result<i64, ValidationError> {
    if value < min {
        Err(ValidationError::BelowMinimum { field, min })
    } else {
        Ok(value)
    }
}

/// Confirm that `id` still exists in the referenced table. Lookup lists can
/// go stale between rendering a form and submitting it.
pub(crate) fn require_existing(conn: &Connection, reference: Reference, id: i64) -> Result<()> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", reference.table());
    let found = conn
        .query_row(&sql, params![id], |_| Ok(()))
        .optional()
        .with_context(|| format!("failed to look up {} {id}", reference.entity()))?;

    match found {
        Some(()) => Ok(()),
        None => Err(ValidationError::UnknownReference {
            entity: reference.entity(),
            id,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed_and_blank_is_rejected() {
        assert_eq!(require_text("Title", "  Dune "), Ok("Dune"));
        assert_eq!(
            require_text("Title", "   "),
            Err(ValidationError::Missing { field: "Title" })
        );
        assert_eq!(
            require_text("Title", ""),
            Err(ValidationError::Missing { field: "Title" })
        );
    }

    #[test]
    fn missing_selection_is_rejected() {
        assert_eq!(require_id("Author", Some(3)), Ok(3));
        assert_eq!(
            require_id("Author", None),
            Err(ValidationError::Missing { field: "Author" })
        );
    }

    #[test]
    fn minimum_is_inclusive() {
        assert_eq!(require_at_least("Year", 1, 1), Ok(1));
        assert_eq!(require_at_least("Available copies", 0, 0), Ok(0));
        assert_eq!(
            require_at_least("Year", 0, 1),
            Err(ValidationError::BelowMinimum {
                field: "Year",
                min: 1
            })
        );
        assert_eq!(
            require_at_least("Available copies", -2, 0),
            Err(ValidationError::BelowMinimum {
                field: "Available copies",
                min: 0
            })
        );
    }

    #[test]
    fn existing_reference_is_accepted_and_missing_one_reported() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE autores (id INTEGER PRIMARY KEY AUTOINCREMENT, nome TEXT NOT NULL);
             INSERT INTO autores (nome) VALUES ('Ursula K. Le Guin');",
        )
        .unwrap();

        require_existing(&conn, Reference::Author, 1).unwrap();

        let err = require_existing(&conn, Reference::Author, 42).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::UnknownReference {
                entity: "Author",
                id: 42
            })
        );
    }
}
