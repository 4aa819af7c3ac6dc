use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::models::{Loan, LoanDraft};
use crate::validation::{require_existing, require_id, Reference};

/// Every loan record, most recent first.
pub fn fetch_loans(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, livro_id, data_emprestimo, devolvido
             FROM emprestimos
             ORDER BY data_emprestimo DESC, id DESC",
        )
        .context("failed to prepare loan query")?;

    let loans = stmt
        .query_map([], |row| {
            Ok(Loan {
                id: row.get(0)?,
                book_id: row.get(1)?,
                loan_date: row.get(2)?,
                returned: row.get(3)?,
            })
        })
        .context("failed to load loans")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect loans")?;

    Ok(loans)
}

/// Record a loan. A draft without a book (nothing was selectable) or pointing
/// at a book that no longer exists is rejected before the insert.
pub fn create_loan(conn: &Connection, draft: &LoanDraft) -> Result<Loan> {
    let book_id =
        validate_book(conn, draft.book_id).inspect_err(|err| warn!(%err, "rejected new loan"))?;

    conn.execute(
        "INSERT INTO emprestimos (livro_id, data_emprestimo, devolvido)
         VALUES (?1, ?2, ?3)",
        params![book_id, draft.loan_date, draft.returned],
    )
    .context("failed to insert loan")?;

    let loan = Loan {
        id: conn.last_insert_rowid(),
        book_id,
        loan_date: draft.loan_date,
        returned: draft.returned,
    };
    info!(
        loan_id = loan.id,
        book_id,
        date = %loan.loan_date,
        returned = loan.returned,
        "created loan"
    );
    Ok(loan)
}

fn validate_book(conn: &Connection, book_id: Option<i64>) -> Result<i64> {
    let book_id = require_id("Book", book_id)?;
    require_existing(conn, Reference::Book, book_id)?;
    Ok(book_id)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::{delete_book, test_store};
    use crate::error::ValidationError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seeded_loans_are_newest_first() {
        let conn = test_store();
        let loans = fetch_loans(&conn).unwrap();

        assert_eq!(loans.len(), 10);
        assert_eq!(loans[0].loan_date, date(2025, 5, 27));
        assert_eq!(loans[9].loan_date, date(2025, 5, 18));
        assert_eq!(loans.iter().filter(|loan| loan.returned).count(), 5);
    }

    #[test]
    fn create_stores_date_as_iso_text() {
        let conn = test_store();
        let loan = create_loan(
            &conn,
            &LoanDraft {
                book_id: Some(12),
                loan_date: date(2026, 1, 9),
                returned: false,
            },
        )
        .unwrap();

        assert_eq!(loan.id, 11);
        let stored: String = conn
            .query_row(
                "SELECT data_emprestimo FROM emprestimos WHERE id = ?1",
                [loan.id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, "2026-01-09");
        assert_eq!(fetch_loans(&conn).unwrap()[0], loan);
    }

    #[test]
    fn missing_book_is_rejected() {
        let conn = test_store();
        let err = create_loan(
            &conn,
            &LoanDraft {
                book_id: None,
                loan_date: date(2026, 1, 9),
                returned: true,
            },
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::Missing { field: "Book" })
        );
        assert_eq!(fetch_loans(&conn).unwrap().len(), 10);
    }

    #[test]
    fn deleted_book_is_rejected() {
        let conn = test_store();
        delete_book(&conn, 7).unwrap();

        let err = create_loan(
            &conn,
            &LoanDraft {
                book_id: Some(7),
                loan_date: date(2026, 1, 9),
                returned: false,
            },
        )
        .unwrap_err();

        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::UnknownReference {
                entity: "Book",
                id: 7
            })
        );
    }
}
