use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rusqlite::Connection;

use library_manager::db::{
    create_book, create_loan, delete_author, delete_book, fetch_authors, fetch_book_listings,
    fetch_books, fetch_books_in_years, fetch_books_per_category, fetch_loans, fetch_totals,
    fetch_year_bounds, update_book,
};
use library_manager::models::{BookDraft, BookListing, BookUpdate, LoanDraft, YearRange};
use library_manager::{initialize, open_store, ValidationError};

fn seeded_store() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    initialize(&mut conn).unwrap();
    conn
}

fn validation_error(err: &anyhow::Error) -> Option<&ValidationError> {
    err.downcast_ref::<ValidationError>()
}

#[test]
fn initializing_twice_seeds_once() {
    let mut conn = Connection::open_in_memory().unwrap();
    let first = initialize(&mut conn).unwrap();
    let second = initialize(&mut conn).unwrap();

    assert_eq!((first.authors, first.books, first.loans), (5, 12, 10));
    assert!(second.is_empty());
    assert_eq!(fetch_books(&conn).unwrap().len(), 12);
    assert_eq!(fetch_loans(&conn).unwrap().len(), 10);
}

#[test]
fn store_file_survives_reopening() {
    let dir = std::env::temp_dir().join(format!("library-manager-it-{}", std::process::id()));
    let path = dir.join("nested").join("biblioteca.db");
    let _ = std::fs::remove_dir_all(&dir);

    let (conn, seeded) = open_store(&path).unwrap();
    assert!(!seeded.is_empty());
    create_book(
        &conn,
        &BookDraft {
            title: "Fire & Blood".into(),
            author_id: Some(2),
            category_id: Some(1),
            year: 2018,
            available_count: 1,
        },
    )
    .unwrap();
    drop(conn);

    let (conn, seeded) = open_store(&path).unwrap();
    assert!(seeded.is_empty());
    assert_eq!(fetch_books(&conn).unwrap().len(), 13);

    drop(conn);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn listings_resolve_author_and_category_names() {
    let conn = seeded_store();
    let listings = fetch_book_listings(&conn).unwrap();

    assert_eq!(listings.len(), 12);
    assert_eq!(
        listings[10],
        BookListing {
            id: 11,
            title: "Carrie".into(),
            author: "Stephen King".into(),
            category: "Terror".into(),
            year: 1974,
            available_count: 3,
        }
    );
}

#[test]
fn year_range_is_inclusive_and_sorted() {
    let conn = seeded_store();
    let bounds = fetch_year_bounds(&conn).unwrap();
    assert_eq!(bounds, Some(YearRange::new(1934, 1998)));

    let range = YearRange::new(1937, 1954);
    let listings = fetch_books_in_years(&conn, range).unwrap();
    let years: Vec<i64> = listings.iter().map(|listing| listing.year).collect();

    assert_eq!(years, vec![1937, 1939, 1954]);
    assert!(listings
        .iter()
        .all(|listing| (range.start..=range.end).contains(&listing.year)));
    assert!(fetch_books_in_years(&conn, YearRange::new(1999, 2100))
        .unwrap()
        .is_empty());
}

#[test]
fn invalid_submissions_leave_the_store_untouched() {
    let conn = seeded_store();
    let before = fetch_books(&conn).unwrap();

    let err = create_book(
        &conn,
        &BookDraft {
            title: "   ".into(),
            author_id: Some(1),
            category_id: Some(1),
            year: 2000,
            available_count: 1,
        },
    )
    .unwrap_err();
    assert_eq!(
        validation_error(&err),
        Some(&ValidationError::Missing { field: "Title" })
    );

    let err = create_book(
        &conn,
        &BookDraft {
            title: "The Silmarillion".into(),
            author_id: Some(3),
            category_id: None,
            year: 1977,
            available_count: 2,
        },
    )
    .unwrap_err();
    assert_eq!(
        validation_error(&err),
        Some(&ValidationError::Missing { field: "Category" })
    );

    let err = update_book(
        &conn,
        5,
        &BookUpdate {
            title: "The Hobbit".into(),
            author_id: Some(3),
            category_id: Some(1),
            available_count: -1,
        },
    )
    .unwrap_err();
    assert_eq!(
        validation_error(&err),
        Some(&ValidationError::BelowMinimum {
            field: "Available copies",
            min: 0,
        })
    );

    let err = create_loan(
        &conn,
        &LoanDraft {
            book_id: None,
            loan_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            returned: false,
        },
    )
    .unwrap_err();
    assert_eq!(
        validation_error(&err),
        Some(&ValidationError::Missing { field: "Book" })
    );

    assert_eq!(fetch_books(&conn).unwrap(), before);
    assert_eq!(fetch_loans(&conn).unwrap().len(), 10);
}

#[test]
fn unknown_ids_are_not_validation_errors() {
    let conn = seeded_store();
    let err = delete_book(&conn, 404).unwrap_err();

    assert!(validation_error(&err).is_none());
    assert_eq!(err.to_string(), "Book not found");
}

#[test]
fn deleting_an_author_does_not_cascade() {
    let conn = seeded_store();
    delete_author(&conn, 4).unwrap();

    assert_eq!(fetch_authors(&conn).unwrap().len(), 4);
    let books = fetch_books(&conn).unwrap();
    assert_eq!(books.len(), 12);
    assert!(books.iter().any(|book| book.author_id == 4));

    let listings = fetch_book_listings(&conn).unwrap();
    assert_eq!(listings.len(), 10);
    assert!(listings
        .iter()
        .all(|listing| listing.author != "Agatha Christie"));

    let counts = fetch_books_per_category(&conn).unwrap();
    assert_eq!(counts[1].category, "Mistério");
    assert_eq!(counts[1].book_count, 2);
}

#[test]
fn deleting_a_book_keeps_its_loans_in_totals() {
    let conn = seeded_store();
    delete_book(&conn, 1).unwrap();

    let totals = fetch_totals(&conn).unwrap();
    assert_eq!(totals.available_copies, 43);
    assert_eq!(totals.loans, 10);
    assert_eq!(totals.returned_loans, 5);
}

#[test]
fn aggregates_follow_mutations() {
    let conn = seeded_store();
    let totals = fetch_totals(&conn).unwrap();
    assert_eq!(
        (totals.available_copies, totals.loans, totals.returned_loans),
        (48, 10, 5)
    );

    create_loan(
        &conn,
        &LoanDraft {
            book_id: Some(12),
            loan_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            returned: true,
        },
    )
    .unwrap();
    update_book(
        &conn,
        12,
        &BookUpdate {
            title: "Misery".into(),
            author_id: Some(5),
            category_id: Some(5),
            available_count: 7,
        },
    )
    .unwrap();

    let totals = fetch_totals(&conn).unwrap();
    assert_eq!(
        (totals.available_copies, totals.loans, totals.returned_loans),
        (53, 11, 6)
    );

    let counts: Vec<i64> = fetch_books_per_category(&conn)
        .unwrap()
        .iter()
        .map(|count| count.book_count)
        .collect();
    assert_eq!(counts, vec![6, 2, 3, 0, 1]);

    let newest = &fetch_loans(&conn).unwrap()[0];
    assert_eq!(newest.book_id, 12);
}
