use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::screens::CatalogRow;
use crate::models::BookListing;

/// Column widths of the book tables: id, title, author, category, year, copies.
pub(crate) const BOOK_COLUMNS: [usize; 6] = [4, 40, 22, 20, 4, 6];

/// Pad or cut `text` to exactly `width` characters, marking cuts with `~`.
pub(crate) fn fit_column(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        let mut padded = String::with_capacity(width);
        padded.push_str(text);
        padded.extend(std::iter::repeat(' ').take(width - count));
        return padded;
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('~');
    cut
}

pub(crate) fn book_header_line() -> String {
    book_line(["#", "Title", "Author", "Category", "Year", "Copies"])
}

pub(crate) fn catalog_line(row: &CatalogRow) -> String {
    book_line([
        &row.id.to_string(),
        &row.title,
        &row.author,
        &row.category,
        &row.year.to_string(),
        &row.available_count.to_string(),
    ])
}

pub(crate) fn listing_line(listing: &BookListing) -> String {
    book_line([
        &listing.id.to_string(),
        &listing.title,
        &listing.author,
        &listing.category,
        &listing.year.to_string(),
        &listing.available_count.to_string(),
    ])
}

fn book_line(cells: [&str; 6]) -> String {
    cells
        .iter()
        .zip(BOOK_COLUMNS)
        .map(|(cell, width)| fit_column(cell, width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn fit_column_pads_and_cuts_by_characters() {
        assert_eq!(fit_column("It", 4), "It  ");
        assert_eq!(fit_column("Mistério", 8), "Mistério");
        assert_eq!(fit_column("Ficção Científica", 6), "Ficçã~");
        assert_eq!(fit_column("abc", 0), "");
    }

    #[test]
    fn book_lines_align_with_header() {
        let listing = BookListing {
            id: 10,
            title: "It".into(),
            author: "Stephen King".into(),
            category: "Terror".into(),
            year: 1986,
            available_count: 4,
        };
        let header = book_header_line();
        let line = listing_line(&listing);

        assert_eq!(header.find("Author"), line.find("Stephen King"));
        assert_eq!(header.find("Year"), line.find("1986"));
        assert!(line.ends_with('4'));
    }

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = Err::<(), _>(ValidationError::Missing { field: "Title" })
            .context("failed to save book")
            .unwrap_err();
        assert_eq!(surface_error(&err), "Title is required.");

        let plain = anyhow!("Book not found");
        assert_eq!(surface_error(&plain), "Book not found");
    }
}
