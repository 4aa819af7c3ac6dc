use std::mem;

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::db::{
    create_book, create_loan, delete_author, delete_book, fetch_authors, fetch_book_listings,
    fetch_book_titles, fetch_books, fetch_books_in_years, fetch_books_per_category,
    fetch_categories, fetch_loans, fetch_totals, fetch_year_bounds, rename_author, update_book,
};
use crate::models::{
    Author, Book, BookListing, BookTitle, Category, CategoryCount, LibraryTotals, Loan,
};

use super::forms::{
    AuthorForm, BookForm, ConfirmAuthorDelete, ConfirmBookDelete, LoanField, LoanForm,
    DATE_FORMAT,
};
use super::helpers::{
    book_header_line, catalog_line, centered_rect, fit_column, listing_line, surface_error,
};
use super::screens::{catalog_rows, CatalogScreen, Selection, Tab, YearFilter};

/// Height of the tab bar at the top of the screen.
const TABS_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp / PageDown.
const PAGE_STEP: isize = 10;
const HIGHLIGHT_SYMBOL: &str = "▶ ";

/// What the keyboard currently drives: the active tab or one of the dialogs.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook { id: i64, form: BookForm },
    ConfirmBookDelete(ConfirmBookDelete),
    AddingLoan(LoanForm),
    RenamingAuthor(AuthorForm),
    ConfirmAuthorDelete(ConfirmAuthorDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. Every view is a snapshot
/// of the store, refreshed as a whole after each successful write.
pub struct App {
    conn: Connection,
    tab: Tab,
    mode: Mode,
    status: Option<StatusMessage>,
    books: Vec<Book>,
    listings: Vec<BookListing>,
    authors: Vec<Author>,
    categories: Vec<Category>,
    book_titles: Vec<BookTitle>,
    loans: Vec<Loan>,
    totals: LibraryTotals,
    category_counts: Vec<CategoryCount>,
    catalog: CatalogScreen,
    year_filter: YearFilter,
    year_listings: Vec<BookListing>,
    author_selection: Selection,
    loan_selection: Selection,
}

impl App {
    /// Take ownership of an initialized store and load every view.
    pub fn new(conn: Connection) -> Result<Self> {
        let mut app = Self {
            conn,
            tab: Tab::Catalog,
            mode: Mode::Normal,
            status: None,
            books: Vec::new(),
            listings: Vec::new(),
            authors: Vec::new(),
            categories: Vec::new(),
            book_titles: Vec::new(),
            loans: Vec::new(),
            totals: LibraryTotals::default(),
            category_counts: Vec::new(),
            catalog: CatalogScreen::default(),
            year_filter: YearFilter::default(),
            year_listings: Vec::new(),
            author_selection: Selection::default(),
            loan_selection: Selection::default(),
        };
        app.reload()?;
        Ok(app)
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_book_form(code, None, form)?,
            Mode::EditingBook { id, form } => self.handle_book_form(code, Some(id), form)?,
            Mode::ConfirmBookDelete(confirm) => self.handle_confirm_book_delete(code, confirm)?,
            Mode::AddingLoan(form) => self.handle_loan_form(code, form)?,
            Mode::RenamingAuthor(form) => self.handle_rename_author(code, form)?,
            Mode::ConfirmAuthorDelete(confirm) => {
                self.handle_confirm_author_delete(code, confirm)?
            }
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => {
                self.switch_tab(self.tab.next());
                return Ok(Mode::Normal);
            }
            KeyCode::BackTab => {
                self.switch_tab(self.tab.previous());
                return Ok(Mode::Normal);
            }
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if let Some(tab) = Tab::from_digit(ch) {
                    self.switch_tab(tab);
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.tab {
            Tab::Catalog => self.handle_catalog_key(code),
            Tab::ByYear => self.handle_year_key(code),
            Tab::Summary => {
                if code == KeyCode::Char('r') {
                    self.reload()?;
                    self.set_status("Summary refreshed.", StatusKind::Info);
                }
                Ok(Mode::Normal)
            }
            Tab::Authors => Ok(self.handle_authors_key(code)),
            Tab::Loans => Ok(self.handle_loans_key(code)),
        }
    }

    fn handle_catalog_key(&mut self, code: KeyCode) -> Result<Mode> {
        let len = self.catalog.rows.len();
        match code {
            KeyCode::Up => self.catalog.selection.move_by(-1, len),
            KeyCode::Down => self.catalog.selection.move_by(1, len),
            KeyCode::PageUp => self.catalog.selection.move_by(-PAGE_STEP, len),
            KeyCode::PageDown => self.catalog.selection.move_by(PAGE_STEP, len),
            KeyCode::Home => self.catalog.selection.first(),
            KeyCode::End => self.catalog.selection.last(len),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::new(
                    &self.authors,
                    &self.categories,
                )));
            }
            KeyCode::Char('e') => return Ok(self.open_edit_book()),
            KeyCode::Char('d') => return Ok(self.open_delete_book()),
            KeyCode::Char('l') => {
                let preselect = self.catalog.current_row().map(|row| row.id);
                return Ok(self.open_new_loan(preselect));
            }
            KeyCode::Char('o') => {
                let showing_all = self.catalog.toggle_unlinked();
                self.rebuild_catalog();
                let message = if showing_all {
                    "Showing every book row, including missing authors or categories."
                } else {
                    "Showing books with a known author and category."
                };
                self.set_status(message, StatusKind::Info);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_year_key(&mut self, code: KeyCode) -> Result<Mode> {
        let changed = match code {
            KeyCode::Left => {
                self.year_filter.shift_start(-1);
                true
            }
            KeyCode::Right => {
                self.year_filter.shift_start(1);
                true
            }
            KeyCode::Down => {
                self.year_filter.shift_end(-1);
                true
            }
            KeyCode::Up => {
                self.year_filter.shift_end(1);
                true
            }
            KeyCode::Char('r') => {
                self.year_filter.reset();
                true
            }
            _ => false,
        };

        if changed {
            self.refresh_year_listings()?;
        }
        Ok(Mode::Normal)
    }

    fn handle_authors_key(&mut self, code: KeyCode) -> Mode {
        let len = self.authors.len();
        match code {
            KeyCode::Up => self.author_selection.move_by(-1, len),
            KeyCode::Down => self.author_selection.move_by(1, len),
            KeyCode::Home => self.author_selection.first(),
            KeyCode::End => self.author_selection.last(len),
            KeyCode::Char('r') | KeyCode::Char('e') => {
                if let Some(author) = self.current_author() {
                    let form = AuthorForm::from_author(author);
                    self.clear_status();
                    return Mode::RenamingAuthor(form);
                }
                self.set_status("No author selected.", StatusKind::Error);
            }
            KeyCode::Char('d') => {
                if let Some(author) = self.current_author() {
                    let confirm = ConfirmAuthorDelete {
                        id: author.id,
                        name: author.name.clone(),
                        book_count: self.books_by_author(author.id),
                    };
                    return Mode::ConfirmAuthorDelete(confirm);
                }
                self.set_status("No author selected.", StatusKind::Error);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_loans_key(&mut self, code: KeyCode) -> Mode {
        let len = self.loans.len();
        match code {
            KeyCode::Up => self.loan_selection.move_by(-1, len),
            KeyCode::Down => self.loan_selection.move_by(1, len),
            KeyCode::PageUp => self.loan_selection.move_by(-PAGE_STEP, len),
            KeyCode::PageDown => self.loan_selection.move_by(PAGE_STEP, len),
            KeyCode::Home => self.loan_selection.first(),
            KeyCode::End => self.loan_selection.last(len),
            KeyCode::Char('+') | KeyCode::Char('a') => return self.open_new_loan(None),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_book_form(
        &mut self,
        code: KeyCode,
        id: Option<i64>,
        mut form: BookForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if id.is_some() {
                    "Edit cancelled."
                } else {
                    "New book cancelled."
                };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => {
                form.cycle(false);
            }
            KeyCode::Right => {
                form.cycle(true);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let saved = match id {
                    Some(id) => self.save_existing_book(id, &form),
                    None => self.save_new_book(&form),
                };
                match saved {
                    Ok(_) => keep_open = false,
                    Err(err) => {
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if !keep_open {
            return Ok(Mode::Normal);
        }
        Ok(match id {
            Some(id) => Mode::EditingBook { id, form },
            None => Mode::AddingBook(form),
        })
    }

    fn handle_confirm_book_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmBookDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_book_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmBookDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmBookDelete(confirm)),
        }
    }

    fn handle_loan_form(&mut self, code: KeyCode, mut form: LoanForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("New loan cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Left => {
                form.cycle(false);
            }
            KeyCode::Right => {
                form.cycle(true);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_loan(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingLoan(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_rename_author(&mut self, code: KeyCode, mut form: AuthorForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Rename cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_author_name(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::RenamingAuthor(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_author_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmAuthorDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_author_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmAuthorDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmAuthorDelete(confirm)),
        }
    }

    fn open_edit_book(&mut self) -> Mode {
        let Some(id) = self.catalog.current_row().map(|row| row.id) else {
            self.set_status("No book selected.", StatusKind::Error);
            return Mode::Normal;
        };
        match self.books.iter().find(|book| book.id == id) {
            Some(book) => {
                let form = BookForm::for_book(book, &self.authors, &self.categories);
                self.clear_status();
                Mode::EditingBook { id, form }
            }
            None => {
                self.set_status("Book not found.", StatusKind::Error);
                Mode::Normal
            }
        }
    }

    fn open_delete_book(&mut self) -> Mode {
        match self.catalog.current_row() {
            Some(row) => Mode::ConfirmBookDelete(ConfirmBookDelete {
                id: row.id,
                title: row.title.clone(),
                loan_count: self.loans.iter().filter(|loan| loan.book_id == row.id).count(),
            }),
            None => {
                self.set_status("No book selected.", StatusKind::Error);
                Mode::Normal
            }
        }
    }

    /// The form opens even without books; submitting it then reports the
    /// missing book through the usual validation path.
    fn open_new_loan(&mut self, preselect: Option<i64>) -> Mode {
        self.clear_status();
        let today = Local::now().date_naive();
        Mode::AddingLoan(LoanForm::new(&self.book_titles, today, preselect))
    }

    // The save and delete helpers only return `Err` when nothing was written.
    // Once the store accepted a change, the dialog closes even if the refresh
    // that follows fails.

    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let draft = form.parse_draft()?;
        let book = create_book(&self.conn, &draft)?;
        self.finish_write(format!("Added '{}'.", book.title));
        self.catalog.focus(book.id);
        Ok(())
    }

    fn save_existing_book(&mut self, id: i64, form: &BookForm) -> Result<()> {
        let update = form.parse_update()?;
        update_book(&self.conn, id, &update)?;
        self.finish_write(format!("Updated '{}'.", update.title.trim()));
        self.catalog.focus(id);
        Ok(())
    }

    fn perform_book_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        delete_book(&self.conn, confirm.id)?;
        self.finish_write(format!("Deleted '{}'.", confirm.title));
        Ok(())
    }

    fn save_new_loan(&mut self, form: &LoanForm) -> Result<()> {
        let draft = form.parse()?;
        let loan = create_loan(&self.conn, &draft)?;
        let message = format!(
            "Recorded loan of '{}' on {}.",
            self.book_title(loan.book_id),
            loan.loan_date.format(DATE_FORMAT)
        );
        self.finish_write(message);
        Ok(())
    }

    fn save_author_name(&mut self, form: &AuthorForm) -> Result<()> {
        rename_author(&self.conn, form.id, &form.name)?;
        self.finish_write(format!("Renamed '{}' to '{}'.", form.current_name, form.name.trim()));
        Ok(())
    }

    fn perform_author_delete(&mut self, confirm: &ConfirmAuthorDelete) -> Result<()> {
        delete_author(&self.conn, confirm.id)?;
        self.finish_write(format!("Deleted '{}'.", confirm.name));
        Ok(())
    }

    /// Reload after a successful write. A failed reload only changes the
    /// footer message; the write itself stands.
    fn finish_write(&mut self, message: String) {
        match self.reload() {
            Ok(()) => self.set_status(message, StatusKind::Info),
            Err(err) => {
                warn!(error = ?err, "change saved but views could not be reloaded");
                self.set_status(
                    format!("{message} Refreshing the views failed: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    /// Re-read every view from the store.
    fn reload(&mut self) -> Result<()> {
        self.books = fetch_books(&self.conn)?;
        self.listings = fetch_book_listings(&self.conn)?;
        self.authors = fetch_authors(&self.conn)?;
        self.categories = fetch_categories(&self.conn)?;
        self.book_titles = fetch_book_titles(&self.conn)?;
        self.loans = fetch_loans(&self.conn)?;
        self.totals = fetch_totals(&self.conn)?;
        self.category_counts = fetch_books_per_category(&self.conn)?;

        self.rebuild_catalog();
        self.year_filter.set_bounds(fetch_year_bounds(&self.conn)?);
        self.refresh_year_listings()?;
        self.author_selection.clamp(self.authors.len());
        self.loan_selection.clamp(self.loans.len());

        debug!(
            books = self.books.len(),
            listed = self.listings.len(),
            loans = self.loans.len(),
            "reloaded library views"
        );
        Ok(())
    }

    fn rebuild_catalog(&mut self) {
        let rows = catalog_rows(
            &self.listings,
            &self.books,
            &self.authors,
            &self.categories,
            self.catalog.include_unlinked,
        );
        self.catalog.set_rows(rows);
    }

    fn refresh_year_listings(&mut self) -> Result<()> {
        self.year_listings = match self.year_filter.range() {
            Some(range) => fetch_books_in_years(&self.conn, range)?,
            None => Vec::new(),
        };
        Ok(())
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.clear_status();
    }

    fn current_author(&self) -> Option<&Author> {
        self.authors.get(self.author_selection.index)
    }

    fn books_by_author(&self, author_id: i64) -> usize {
        self.books
            .iter()
            .filter(|book| book.author_id == author_id)
            .count()
    }

    fn book_title(&self, book_id: i64) -> String {
        self.book_titles
            .iter()
            .find(|book| book.id == book_id)
            .map(|book| book.title.clone())
            .unwrap_or_else(|| format!("<deleted book #{book_id}>"))
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TABS_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Catalog => self.draw_catalog(frame, chunks[1]),
            Tab::ByYear => self.draw_by_year(frame, chunks[1]),
            Tab::Summary => self.draw_summary(frame, chunks[1]),
            Tab::Authors => self.draw_authors(frame, chunks[1]),
            Tab::Loans => self.draw_loans(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "New Book", form),
            Mode::EditingBook { form, .. } => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmBookDelete(confirm) => self.draw_confirm_book_delete(frame, area, confirm),
            Mode::AddingLoan(form) => self.draw_loan_form(frame, area, form),
            Mode::RenamingAuthor(form) => self.draw_author_form(frame, area, form),
            Mode::ConfirmAuthorDelete(confirm) => {
                self.draw_confirm_author_delete(frame, area, confirm)
            }
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()))
            .block(Block::default().borders(Borders::ALL).title("Biblioteca"))
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_catalog(&self, frame: &mut Frame, area: Rect) {
        let hidden = self.books.len().saturating_sub(self.listings.len());
        let title = if self.catalog.include_unlinked {
            format!("All book rows ({})", self.catalog.rows.len())
        } else if hidden > 0 {
            format!(
                "Books ({}, {hidden} hidden: missing author or category, press o)",
                self.catalog.rows.len()
            )
        } else {
            format!("Books ({})", self.catalog.rows.len())
        };

        render_list(
            frame,
            area,
            title,
            Some(book_header_line()),
            self.catalog.rows.iter().map(catalog_line).collect(),
            Some(self.catalog.selection.index),
            "No books yet. Press '+' to add one.",
        );
    }

    fn draw_by_year(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        let range_lines = match (self.year_filter.range(), self.year_filter.bounds()) {
            (Some(range), Some(bounds)) => vec![
                Line::from(vec![
                    Span::raw("Published from "),
                    Span::styled(
                        range.start.to_string(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" to "),
                    Span::styled(
                        range.end.to_string(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("Catalog spans {bounds}"),
                    Style::default().fg(Color::Gray),
                )),
            ],
            _ => vec![Line::from("No books in the catalog.")],
        };
        let range_panel = Paragraph::new(range_lines)
            .block(Block::default().borders(Borders::ALL).title("Year range"));
        frame.render_widget(range_panel, chunks[0]);

        render_list(
            frame,
            chunks[1],
            format!("Books in range ({})", self.year_listings.len()),
            Some(book_header_line()),
            self.year_listings.iter().map(listing_line).collect(),
            None,
            "No books published in this range.",
        );
    }

    fn draw_summary(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let value_style = Style::default().add_modifier(Modifier::BOLD);
        let metrics = Paragraph::new(vec![
            Line::from(vec![
                Span::raw("Available copies:  "),
                Span::styled(self.totals.available_copies.to_string(), value_style),
            ]),
            Line::from(vec![
                Span::raw("Loans recorded:    "),
                Span::styled(self.totals.loans.to_string(), value_style),
            ]),
            Line::from(vec![
                Span::raw("Loans returned:    "),
                Span::styled(self.totals.returned_loans.to_string(), value_style),
            ]),
        ])
        .block(Block::default().borders(Borders::ALL).title("Totals"));
        frame.render_widget(metrics, chunks[0]);

        render_list(
            frame,
            chunks[1],
            "Books per category".to_string(),
            Some(format!("{}  Books", fit_column("Category", 24))),
            self.category_counts
                .iter()
                .map(|count| {
                    format!(
                        "{}  {:>5}",
                        fit_column(&count.category, 24),
                        count.book_count
                    )
                })
                .collect(),
            None,
            "No categories.",
        );
    }

    fn draw_authors(&self, frame: &mut Frame, area: Rect) {
        let lines = self
            .authors
            .iter()
            .map(|author| {
                format!(
                    "{}  {}  {:>5}",
                    fit_column(&author.id.to_string(), 4),
                    fit_column(&author.name, 30),
                    self.books_by_author(author.id)
                )
            })
            .collect();

        render_list(
            frame,
            area,
            format!("Authors ({})", self.authors.len()),
            Some(format!(
                "{}  {}  Books",
                fit_column("#", 4),
                fit_column("Name", 30)
            )),
            lines,
            Some(self.author_selection.index),
            "No authors.",
        );
    }

    fn draw_loans(&self, frame: &mut Frame, area: Rect) {
        let lines = self
            .loans
            .iter()
            .map(|loan| {
                let state = if loan.returned { "returned" } else { "out" };
                format!(
                    "{}  {}  {}  {}",
                    fit_column(&loan.id.to_string(), 4),
                    loan.loan_date.format(DATE_FORMAT),
                    fit_column(state, 8),
                    self.book_title(loan.book_id)
                )
            })
            .collect();

        render_list(
            frame,
            area,
            format!("Loans ({})", self.loans.len()),
            Some(format!(
                "{}  {}  {}  Book",
                fit_column("#", 4),
                fit_column("Date", 10),
                fit_column("Status", 8)
            )),
            lines,
            Some(self.loan_selection.index),
            "No loans yet. Press '+' to record one.",
        );
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = match (&self.mode, self.tab) {
            (Mode::AddingBook(_) | Mode::EditingBook { .. } | Mode::AddingLoan(_), _) => &[
                ("[Enter]", "Save"),
                ("[Tab/↑↓]", "Field"),
                ("[←→]", "Pick"),
                ("[Esc]", "Cancel"),
            ],
            (Mode::RenamingAuthor(_), _) => &[("[Enter]", "Save"), ("[Esc]", "Cancel")],
            (Mode::ConfirmBookDelete(_) | Mode::ConfirmAuthorDelete(_), _) => {
                &[("[y]", "Delete"), ("[n/Esc]", "Keep")]
            }
            (Mode::Normal, Tab::Catalog) => &[
                ("[+]", "New"),
                ("[e]", "Edit"),
                ("[d]", "Delete"),
                ("[l]", "Lend"),
                ("[o]", "All rows"),
                ("[1-5]", "Tabs"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, Tab::ByYear) => &[
                ("[←→]", "Start year"),
                ("[↓↑]", "End year"),
                ("[r]", "Reset"),
                ("[1-5]", "Tabs"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, Tab::Summary) => {
                &[("[r]", "Refresh"), ("[1-5]", "Tabs"), ("[q]", "Quit")]
            }
            (Mode::Normal, Tab::Authors) => &[
                ("[r]", "Rename"),
                ("[d]", "Delete"),
                ("[1-5]", "Tabs"),
                ("[q]", "Quit"),
            ],
            (Mode::Normal, Tab::Loans) => {
                &[("[+]", "New loan"), ("[1-5]", "Tabs"), ("[q]", "Quit")]
            }
        };

        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let spans = hints
            .iter()
            .flat_map(|(key, action)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(format!(" {action}   ")),
                ]
            })
            .collect::<Vec<_>>();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = form
            .fields()
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        if form.editing {
            lines.push(Line::from(Span::styled(
                format!("Year: {} (not editable)", form.year),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(""));
        lines.push(form_hint(form.error.as_deref()));

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if let Some(offset) = form.cursor_offset() {
            let row = form
                .fields()
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or_default();
            frame.set_cursor_position((inner.x + offset as u16, inner.y + row as u16));
        }
    }

    fn draw_loan_form(&self, frame: &mut Frame, area: Rect, form: &LoanForm) {
        let popup_area = centered_rect(70, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("New Loan").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            form.build_line(LoanField::Book),
            form.build_line(LoanField::Date),
            form.build_line(LoanField::Returned),
            Line::from(""),
            form_hint(form.error.as_deref()),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if let Some(offset) = form.cursor_offset() {
            frame.set_cursor_position((inner.x + offset as u16, inner.y + 1));
        }
    }

    fn draw_author_form(&self, frame: &mut Frame, area: Rect, form: &AuthorForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Rename Author").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(Span::styled(
                format!("Current name: {}", form.current_name),
                Style::default().fg(Color::Gray),
            )),
            form.build_line(),
            Line::from(""),
            form_hint(form.error.as_deref()),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        frame.set_cursor_position((inner.x + form.cursor_offset() as u16, inner.y + 1));
    }

    fn draw_confirm_book_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let mut lines = vec![Line::from(format!("Delete '{}'?", confirm.title))];
        if confirm.loan_count > 0 {
            lines.push(Line::from(format!(
                "Its {} loan record(s) will be kept.",
                confirm.loan_count
            )));
        }
        self.draw_confirm(frame, area, "Confirm Deletion", lines);
    }

    fn draw_confirm_author_delete(
        &self,
        frame: &mut Frame,
        area: Rect,
        confirm: &ConfirmAuthorDelete,
    ) {
        let mut lines = vec![Line::from(format!("Delete author '{}'?", confirm.name))];
        if confirm.book_count > 0 {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} book(s) keep pointing at this author and will drop out of the catalog.",
                    confirm.book_count
                ),
                Style::default().fg(Color::Yellow),
            )));
        }
        self.draw_confirm(frame, area, "Confirm Deletion", lines);
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, mut lines: Vec<Line>) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

/// Error text when the last submit failed, key hints otherwise.
fn form_hint(error: Option<&str>) -> Line<'static> {
    match error {
        Some(error) => Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "Enter to save • Tab to switch field • ←→ to pick • Esc to cancel",
            Style::default().fg(Color::Gray),
        )),
    }
}

/// Bordered list with an optional column header line. `selected` enables the
/// highlight cursor.
fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: String,
    header: Option<String>,
    lines: Vec<String>,
    selected: Option<usize>,
    empty_message: &str,
) {
    let block = Block::default().title(title).borders(Borders::ALL);
    frame.render_widget(block.clone(), area);
    let inner = block.inner(area);

    if lines.is_empty() {
        let message = Paragraph::new(empty_message.to_string()).alignment(Alignment::Center);
        frame.render_widget(message, inner);
        return;
    }

    let list_area = match header {
        Some(header) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(inner);
            let indent = if selected.is_some() {
                " ".repeat(HIGHLIGHT_SYMBOL.chars().count())
            } else {
                String::new()
            };
            let header = Paragraph::new(Line::from(Span::styled(
                format!("{indent}{header}"),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            frame.render_widget(header, chunks[0]);
            chunks[1]
        }
        None => inner,
    };

    let items: Vec<ListItem> = lines.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    let mut state = ListState::default();
    state.select(selected);
    frame.render_stateful_widget(list, list_area, &mut state);
}
