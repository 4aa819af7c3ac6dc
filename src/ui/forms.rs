use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::ValidationError;
use crate::models::{Author, Book, BookDraft, BookTitle, BookUpdate, Category, LoanDraft};

/// Date format accepted by the loan form and stored in the database.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Drop-down replacement: a fixed list of id/label options cycled with the
/// arrow keys. `None` is the blank "nothing picked" position.
#[derive(Clone, Debug, Default)]
pub(crate) struct Picker {
    options: Vec<(i64, String)>,
    selected: Option<usize>,
}

impl Picker {
    pub(crate) fn new(options: Vec<(i64, String)>) -> Self {
        Self {
            options,
            selected: None,
        }
    }

    pub(crate) fn with_selected(mut self, id: i64) -> Self {
        self.selected = self.options.iter().position(|(option, _)| *option == id);
        self
    }

    /// Step forward through blank, first, ..., last, blank.
    pub(crate) fn next(&mut self) {
        self.selected = match self.selected {
            None if self.options.is_empty() => None,
            None => Some(0),
            Some(index) if index + 1 < self.options.len() => Some(index + 1),
            Some(_) => None,
        };
    }

    pub(crate) fn previous(&mut self) {
        self.selected = match self.selected {
            None => self.options.len().checked_sub(1),
            Some(0) => None,
            Some(index) => Some(index - 1),
        };
    }

    pub(crate) fn selected_id(&self) -> Option<i64> {
        self.selected
            .and_then(|index| self.options.get(index))
            .map(|(id, _)| *id)
    }

    pub(crate) fn label(&self) -> Option<&str> {
        self.selected
            .and_then(|index| self.options.get(index))
            .map(|(_, label)| label.as_str())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn author_picker(authors: &[Author]) -> Picker {
    Picker::new(
        authors
            .iter()
            .map(|author| (author.id, author.name.clone()))
            .collect(),
    )
}

fn category_picker(categories: &[Category]) -> Picker {
    Picker::new(
        categories
            .iter()
            .map(|category| (category.id, category.name.clone()))
            .collect(),
    )
}

/// Parse a whole number typed into a form field.
fn parse_number(field: &'static str, raw: &str) -> Result<i64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    raw.parse::<i64>()
        .map_err(|_| ValidationError::NotANumber { field })
}

fn text_line(label: &str, value: &str, active: bool) -> Line<'static> {
    let display = if value.is_empty() {
        "<required>".to_string()
    } else {
        value.to_string()
    };

    let style = if active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

fn picker_line(label: &str, picker: &Picker, active: bool) -> Line<'static> {
    let (display, style) = match picker.label() {
        Some(value) => (format!("< {value} >"), Style::default()),
        None if picker.is_empty() => (
            "<nothing to pick>".to_string(),
            Style::default().fg(Color::Red),
        ),
        None => ("< pick one >".to_string(), Style::default().fg(Color::DarkGray)),
    };
    let style = if active {
        style.fg(Color::Yellow)
    } else {
        style
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

/// Fields of the book form, in focus order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum BookField {
    Title,
    Author,
    Category,
    Year,
    Available,
}

impl BookField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Category => "Category",
            BookField::Year => "Year",
            BookField::Available => "Available copies",
        }
    }
}

const NEW_BOOK_FIELDS: &[BookField] = &[
    BookField::Title,
    BookField::Author,
    BookField::Category,
    BookField::Year,
    BookField::Available,
];

/// Editing keeps the publication year as it is.
const EDIT_BOOK_FIELDS: &[BookField] = &[
    BookField::Title,
    BookField::Author,
    BookField::Category,
    BookField::Available,
];

/// State of the create/edit book dialog.
#[derive(Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: Picker,
    pub(crate) category: Picker,
    pub(crate) year: String,
    pub(crate) available: String,
    pub(crate) active: BookField,
    pub(crate) editing: bool,
    pub(crate) error: Option<String>,
}

impl BookForm {
    /// Blank form for a new book. Author and category start unpicked.
    pub(crate) fn new(authors: &[Author], categories: &[Category]) -> Self {
        Self {
            title: String::new(),
            author: author_picker(authors),
            category: category_picker(categories),
            year: String::new(),
            available: "0".to_string(),
            active: BookField::Title,
            editing: false,
            error: None,
        }
    }

    /// Form pre-filled from an existing row. A dangling author or category
    /// shows up unpicked and has to be chosen again.
    pub(crate) fn for_book(book: &Book, authors: &[Author], categories: &[Category]) -> Self {
        Self {
            title: book.title.clone(),
            author: author_picker(authors).with_selected(book.author_id),
            category: category_picker(categories).with_selected(book.category_id),
            year: book.year.to_string(),
            available: book.available_count.to_string(),
            active: BookField::Title,
            editing: true,
            error: None,
        }
    }

    pub(crate) fn fields(&self) -> &'static [BookField] {
        if self.editing {
            EDIT_BOOK_FIELDS
        } else {
            NEW_BOOK_FIELDS
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.step_field(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.step_field(-1);
    }

    fn step_field(&mut self, delta: isize) {
        let fields = self.fields();
        let current = fields
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or_default() as isize;
        let len = fields.len() as isize;
        self.active = fields[(current + delta).rem_euclid(len) as usize];
    }

    /// Append a character to the active text field. Numeric fields accept
    /// digits only; pickers ignore typing.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            BookField::Title if !ch.is_control() => {
                self.title.push(ch);
                true
            }
            BookField::Year if ch.is_ascii_digit() => {
                self.year.push(ch);
                true
            }
            BookField::Available if ch.is_ascii_digit() => {
                self.available.push(ch);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Available => {
                self.available.pop();
            }
            BookField::Author | BookField::Category => {}
        }
    }

    /// Cycle the active picker. Returns `false` on text fields.
    pub(crate) fn cycle(&mut self, forward: bool) -> bool {
        let picker = match self.active {
            BookField::Author => &mut self.author,
            BookField::Category => &mut self.category,
            _ => return false,
        };
        if forward {
            picker.next();
        } else {
            picker.previous();
        }
        true
    }

    /// Convert the typed text into a draft. Only number parsing happens here;
    /// the presence and range rules are enforced by `create_book`.
    pub(crate) fn parse_draft(&self) -> Result<BookDraft, ValidationError> {
        Ok(BookDraft {
            title: self.title.clone(),
            author_id: self.author.selected_id(),
            category_id: self.category.selected_id(),
            year: parse_number(BookField::Year.label(), &self.year)?,
            available_count: parse_number(BookField::Available.label(), &self.available)?,
        })
    }

    pub(crate) fn parse_update(&self) -> Result<BookUpdate, ValidationError> {
        Ok(BookUpdate {
            title: self.title.clone(),
            author_id: self.author.selected_id(),
            category_id: self.category.selected_id(),
            available_count: parse_number(BookField::Available.label(), &self.available)?,
        })
    }

    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let active = self.active == field;
        match field {
            BookField::Title => text_line(field.label(), &self.title, active),
            BookField::Author => picker_line(field.label(), &self.author, active),
            BookField::Category => picker_line(field.label(), &self.category, active),
            BookField::Year => text_line(field.label(), &self.year, active),
            BookField::Available => text_line(field.label(), &self.available, active),
        }
    }

    /// Cursor column offset for text fields; `None` on pickers.
    pub(crate) fn cursor_offset(&self) -> Option<usize> {
        let value = match self.active {
            BookField::Title => &self.title,
            BookField::Year => &self.year,
            BookField::Available => &self.available,
            BookField::Author | BookField::Category => return None,
        };
        Some(self.active.label().chars().count() + 2 + value.chars().count())
    }
}

/// Fields of the loan form, in focus order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LoanField {
    Book,
    Date,
    Returned,
}

impl LoanField {
    const ALL: [LoanField; 3] = [LoanField::Book, LoanField::Date, LoanField::Returned];

    pub(crate) fn label(self) -> &'static str {
        match self {
            LoanField::Book => "Book",
            LoanField::Date => "Loan date",
            LoanField::Returned => "Returned",
        }
    }
}

/// State of the new loan dialog.
#[derive(Clone, Debug)]
pub(crate) struct LoanForm {
    pub(crate) book: Picker,
    pub(crate) date: String,
    pub(crate) returned: bool,
    pub(crate) active: LoanField,
    pub(crate) error: Option<String>,
}

impl LoanForm {
    /// The book picker starts on `preselect` when given, otherwise on the
    /// first book. The date defaults to `today`.
    pub(crate) fn new(books: &[BookTitle], today: NaiveDate, preselect: Option<i64>) -> Self {
        let mut book = Picker::new(
            books
                .iter()
                .map(|book| (book.id, book.title.clone()))
                .collect(),
        );
        match preselect {
            Some(id) => book = book.with_selected(id),
            None => book.next(),
        }

        Self {
            book,
            date: today.format(DATE_FORMAT).to_string(),
            returned: false,
            active: LoanField::Book,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.step_field(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.step_field(-1);
    }

    fn step_field(&mut self, delta: isize) {
        let current = LoanField::ALL
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or_default() as isize;
        let len = LoanField::ALL.len() as isize;
        self.active = LoanField::ALL[(current + delta).rem_euclid(len) as usize];
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            LoanField::Date if ch.is_ascii_digit() || ch == '-' => {
                self.date.push(ch);
                true
            }
            LoanField::Returned if ch == ' ' => {
                self.returned = !self.returned;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if self.active == LoanField::Date {
            self.date.pop();
        }
    }

    /// Left/Right: cycle the book picker or flip the returned flag.
    pub(crate) fn cycle(&mut self, forward: bool) -> bool {
        match self.active {
            LoanField::Book => {
                if forward {
                    self.book.next();
                } else {
                    self.book.previous();
                }
                true
            }
            LoanField::Returned => {
                self.returned = !self.returned;
                true
            }
            LoanField::Date => false,
        }
    }

    pub(crate) fn parse(&self) -> Result<LoanDraft, ValidationError> {
        let field = LoanField::Date.label();
        let raw = self.date.trim();
        if raw.is_empty() {
            return Err(ValidationError::Missing { field });
        }
        let loan_date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate { field })?;

        Ok(LoanDraft {
            book_id: self.book.selected_id(),
            loan_date,
            returned: self.returned,
        })
    }

    pub(crate) fn build_line(&self, field: LoanField) -> Line<'static> {
        let active = self.active == field;
        match field {
            LoanField::Book => picker_line(field.label(), &self.book, active),
            LoanField::Date => text_line(field.label(), &self.date, active),
            LoanField::Returned => {
                let mark = if self.returned { "[x] yes" } else { "[ ] no" };
                let style = if active {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::raw(format!("{}: ", field.label())),
                    Span::styled(mark, style),
                ])
            }
        }
    }

    pub(crate) fn cursor_offset(&self) -> Option<usize> {
        (self.active == LoanField::Date)
            .then(|| LoanField::Date.label().chars().count() + 2 + self.date.chars().count())
    }
}

/// State of the rename author dialog.
#[derive(Clone, Debug)]
pub(crate) struct AuthorForm {
    pub(crate) id: i64,
    pub(crate) current_name: String,
    pub(crate) name: String,
    pub(crate) error: Option<String>,
}

impl AuthorForm {
    pub(crate) fn from_author(author: &Author) -> Self {
        Self {
            id: author.id,
            current_name: author.name.clone(),
            name: String::new(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            false
        } else {
            self.name.push(ch);
            true
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.name.pop();
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        text_line("New name", &self.name, true)
    }

    pub(crate) fn cursor_offset(&self) -> usize {
        "New name: ".len() + self.name.chars().count()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) loan_count: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct ConfirmAuthorDelete {
    pub(crate) id: i64,
    pub(crate) name: String,
    /// Books that will keep pointing at the deleted author.
    pub(crate) book_count: usize,
}
