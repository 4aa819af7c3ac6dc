use crate::models::{Author, Book, BookListing, Category, YearRange};

/// Top-level screens, reachable with the number keys or Tab.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tab {
    Catalog,
    ByYear,
    Summary,
    Authors,
    Loans,
}

impl Tab {
    pub(crate) const ALL: [Tab; 5] = [
        Tab::Catalog,
        Tab::ByYear,
        Tab::Summary,
        Tab::Authors,
        Tab::Loans,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Tab::Catalog => "1 Catalog",
            Tab::ByYear => "2 By Year",
            Tab::Summary => "3 Summary",
            Tab::Authors => "4 Authors",
            Tab::Loans => "5 Loans",
        }
    }

    pub(crate) fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|tab| *tab == self)
            .unwrap_or_default()
    }

    pub(crate) fn from_digit(ch: char) -> Option<Tab> {
        let index = ch.to_digit(10)? as usize;
        index
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
    }

    pub(crate) fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub(crate) fn previous(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Cursor into a list whose length changes on every reload.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Selection {
    pub(crate) index: usize,
}

impl Selection {
    pub(crate) fn move_by(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.index = 0;
            return;
        }
        let last = len as isize - 1;
        self.index = (self.index as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn first(&mut self) {
        self.index = 0;
    }

    pub(crate) fn last(&mut self, len: usize) {
        self.index = len.saturating_sub(1);
    }

    /// Pull the cursor back inside the list after it shrank.
    pub(crate) fn clamp(&mut self, len: usize) {
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }
}

/// One line of the catalog table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CatalogRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) category: String,
    pub(crate) year: i64,
    pub(crate) available_count: i64,
}

impl From<&BookListing> for CatalogRow {
    fn from(listing: &BookListing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            author: listing.author.clone(),
            category: listing.category.clone(),
            year: listing.year,
            available_count: listing.available_count,
        }
    }
}

/// Build the catalog rows. By default only the joined listings are shown;
/// with `include_unlinked` every raw book row appears and references that no
/// longer resolve are spelled out as missing.
pub(crate) fn catalog_rows(
    listings: &[BookListing],
    books: &[Book],
    authors: &[Author],
    categories: &[Category],
    include_unlinked: bool,
) -> Vec<CatalogRow> {
    if !include_unlinked {
        return listings.iter().map(CatalogRow::from).collect();
    }

    books
        .iter()
        .map(|book| CatalogRow {
            id: book.id,
            title: book.title.clone(),
            author: authors
                .iter()
                .find(|author| author.id == book.author_id)
                .map(|author| author.name.clone())
                .unwrap_or_else(|| format!("<missing author #{}>", book.author_id)),
            category: categories
                .iter()
                .find(|category| category.id == book.category_id)
                .map(|category| category.name.clone())
                .unwrap_or_else(|| format!("<missing category #{}>", book.category_id)),
            year: book.year,
            available_count: book.available_count,
        })
        .collect()
}

/// Catalog tab state.
#[derive(Default)]
pub(crate) struct CatalogScreen {
    pub(crate) rows: Vec<CatalogRow>,
    pub(crate) selection: Selection,
    pub(crate) include_unlinked: bool,
}

impl CatalogScreen {
    pub(crate) fn current_row(&self) -> Option<&CatalogRow> {
        self.rows.get(self.selection.index)
    }

    pub(crate) fn set_rows(&mut self, rows: Vec<CatalogRow>) {
        self.rows = rows;
        self.selection.clamp(self.rows.len());
    }

    /// Move the cursor onto the book with `id` when it is listed.
    pub(crate) fn focus(&mut self, id: i64) {
        if let Some(index) = self.rows.iter().position(|row| row.id == id) {
            self.selection.index = index;
        }
    }

    pub(crate) fn toggle_unlinked(&mut self) -> bool {
        self.include_unlinked = !self.include_unlinked;
        self.include_unlinked
    }
}

/// Year range picked on the "By Year" tab. It starts at the store's oldest
/// and newest publication years and can then be narrowed, never widened past
/// those bounds and never inverted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct YearFilter {
    bounds: Option<YearRange>,
    range: Option<YearRange>,
}

impl YearFilter {
    pub(crate) fn bounds(&self) -> Option<YearRange> {
        self.bounds
    }

    pub(crate) fn range(&self) -> Option<YearRange> {
        self.range
    }

    /// Adopt fresh bounds after a reload. A range that still spanned the old
    /// bounds follows the new ones; a narrowed range is only clamped.
    pub(crate) fn set_bounds(&mut self, bounds: Option<YearRange>) {
        let spanned_all = self.range == self.bounds;
        self.bounds = bounds;
        self.range = match (bounds, self.range) {
            (None, _) => None,
            (Some(bounds), Some(range)) if !spanned_all => {
                let start = range.start.clamp(bounds.start, bounds.end);
                let end = range.end.clamp(start, bounds.end);
                Some(YearRange::new(start, end))
            }
            (Some(bounds), _) => Some(bounds),
        };
    }

    pub(crate) fn shift_start(&mut self, delta: i64) {
        if let (Some(bounds), Some(range)) = (self.bounds, self.range.as_mut()) {
            range.start = (range.start + delta).clamp(bounds.start, range.end);
        }
    }

    pub(crate) fn shift_end(&mut self, delta: i64) {
        if let (Some(bounds), Some(range)) = (self.bounds, self.range.as_mut()) {
            range.end = (range.end + delta).clamp(range.start, bounds.end);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.range = self.bounds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_cycle_and_map_digits() {
        assert_eq!(Tab::from_digit('1'), Some(Tab::Catalog));
        assert_eq!(Tab::from_digit('5'), Some(Tab::Loans));
        assert_eq!(Tab::from_digit('0'), None);
        assert_eq!(Tab::from_digit('6'), None);
        assert_eq!(Tab::Loans.next(), Tab::Catalog);
        assert_eq!(Tab::Catalog.previous(), Tab::Loans);
        assert_eq!(Tab::Summary.index(), 2);
    }

    #[test]
    fn selection_stays_inside_the_list() {
        let mut selection = Selection::default();
        selection.move_by(-1, 3);
        assert_eq!(selection.index, 0);
        selection.move_by(10, 3);
        assert_eq!(selection.index, 2);
        selection.clamp(1);
        assert_eq!(selection.index, 0);
        selection.last(0);
        assert_eq!(selection.index, 0);
    }

    fn listing(id: i64, title: &str) -> BookListing {
        BookListing {
            id,
            title: title.into(),
            author: "Agatha Christie".into(),
            category: "Mistério".into(),
            year: 1939,
            available_count: 4,
        }
    }

    #[test]
    fn catalog_rows_resolve_or_flag_references() {
        let listings = vec![listing(1, "And Then There Were None")];
        let books = vec![
            Book {
                id: 1,
                title: "And Then There Were None".into(),
                author_id: 4,
                category_id: 2,
                year: 1939,
                available_count: 4,
            },
            Book {
                id: 2,
                title: "Carrie".into(),
                author_id: 5,
                category_id: 2,
                year: 1974,
                available_count: 3,
            },
        ];
        let authors = vec![Author {
            id: 4,
            name: "Agatha Christie".into(),
        }];
        let categories = vec![Category {
            id: 2,
            name: "Mistério".into(),
        }];

        let linked = catalog_rows(&listings, &books, &authors, &categories, false);
        assert_eq!(linked, vec![CatalogRow::from(&listings[0])]);

        let all = catalog_rows(&listings, &books, &authors, &categories, true);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].author, "Agatha Christie");
        assert_eq!(all[1].author, "<missing author #5>");
        assert_eq!(all[1].category, "Mistério");
    }

    #[test]
    fn catalog_focus_and_clamp() {
        let mut screen = CatalogScreen::default();
        screen.set_rows(vec![
            CatalogRow::from(&listing(3, "A")),
            CatalogRow::from(&listing(8, "B")),
        ]);
        screen.focus(8);
        assert_eq!(screen.current_row().map(|row| row.id), Some(8));

        screen.set_rows(vec![CatalogRow::from(&listing(3, "A"))]);
        assert_eq!(screen.current_row().map(|row| row.id), Some(3));
        assert!(screen.toggle_unlinked());
    }

    fn filter_within(start: i64, end: i64) -> YearFilter {
        let mut filter = YearFilter::default();
        filter.set_bounds(Some(YearRange::new(start, end)));
        filter
    }

    #[test]
    fn year_filter_starts_at_bounds_and_never_inverts() {
        let mut filter = filter_within(1934, 1998);
        assert_eq!(filter.range(), Some(YearRange::new(1934, 1998)));

        filter.shift_start(-5);
        assert_eq!(filter.range(), Some(YearRange::new(1934, 1998)));

        filter.shift_start(100);
        assert_eq!(filter.range(), Some(YearRange::new(1998, 1998)));

        filter.shift_end(-1);
        assert_eq!(filter.range(), Some(YearRange::new(1998, 1998)));

        filter.reset();
        filter.shift_end(-60);
        assert_eq!(filter.range(), Some(YearRange::new(1934, 1938)));
    }

    #[test]
    fn year_filter_follows_or_clamps_new_bounds() {
        let mut filter = filter_within(1934, 1998);
        filter.set_bounds(Some(YearRange::new(1934, 2001)));
        assert_eq!(filter.range(), Some(YearRange::new(1934, 2001)));

        filter.shift_start(20);
        filter.set_bounds(Some(YearRange::new(1960, 1980)));
        assert_eq!(filter.range(), Some(YearRange::new(1960, 1980)));
        assert_eq!(filter.bounds(), Some(YearRange::new(1960, 1980)));

        filter.set_bounds(None);
        assert_eq!(filter.range(), None);

        filter.shift_start(1);
        assert_eq!(filter.range(), None);
    }

    #[test]
    fn empty_store_has_no_range() {
        let mut filter = YearFilter::default();
        filter.set_bounds(None);
        assert_eq!(filter.range(), None);
        assert_eq!(filter.bounds(), None);
    }
}
