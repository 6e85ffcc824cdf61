//! Listing state for stored transactions: search, sort and pagination are
//! recomputed from an immutable [`ViewState`] on every interaction.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::models::TransactionRecord;

pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    Date,
    Merchant,
    Category,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub sort: Option<(SortKey, SortDirection)>,
    pub page: usize,
    pub rows_per_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
            page: 1,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

#[derive(Debug)]
pub struct Page<'a> {
    pub rows: Vec<&'a TransactionRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
    /// 1-based, inclusive; both zero when nothing matched.
    pub start: usize,
    pub end: usize,
}

impl ViewState {
    pub fn with_rows_per_page(rows_per_page: usize) -> Self {
        Self {
            rows_per_page: rows_per_page.max(1),
            ..Default::default()
        }
    }

    pub fn with_search(self, term: &str) -> Self {
        Self {
            search: term.to_string(),
            page: 1,
            ..self
        }
    }

    /// Same key flips ascending to descending; anything else sorts ascending.
    pub fn toggle_sort(self, key: SortKey) -> Self {
        let direction = match self.sort {
            Some((current, SortDirection::Asc)) if current == key => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Self {
            sort: Some((key, direction)),
            page: 1,
            ..self
        }
    }

    pub fn with_page(self, page: usize) -> Self {
        Self { page, ..self }
    }

    pub fn matches(&self, rec: &TransactionRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        rec.merchant.to_lowercase().contains(&needle)
            || rec.category.to_lowercase().contains(&needle)
            || rec.amount.to_string().contains(&self.search)
            || rec.date.contains(&self.search)
    }

    pub fn apply<'a>(&self, records: &'a [TransactionRecord]) -> Page<'a> {
        let mut rows: Vec<&TransactionRecord> = records.iter().filter(|r| self.matches(r)).collect();

        if let Some((key, direction)) = self.sort {
            rows.sort_by(|a, b| {
                let ord = compare(a, b, key);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        let total = rows.len();
        let per_page = self.rows_per_page.max(1);
        let total_pages = total.div_ceil(per_page);
        let page = self.page.clamp(1, total_pages.max(1));
        let offset = (page - 1) * per_page;
        let end = (offset + per_page).min(total);
        let rows: Vec<&TransactionRecord> = rows.into_iter().skip(offset).take(per_page).collect();

        Page {
            start: if total == 0 { 0 } else { offset + 1 },
            end,
            rows,
            page,
            total_pages,
            total,
        }
    }
}

fn compare(a: &TransactionRecord, b: &TransactionRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => {
            let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
            match (parse(&a.date), parse(&b.date)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.date.cmp(&b.date),
            }
        }
        SortKey::Merchant => a.merchant.cmp(&b.merchant),
        SortKey::Category => a.category.cmp(&b.category),
        SortKey::Amount => a.amount.total_cmp(&b.amount),
    }
}

/// Up to five page numbers around `current`, pinned to the first or last five
/// near either end.
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages <= 5 {
        (1..=total_pages).collect()
    } else if current <= 3 {
        (1..=5).collect()
    } else if current >= total_pages - 2 {
        (total_pages - 4..=total_pages).collect()
    } else {
        (current - 2..=current + 2).collect()
    }
}
