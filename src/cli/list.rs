use crate::cli::{open_db, records_table};
use crate::error::Result;
use crate::importer::load_records;
use crate::settings::load_settings;
use crate::view::{page_window, SortKey, ViewState};

pub fn run(
    search: Option<String>,
    sort: Option<SortKey>,
    desc: bool,
    page: usize,
    rows: Option<usize>,
) -> Result<()> {
    let conn = open_db()?;
    let records = load_records(&conn)?;

    let mut state = ViewState::with_rows_per_page(rows.unwrap_or(load_settings().rows_per_page));
    if let Some(term) = search {
        state = state.with_search(&term);
    }
    if let Some(key) = sort {
        state = state.toggle_sort(key);
        if desc {
            state = state.toggle_sort(key);
        }
    }
    let state = state.with_page(page);

    let page = state.apply(&records);
    if page.total == 0 {
        println!("No transactions found.");
        return Ok(());
    }

    println!("{}", records_table(page.rows.iter().copied()));
    println!("Showing {} to {} of {} entries", page.start, page.end, page.total);
    if page.total_pages > 1 {
        let pages: Vec<String> = page_window(page.page, page.total_pages)
            .into_iter()
            .map(|n| if n == page.page { format!("[{n}]") } else { n.to_string() })
            .collect();
        println!("Pages: {} of {}", pages.join(" "), page.total_pages);
    }
    Ok(())
}
