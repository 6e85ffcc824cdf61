use rusqlite::OptionalExtension;

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{get_db_path, load_settings};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let db_path = get_db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `intake init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let conn = get_connection(&db_path)?;
    let transactions: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
    let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0))?;
    let last_import: Option<String> = conn
        .query_row(
            "SELECT filename FROM imports ORDER BY id DESC LIMIT 1",
            [],
            |r| r.get(0),
        )
        .optional()?;

    println!();
    println!("Transactions:  {transactions}");
    println!("Imports:       {imports}");
    println!("Last import:   {}", last_import.as_deref().unwrap_or("(none)"));
    Ok(())
}
