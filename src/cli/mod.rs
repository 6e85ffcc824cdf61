pub mod export;
pub mod import;
pub mod init;
pub mod insights;
pub mod list;
pub mod parse;
pub mod status;

use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Cell, CellAlignment, Table};
use rusqlite::Connection;

use crate::db::get_connection;
use crate::error::{IntakeError, Result};
use crate::fmt::money;
use crate::models::TransactionRecord;
use crate::settings::get_db_path;
use crate::view::SortKey;

pub(crate) fn open_db() -> Result<Connection> {
    let db_path = get_db_path();
    if !db_path.exists() {
        return Err(IntakeError::Other(format!(
            "No database found at {}\nRun `intake init` to create one.",
            db_path.display()
        )));
    }
    get_connection(&db_path)
}

pub(crate) fn records_table<'a, I>(records: I) -> Table
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut table = Table::new();
    table.set_header(vec!["Date", "Merchant", "Amount", "Category"]);
    for rec in records {
        table.add_row(vec![
            Cell::new(&rec.date),
            Cell::new(&rec.merchant),
            Cell::new(money(rec.amount)).set_alignment(CellAlignment::Right),
            Cell::new(&rec.category),
        ]);
    }
    table
}

#[derive(Parser)]
#[command(name = "intake", about = "Import loosely formatted bank statements into a transaction ledger.")]
pub struct Cli {
    /// Log parsing and import decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for intake data (default: ~/Documents/intake)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Parse a statement and show the records without storing them.
    Parse {
        /// Path to a delimited statement file
        file: String,
        /// Print the records as the JSON array sent to a remote store
        #[arg(long)]
        json: bool,
        /// Show the detected separator and column mapping
        #[arg(long)]
        explain: bool,
    },
    /// Parse a statement and store its records.
    Import {
        /// Path to a delimited statement file
        file: String,
    },
    /// List stored transactions.
    List {
        /// Filter by merchant, category, amount or date text
        #[arg(long)]
        search: Option<String>,
        /// Sort column
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,
        /// Rows per page (default from settings)
        #[arg(long)]
        rows: Option<usize>,
    },
    /// Export stored transactions.
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<String>,
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,
    },
    /// Render a saved insights response.
    Insights {
        /// Path to a JSON response body
        file: String,
    },
    /// Show current database and summary statistics.
    Status,
}
