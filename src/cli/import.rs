use std::path::PathBuf;

use colored::Colorize;

use crate::cli::open_db;
use crate::error::Result;
use crate::importer::import_file;

pub fn run(file: &str) -> Result<()> {
    let file_path = PathBuf::from(file);
    let conn = open_db()?;

    let result = import_file(&conn, &file_path)?;

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }
    if result.parsed == 0 {
        println!("{}", "No valid records found.".yellow());
        return Ok(());
    }

    let summary = format!(
        "{} imported, {} skipped (duplicates)",
        result.inserted, result.skipped
    );
    println!("{}", summary.green());
    if result.rejected > 0 {
        println!("{} lines had no usable data", result.rejected);
    }
    Ok(())
}
