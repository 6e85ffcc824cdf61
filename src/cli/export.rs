use std::path::PathBuf;

use crate::cli::{open_db, ExportFormat};
use crate::error::Result;
use crate::importer::{load_records, submission_payload, write_csv};

pub fn run(output: Option<String>, format: ExportFormat) -> Result<()> {
    let conn = open_db()?;
    let records = load_records(&conn)?;

    let Some(output) = output else {
        match format {
            ExportFormat::Json => println!("{}", submission_payload(&records)?),
            ExportFormat::Csv => write_csv(&records, std::io::stdout().lock())?,
        }
        return Ok(());
    };

    let path = PathBuf::from(output);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match format {
        ExportFormat::Json => std::fs::write(&path, format!("{}\n", submission_payload(&records)?))?,
        ExportFormat::Csv => write_csv(&records, std::fs::File::create(&path)?)?,
    }
    println!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
