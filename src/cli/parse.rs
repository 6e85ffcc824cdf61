use comfy_table::{Cell, Table};

use crate::cli::records_table;
use crate::error::Result;
use crate::importer::{decode_statement, submission_payload};
use crate::parser::{parse_statement, ParseReport};

pub fn run(file: &str, json: bool, explain: bool) -> Result<()> {
    let data = std::fs::read(file)?;
    let report = parse_statement(&decode_statement(&data));

    if json {
        println!("{}", submission_payload(&report.records)?);
        return Ok(());
    }

    if explain {
        print_layout(&report);
    }

    if report.is_empty() {
        println!("No valid records found.");
        return Ok(());
    }

    println!("{}", records_table(&report.records));
    println!(
        "{} records from {} data lines ({} skipped)",
        report.records.len(),
        report.data_lines,
        report.rejected_lines.len()
    );
    Ok(())
}

fn print_layout(report: &ParseReport) {
    let (Some(separator), Some(mapping)) = (report.separator, report.mapping.as_ref()) else {
        println!("Empty file.");
        return;
    };
    println!("Separator: {}", separator.name());

    let mut table = Table::new();
    table.set_header(vec!["Column", "Header", "Field"]);
    for (i, name) in mapping.names.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i),
            Cell::new(name),
            Cell::new(mapping.field_for(i).label()),
        ]);
    }
    println!("{table}");
}
