use std::io::Write;
use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Separator, TransactionRecord};
use crate::parser::parse_statement;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Lossy UTF-8 decode with any leading byte-order mark removed.
pub fn decode_statement(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

/// Matches rows stored by earlier imports only; repeated lines within one
/// statement are distinct transactions.
fn is_duplicate_row(conn: &Connection, rec: &TransactionRecord, import_id: i64) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM transactions WHERE date = ?1 AND merchant = ?2 AND amount = ?3 AND import_id <> ?4",
    )?;
    Ok(stmt.exists(rusqlite::params![rec.date, rec.merchant, rec.amount, import_id])?)
}

fn already_imported(conn: &Connection, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
    Ok(stmt.exists([checksum])?)
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ImportResult {
    pub parsed: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub duplicate_file: bool,
}

pub fn import_file(conn: &Connection, file_path: &Path) -> Result<ImportResult> {
    let data = std::fs::read(file_path)?;
    let checksum = compute_checksum(&data);
    if already_imported(conn, &checksum)? {
        info!(file = %file_path.display(), "file already imported");
        return Ok(ImportResult {
            duplicate_file: true,
            ..Default::default()
        });
    }

    let report = parse_statement(&decode_statement(&data));
    let rejected = report.rejected_lines.len();
    if report.is_empty() {
        info!(file = %file_path.display(), rejected, "no valid records found");
        return Ok(ImportResult {
            rejected,
            ..Default::default()
        });
    }

    let filename = file_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let (inserted, skipped) =
        import_records(conn, &report.records, filename, &checksum, report.separator)?;
    info!(file = filename, inserted, skipped, rejected, "import complete");

    Ok(ImportResult {
        parsed: report.records.len(),
        inserted,
        skipped,
        rejected,
        duplicate_file: false,
    })
}

/// Stores one batch of parsed records. Returns (inserted, skipped duplicates).
pub fn import_records(
    conn: &Connection,
    records: &[TransactionRecord],
    filename: &str,
    checksum: &str,
    separator: Option<Separator>,
) -> Result<(usize, usize)> {
    let tx = conn.unchecked_transaction()?;

    let min_date = records.iter().map(|r| r.date.as_str()).min();
    let max_date = records.iter().map(|r| r.date.as_str()).max();
    tx.execute(
        "INSERT INTO imports (filename, record_count, date_range_start, date_range_end, separator, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            filename,
            records.len() as i64,
            min_date,
            max_date,
            separator.map(|s| s.name()),
            checksum,
        ],
    )?;
    let import_id = tx.last_insert_rowid();

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for rec in records {
        if is_duplicate_row(&tx, rec, import_id)? {
            debug!(date = %rec.date, merchant = %rec.merchant, "skipping duplicate row");
            skipped += 1;
            continue;
        }
        tx.execute(
            "INSERT INTO transactions (date, merchant, amount, category, import_id) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![rec.date, rec.merchant, rec.amount, rec.category, import_id],
        )?;
        inserted += 1;
    }

    tx.commit()?;
    Ok((inserted, skipped))
}

// ---------------------------------------------------------------------------
// Reading back
// ---------------------------------------------------------------------------

pub fn load_records(conn: &Connection) -> Result<Vec<TransactionRecord>> {
    let mut stmt =
        conn.prepare("SELECT date, merchant, amount, category FROM transactions ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TransactionRecord {
                date: row.get(0)?,
                merchant: row.get(1)?,
                amount: row.get(2)?,
                category: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// JSON array of `{date, merchant, amount, category}` objects, the body a
/// remote store accepts.
pub fn submission_payload(records: &[TransactionRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn write_csv<W: Write>(records: &[TransactionRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for rec in records {
        wtr.serialize(rec)?;
    }
    wtr.flush()?;
    Ok(())
}
