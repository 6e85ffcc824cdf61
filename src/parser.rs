use chrono::NaiveDate;
use tracing::debug;

use crate::models::{
    Field, HeaderMapping, Separator, TransactionRecord, UNCATEGORIZED, UNKNOWN_MERCHANT,
};

// ---------------------------------------------------------------------------
// Lines and values
// ---------------------------------------------------------------------------

/// Splits on `\n` (tolerating `\r\n`) and drops whitespace-only lines.
pub fn retained_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

pub fn clean_value(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix(is_quote).unwrap_or(s);
    let s = s.strip_suffix(is_quote).unwrap_or(s);
    s.trim().to_string()
}

fn plain_split(line: &str, separator: Separator) -> Vec<String> {
    line.split(separator.as_char()).map(clean_value).collect()
}

/// Quote-aware split of a single line. Lines with an unbalanced `"` or that
/// the csv reader yields nothing for are split on the bare separator.
pub fn split_fields(line: &str, separator: Separator) -> Vec<String> {
    if line.matches('"').count() % 2 != 0 {
        return plain_split(line, separator);
    }
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(separator.as_byte())
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    match rdr.read_record(&mut record) {
        Ok(true) => record.iter().map(clean_value).collect(),
        _ => plain_split(line, separator),
    }
}

// ---------------------------------------------------------------------------
// Separator detection
// ---------------------------------------------------------------------------

/// Picks the candidate giving the most columns on the header line.
pub fn detect_separator(header: &str) -> Separator {
    let mut best = Separator::Comma;
    let mut best_count = 0;
    for sep in Separator::CANDIDATES {
        let count = header.split(sep.as_char()).count();
        if count > best_count {
            best = sep;
            best_count = count;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Header classification
// ---------------------------------------------------------------------------

// Checked in order; the first group with a matching keyword wins.
const KEYWORD_GROUPS: &[(Field, &[&str])] = &[
    (Field::Date, &["date", "posted", "trans"]),
    (
        Field::Merchant,
        &["merchant", "description", "payee", "memo", "detail", "name"],
    ),
    (
        Field::Amount,
        &["amount", "value", "debit", "credit", "charge", "payment"],
    ),
    (Field::Category, &["category", "type", "class"]),
];

pub fn classify_header(name: &str) -> Field {
    let lower = name.to_lowercase();
    KEYWORD_GROUPS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(field, _)| *field)
        .unwrap_or(Field::Unmapped)
}

pub fn classify_headers(header: &str, separator: Separator) -> HeaderMapping {
    let names = split_fields(header, separator);
    let fields = names.iter().map(|n| classify_header(n)).collect();
    HeaderMapping { names, fields }
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Strips `$`, thousands separators and parentheses, then parses strictly.
/// A value wrapped in parentheses is negative.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let negative = s.starts_with('(') && s.ends_with(')');
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value.abs() } else { value })
}

/// A row before validation. `None` means no usable value was seen; empty
/// cells never count as a value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CandidateRecord {
    pub date: Option<String>,
    pub merchant: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
}

impl CandidateRecord {
    pub fn is_acceptable(&self) -> bool {
        self.date.is_some() || self.merchant.is_some() || self.amount.is_some()
    }

    pub fn normalize(self, today: NaiveDate) -> TransactionRecord {
        TransactionRecord {
            date: self
                .date
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            merchant: self.merchant.unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()),
            amount: self.amount.unwrap_or(0.0),
            category: self.category.unwrap_or_else(|| UNCATEGORIZED.to_string()),
        }
    }
}

fn non_empty(values: &[String], column: usize) -> Option<&String> {
    values.get(column).filter(|v| !v.is_empty())
}

pub fn parse_row(values: &[String], mapping: &HeaderMapping) -> CandidateRecord {
    let mut rec = CandidateRecord::default();

    // Later columns overwrite earlier ones mapped to the same field.
    for (column, field) in mapping.columns() {
        let Some(value) = non_empty(values, column) else {
            continue;
        };
        match field {
            Field::Date => rec.date = Some(value.clone()),
            Field::Merchant => rec.merchant = Some(value.clone()),
            Field::Amount => {
                if let Some(amount) = parse_amount(value) {
                    rec.amount = Some(amount);
                }
            }
            Field::Category => rec.category = Some(value.clone()),
            Field::Unmapped => {}
        }
    }

    // Positional fallback for exports with missing or unrecognised headers.
    if rec.date.is_none() {
        rec.date = non_empty(values, 0).cloned();
    }
    if rec.merchant.is_none() {
        rec.merchant = non_empty(values, 1).cloned();
    }
    if rec.amount.is_none() {
        rec.amount = non_empty(values, 2).and_then(|v| parse_amount(v));
    }
    rec
}

// ---------------------------------------------------------------------------
// parse_statement
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParseReport {
    pub separator: Option<Separator>,
    pub mapping: Option<HeaderMapping>,
    pub records: Vec<TransactionRecord>,
    pub data_lines: usize,
    /// 1-based positions among the non-blank lines, header included.
    pub rejected_lines: Vec<usize>,
}

impl ParseReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn parse_statement(text: &str) -> ParseReport {
    parse_statement_on(text, chrono::Local::now().date_naive())
}

/// Same as [`parse_statement`], with `today` used for rows lacking a date.
pub fn parse_statement_on(text: &str, today: NaiveDate) -> ParseReport {
    let lines = retained_lines(text);
    let Some((header, data)) = lines.split_first() else {
        debug!("input has no non-blank lines");
        return ParseReport::default();
    };

    let separator = detect_separator(header);
    let mapping = classify_headers(header, separator);
    debug!(
        separator = separator.name(),
        columns = mapping.fields.len(),
        mapped = mapping.columns().count(),
        "detected header layout"
    );

    let mut records = Vec::with_capacity(data.len());
    let mut rejected_lines = Vec::new();
    for (i, line) in data.iter().enumerate() {
        let values = split_fields(line, separator);
        let candidate = parse_row(&values, &mapping);
        if candidate.is_acceptable() {
            records.push(candidate.normalize(today));
        } else {
            debug!(line = i + 2, "dropping line with no date, merchant or amount");
            rejected_lines.push(i + 2);
        }
    }

    ParseReport {
        separator: Some(separator),
        mapping: Some(mapping),
        records,
        data_lines: data.len(),
        rejected_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn parse(text: &str) -> ParseReport {
        parse_statement_on(text, today())
    }

    #[test]
    fn test_detect_separator() {
        assert_eq!(detect_separator("a;b;c"), Separator::Semicolon);
        assert_eq!(detect_separator("a,b,c"), Separator::Comma);
        assert_eq!(detect_separator("a\tb\tc"), Separator::Tab);
        assert_eq!(detect_separator("a|b|c|d"), Separator::Pipe);
    }

    #[test]
    fn test_detect_separator_ties_and_fallback() {
        assert_eq!(detect_separator("a,b;c"), Separator::Comma);
        assert_eq!(detect_separator("single column"), Separator::Comma);
        assert_eq!(detect_separator("a;b,c;d"), Separator::Semicolon);
    }

    #[test]
    fn test_clean_value_strips_wrapping_quotes() {
        assert_eq!(clean_value("  \"Coffee\"  "), "Coffee");
        assert_eq!(clean_value("'Rent'"), "Rent");
        assert_eq!(clean_value("\" padded \""), "padded");
        assert_eq!(clean_value("O'Brien"), "O'Brien");
        assert_eq!(clean_value(""), "");
    }

    #[test]
    fn test_split_fields_respects_quotes() {
        let values = split_fields("2024-01-02,\"Smith, John\",\"$1,234.56\"", Separator::Comma);
        assert_eq!(values, vec!["2024-01-02", "Smith, John", "$1,234.56"]);
        let values = split_fields(" a | 'b' |c", Separator::Pipe);
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_fields_unbalanced_quote_keeps_columns() {
        let values = split_fields("2024-01-05,\"Coffee Shop,4.50", Separator::Comma);
        assert_eq!(values, vec!["2024-01-05", "Coffee Shop", "4.50"]);
    }

    #[test]
    fn test_unbalanced_quote_row_keeps_amount() {
        let report = parse("Date,Merchant,Amount\n2024-01-05,\"Coffee Shop,4.50\n");
        assert_eq!(report.records[0].merchant, "Coffee Shop");
        assert_eq!(report.records[0].amount, 4.5);
    }

    #[test]
    fn test_classify_headers() {
        let mapping = classify_headers("Transaction Date,Payee,Debit,Type", Separator::Comma);
        assert_eq!(
            mapping.fields,
            vec![Field::Date, Field::Merchant, Field::Amount, Field::Category]
        );
        assert_eq!(mapping.names[1], "Payee");
    }

    #[test]
    fn test_classify_header_keywords() {
        assert_eq!(classify_header("POSTED"), Field::Date);
        assert_eq!(classify_header("Memo"), Field::Merchant);
        assert_eq!(classify_header("Merchant Name"), Field::Merchant);
        assert_eq!(classify_header("Value"), Field::Amount);
        assert_eq!(classify_header("Class"), Field::Category);
        assert_eq!(classify_header("Balance"), Field::Unmapped);
        // date keywords are checked first
        assert_eq!(classify_header("Transaction Description"), Field::Date);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("4.50"), Some(4.5));
        assert_eq!(parse_amount("  -42.50 "), Some(-42.5));
        assert_eq!(parse_amount("-$50.00"), Some(-50.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("12abc"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn test_parse_amount_parenthesized_negatives() {
        assert_eq!(parse_amount("(12.00)"), Some(-12.0));
        assert_eq!(parse_amount("($1,000.25)"), Some(-1000.25));
        assert_eq!(parse_amount("()"), None);
    }

    #[test]
    fn test_positional_fallback() {
        let report = parse("Foo,Bar,Baz\n2024-01-05,Coffee Shop,4.50\n");
        assert_eq!(
            report.records,
            vec![TransactionRecord {
                date: "2024-01-05".into(),
                merchant: "Coffee Shop".into(),
                amount: 4.50,
                category: "Uncategorized".into(),
            }]
        );
    }

    #[test]
    fn test_header_driven_columns_in_any_order() {
        let report = parse("Category,Amount,Description,Posted\nFood,-3.20,Bakery,2024-02-10\n");
        let rec = &report.records[0];
        assert_eq!(rec.date, "2024-02-10");
        assert_eq!(rec.merchant, "Bakery");
        assert_eq!(rec.amount, -3.2);
        assert_eq!(rec.category, "Food");
    }

    #[test]
    fn test_last_mapped_column_wins() {
        let report = parse("Description,Name,Amount\nFIRST,SECOND,1.00\n");
        assert_eq!(report.records[0].merchant, "SECOND");
    }

    #[test]
    fn test_empty_cell_does_not_overwrite() {
        let report = parse("Date,Payee,Debit,Credit\n2024-01-03,Refund,,25.00\n2024-01-04,Gym,40.00,\n");
        assert_eq!(report.records[0].amount, 25.0);
        assert_eq!(report.records[1].amount, 40.0);
    }

    #[test]
    fn test_unparseable_amount_does_not_overwrite() {
        let report = parse("Date,Payee,Debit,Credit\n2024-01-04,Gym,40.00,n/a\n");
        assert_eq!(report.records[0].amount, 40.0);
    }

    #[test]
    fn test_semicolon_file_without_known_headers() {
        let report = parse("Datum;Empfaenger;Betrag\n05.01.2024;Baeckerei;3.20\n");
        assert_eq!(report.separator, Some(Separator::Semicolon));
        assert_eq!(report.records[0].date, "05.01.2024");
        assert_eq!(report.records[0].merchant, "Baeckerei");
        assert_eq!(report.records[0].amount, 3.2);
    }

    #[test]
    fn test_quoted_values_and_crlf() {
        let text = "\"Date\",\"Merchant\",\"Amount\"\r\n\"2024-01-02\",\"Smith, John\",\"$1,234.56\"\r\n";
        let report = parse(text);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].merchant, "Smith, John");
        assert_eq!(report.records[0].amount, 1234.56);
    }

    #[test]
    fn test_rejects_lines_without_any_signal() {
        let text = "Date,Merchant,Amount\n2024-01-01,Shop,1.00\n,,\n , ,abc\n2024-01-02,Cafe,2.00\n";
        let report = parse(text);
        assert_eq!(report.data_lines, 4);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.rejected_lines, vec![3, 4]);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let report = parse("Date,Merchant,Amount,Category\n,Shop,oops\n");
        let rec = &report.records[0];
        assert_eq!(rec.date, "2024-03-01");
        assert_eq!(rec.merchant, "Shop");
        assert_eq!(rec.amount, 0.0);
        assert_eq!(rec.category, UNCATEGORIZED);
    }

    #[test]
    fn test_short_line_uses_available_columns() {
        let report = parse("Date,Merchant,Amount,Category\n2024-01-02\n");
        let rec = &report.records[0];
        assert_eq!(rec.date, "2024-01-02");
        assert_eq!(rec.merchant, UNKNOWN_MERCHANT);
        assert_eq!(rec.amount, 0.0);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let report = parse("\n   \nDate,Merchant,Amount\n\n2024-01-02,Shop,1\n\t\n");
        assert_eq!(report.data_lines, 1);
        assert_eq!(report.records.len(), 1);
    }

    #[test]
    fn test_header_only_yields_no_records() {
        let report = parse("Date,Merchant,Amount\n");
        assert!(report.is_empty());
        assert_eq!(report.data_lines, 0);
        assert_eq!(report.separator, Some(Separator::Comma));
    }

    #[test]
    fn test_empty_input() {
        let report = parse("");
        assert!(report.is_empty());
        assert!(report.separator.is_none());
        assert!(parse(" \n\r\n").mapping.is_none());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "Date;Payee;Amount\n2024-01-01;A;(1.00)\n;;\n2024-01-02;B;2\n";
        assert_eq!(parse(text), parse(text));
    }
}
