use crate::error::Result;
use crate::schema::{IncomeEntry, PurchaseFlags, RecordDate, RecordSet, SummaryConfig, Transaction};
use log::debug;
use std::io::Read;

/// Number of fields of an expense row:
/// day, month, year, amount, product, goods/services, once/regular, necessity/luxury, category.
pub const EXPENSE_FIELDS: usize = 9;

/// A row after validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRow {
    Expense(Transaction),
    Income(IncomeEntry),
}

fn parse_amount(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Any numeric field with an integral value, so `"3"` and `"3.0"` both give 3.
fn parse_int(field: &str) -> Option<i32> {
    let value = parse_amount(field)?;
    let in_range = (i32::MIN as f64..=i32::MAX as f64).contains(&value);
    (value.fract() == 0.0 && in_range).then_some(value as i32)
}

/// Validates a single row. Returns `None` for any row that is neither a
/// well-formed expense nor a well-formed income entry.
pub fn parse_row<S: AsRef<str>>(row: &[S]) -> Option<ParsedRow> {
    if row.len() < 4 {
        return None;
    }

    let day = parse_int(row[0].as_ref())?;
    let month = parse_int(row[1].as_ref())?;
    let year = parse_int(row[2].as_ref())?;
    let amount = parse_amount(row[3].as_ref())?;
    let date = RecordDate::new(day, month, year);

    if amount < 0.0 {
        return Some(ParsedRow::Income(IncomeEntry { date, amount }));
    }

    if row.len() != EXPENSE_FIELDS {
        return None;
    }

    let flags = PurchaseFlags::from_codes(row[5].as_ref(), row[6].as_ref(), row[7].as_ref())?;

    Some(ParsedRow::Expense(Transaction {
        date,
        amount,
        product: row[4].as_ref().to_string(),
        category: row[8].as_ref().to_string(),
        flags,
    }))
}

/// Converts tokenized rows into a record set, silently dropping malformed rows.
pub fn parse_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> RecordSet {
    let mut records = RecordSet::default();
    let mut dropped = 0usize;

    for row in rows {
        match parse_row(row) {
            Some(ParsedRow::Expense(transaction)) => records.transactions.push(transaction),
            Some(ParsedRow::Income(entry)) => records.income.push(entry),
            None => dropped += 1,
        }
    }

    debug!(
        "Ingested {} expenses and {} income entries, dropped {} malformed rows",
        records.transactions.len(),
        records.income.len(),
        dropped
    );

    records
}

/// Splits delimited text into rows of string fields. No header row is assumed
/// and rows may have any number of fields.
pub fn read_rows<R: Read>(reader: R, config: &SummaryConfig) -> Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(config.delimiter()?)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(rows)
}

pub fn parse_reader<R: Read>(reader: R, config: &SummaryConfig) -> Result<RecordSet> {
    let rows = read_rows(reader, config)?;
    Ok(parse_rows(&rows))
}
