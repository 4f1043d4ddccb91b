//! Snapshot and CSV import
//!
//! A snapshot is the JSON form of the feed the engine consumes. Expenses can
//! also come from a CSV export with the columns
//! `id,category,amount,date,recorded_at,payment_method,description`.

use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, Expense, PaymentMethod, Snapshot};

/// Read a JSON snapshot from disk
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let content = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content)?;
    debug!(
        path = %path.display(),
        expenses = snapshot.expenses.len(),
        budgets = snapshot.budgets.len(),
        goals = snapshot.goals.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

/// Read an expense CSV from disk
pub fn load_expenses_csv(path: &Path) -> Result<Vec<Expense>> {
    parse_expenses_csv(File::open(path)?)
}

/// Column positions resolved from the header row
struct Columns {
    id: usize,
    category: usize,
    amount: usize,
    date: usize,
    recorded_at: Option<usize>,
    payment_method: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| Error::InvalidData(format!("Missing column: {}", name)))
        };

        Ok(Self {
            id: require("id")?,
            category: require("category")?,
            amount: require("amount")?,
            date: require("date")?,
            recorded_at: find("recorded_at"),
            payment_method: find("payment_method"),
            description: find("description"),
        })
    }
}

/// Parse expenses from CSV data with a header row
pub fn parse_expenses_csv<R: Read>(reader: R) -> Result<Vec<Expense>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut expenses = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |index: usize| record.get(index).unwrap_or("");
        let optional = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
        };

        let id = field(columns.id).parse::<i64>().map_err(|_| {
            Error::InvalidData(format!("Row {}: invalid id '{}'", line + 1, field(columns.id)))
        })?;
        let category: Category = field(columns.category)
            .parse()
            .map_err(|e| Error::InvalidData(format!("Row {}: {}", line + 1, e)))?;
        let amount = parse_amount(field(columns.amount))?;
        let date = parse_date(field(columns.date))?;

        let recorded_at = match optional(columns.recorded_at) {
            Some(s) => parse_timestamp(s)?,
            None => midnight_utc(date),
        };
        let payment_method = match optional(columns.payment_method) {
            Some(s) => s
                .parse::<PaymentMethod>()
                .map_err(|e| Error::InvalidData(format!("Row {}: {}", line + 1, e)))?,
            None => PaymentMethod::Other,
        };

        expenses.push(Expense {
            id,
            category,
            amount,
            date,
            recorded_at: Some(recorded_at),
            payment_method,
            description: optional(columns.description).map(str::to_string),
        });
    }

    debug!("Parsed {} expenses from CSV", expenses.len());
    Ok(expenses)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    // A bare date is read as midnight UTC
    parse_date(s).map(midnight_utc)
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s.trim().replace(['$', ',', ' '], "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))
}
