//! Expense records and decoding of chart search payloads.
//!
//! The backend returns a JSON array of expense objects whose key names differ
//! per domain, so decoding reads the keys named in [FieldNames] rather than
//! deriving `Deserialize` for a fixed shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Date, macros::format_description};

use crate::Error;

/// One expense as returned by a chart search.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    /// The category (utility type, car expense type, ...) of the expense.
    pub category: String,
    /// The amount spent in currency units.
    pub amount: f64,
    /// The calendar date the expense was incurred.
    pub date: Date,
}

impl ExpenseRecord {
    /// Create a record from its parts.
    pub fn new(category: &str, amount: f64, date: Date) -> Self {
        Self {
            category: category.to_owned(),
            amount,
            date,
        }
    }
}

/// The JSON keys holding each field of an [ExpenseRecord].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    /// Key of the category name.
    pub category: String,
    /// Key of the expense date.
    pub date: String,
    /// Key of the amount.
    #[serde(default = "default_amount_field")]
    pub amount: String,
}

fn default_amount_field() -> String {
    "Amount".to_owned()
}

impl FieldNames {
    /// Field names with the default amount key.
    pub fn new(category: &str, date: &str) -> Self {
        Self {
            category: category.to_owned(),
            date: date.to_owned(),
            amount: default_amount_field(),
        }
    }
}

/// Decode a chart search response body.
///
/// Both `null` and `[]` decode to an empty list.
///
/// # Errors
///
/// Returns [Error::InvalidPayload] if `body` is not JSON or not an array,
/// and [Error::InvalidRecord] if an element is missing a field or a field has
/// the wrong type.
pub fn parse_payload(body: &str, fields: &FieldNames) -> Result<Vec<ExpenseRecord>, Error> {
    let payload: Option<Vec<Value>> =
        serde_json::from_str(body).map_err(|error| Error::InvalidPayload(error.to_string()))?;

    payload
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, value)| parse_record(index, value, fields))
        .collect()
}

fn parse_record(index: usize, value: &Value, fields: &FieldNames) -> Result<ExpenseRecord, Error> {
    let invalid = |reason: String| Error::InvalidRecord { index, reason };

    let object = value
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object".to_owned()))?;

    let category = object
        .get(&fields.category)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("\"{}\" must be a string", fields.category)))?;
    let amount = object
        .get(&fields.amount)
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid(format!("\"{}\" must be a number", fields.amount)))?;
    let raw_date = object
        .get(&fields.date)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(format!("\"{}\" must be a date string", fields.date)))?;

    Ok(ExpenseRecord {
        category: category.to_owned(),
        amount,
        date: parse_date(raw_date)?,
    })
}

/// Parse the calendar date at the start of `raw`.
///
/// Accepts plain `YYYY-MM-DD` dates as well as RFC 3339 timestamps such as
/// `2024-01-05T00:00:00Z`. The date is taken as written, no timezone
/// conversion is applied.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `raw` does not start with a valid date.
pub fn parse_date(raw: &str) -> Result<Date, Error> {
    let format = format_description!("[year]-[month]-[day]");

    let date_part = raw
        .get(..10)
        .ok_or_else(|| Error::InvalidDate(raw.to_owned()))?;

    // Anything after the date must be the time part of a timestamp.
    if raw.len() > 10 && !raw[10..].starts_with(['T', 't', ' ']) {
        return Err(Error::InvalidDate(raw.to_owned()));
    }

    Date::parse(date_part, format).map_err(|_| Error::InvalidDate(raw.to_owned()))
}
