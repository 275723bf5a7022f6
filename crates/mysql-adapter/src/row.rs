//! JSON row handling for INSERT statements.

use fixture_core::Record;
use mysql_async::Value as MySqlValue;
use serde_json::Value;
use std::collections::BTreeSet;

/// Quote a MySQL identifier with backticks.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Serialize values of JSON-typed columns to their text form.
///
/// A JSON `null` in such a column becomes the JSON text `null`, not SQL
/// `NULL`. Fields outside `json_columns` pass through unchanged.
pub fn normalize_json_columns(
    record: Record,
    json_columns: &BTreeSet<String>,
) -> Result<Record, serde_json::Error> {
    record
        .into_iter()
        .map(|(name, value)| {
            if json_columns.contains(&name) {
                let text = serde_json::to_string(&value)?;
                Ok((name, Value::String(text)))
            } else {
                Ok((name, value))
            }
        })
        .collect()
}

/// Convert a JSON value into a statement parameter.
pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(b) => MySqlValue::Int(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                MySqlValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                MySqlValue::UInt(u)
            } else {
                MySqlValue::Double(n.as_f64().unwrap_or_default())
            }
        }
        Value::String(s) => MySqlValue::Bytes(s.as_bytes().to_vec()),
        Value::Array(_) | Value::Object(_) => MySqlValue::Bytes(value.to_string().into_bytes()),
    }
}

/// A multi-row INSERT built from JSON records.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    /// Union of record keys in first-seen order.
    pub columns: Vec<String>,
    /// One entry per column; `None` means the column is written as `DEFAULT`.
    pub rows: Vec<Vec<Option<Value>>>,
}

impl InsertStatement {
    pub fn from_records(table: impl Into<String>, records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for name in record.keys() {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.remove(column))
                    .collect()
            })
            .collect();

        Self {
            table: table.into(),
            columns,
            rows,
        }
    }

    pub fn sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let values = row
                    .iter()
                    .map(|v| if v.is_some() { "?" } else { "DEFAULT" })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({values})")
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES {}",
            quote_identifier(&self.table),
            columns,
            rows
        )
    }

    /// Positional parameters matching the `?` placeholders of [`sql`](Self::sql).
    pub fn params(&self) -> Vec<MySqlValue> {
        self.rows
            .iter()
            .flatten()
            .flatten()
            .map(to_mysql_value)
            .collect()
    }

    /// The rows as records, leaving out `DEFAULT` columns.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .filter_map(|(c, v)| v.clone().map(|v| (c.clone(), v)))
                    .collect()
            })
            .collect()
    }
}
