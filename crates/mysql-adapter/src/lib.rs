//! MySQL fixture adapter for db43.
//!
//! Truncation runs table by table with foreign key checks disabled on the
//! session; loading executes SQL scripts verbatim or inserts JSON rows,
//! serializing values of `JSON` columns to text first.

mod adapter;
mod row;
mod store;

pub use adapter::{MySqlAdapter, TableColumns};
pub use row::{normalize_json_columns, quote_identifier, to_mysql_value, InsertStatement};
pub use store::{ColumnInfo, MySqlStore, SqlStore};
