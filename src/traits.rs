use crate::error::DriverError;
use mysql::{prelude::*, Row, Value};

/// One result row as ordered `(column, value)` pairs.
pub type Record = Vec<(String, String)>;

/// Read-only access to a database server.
///
/// Implemented for [`mysql::Conn`]; tests provide in-memory servers.
pub trait Server {
    /// Runs `query` and returns every row with its column names.
    fn query_records(&mut self, query: &str) -> Result<Vec<Record>, DriverError>;

    /// Runs `query` and returns the first column of every row.
    fn query_column(&mut self, query: &str) -> Result<Vec<String>, DriverError> {
        Ok(self
            .query_records(query)?
            .into_iter()
            .filter_map(|record| record.into_iter().next().map(|(_, value)| value))
            .collect())
    }

    /// Runs `query` and returns the first column of the first row, or an
    /// empty string when no row came back.
    fn query_scalar(&mut self, query: &str) -> Result<String, DriverError> {
        Ok(self.query_column(query)?.into_iter().next().unwrap_or_default())
    }
}

impl Server for mysql::Conn {
    fn query_records(&mut self, query: &str) -> Result<Vec<Record>, DriverError> {
        let rows = self.query::<Row, _>(query)?;
        Ok(rows.iter().map(RowEx::to_record).collect())
    }
}

pub trait RowEx {
    fn get_text(&self, i: usize) -> Option<String>;

    fn to_record(&self) -> Record;
}

impl RowEx for Row {
    fn get_text(&self, i: usize) -> Option<String> {
        self.as_ref(i).map(value_to_text)
    }

    fn to_record(&self) -> Record {
        self.columns_ref()
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name_str().into_owned(), self.get_text(i).unwrap_or_default()))
            .collect()
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::NULL => String::new(),
        Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::Int(v) => v.to_string(),
        Value::UInt(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Double(v) => v.to_string(),
        // dates and times: strip the SQL literal quotes
        other => other.as_sql(false).trim_matches('\'').to_string(),
    }
}
