use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::DataError;
use crate::param::Value;

/// A row returned by a store: column name to decoded value.
///
/// A record only ever holds the columns a plan projected, so anything left
/// out of an entity's column list cannot show up here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, column: &str) -> Result<&Value, DataError> {
        self.values
            .get(column)
            .ok_or_else(|| DataError::DataIntegrityViolation(format!("missing column '{column}'")))
    }

    pub fn get_i64(&self, column: &str) -> Result<i64, DataError> {
        match self.require(column)? {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    pub fn get_f64(&self, column: &str) -> Result<f64, DataError> {
        match self.require(column)? {
            Value::Decimal(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(mismatch(column, "decimal", other)),
        }
    }

    pub fn get_bool(&self, column: &str) -> Result<bool, DataError> {
        match self.require(column)? {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            other => Err(mismatch(column, "bool", other)),
        }
    }

    pub fn get_str(&self, column: &str) -> Result<String, DataError> {
        match self.require(column)? {
            Value::Text(v) => Ok(v.clone()),
            other => Err(mismatch(column, "text", other)),
        }
    }

    pub fn get_opt_str(&self, column: &str) -> Result<Option<String>, DataError> {
        match self.require(column)? {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v.clone())),
            other => Err(mismatch(column, "text", other)),
        }
    }

    pub fn get_timestamp(&self, column: &str) -> Result<DateTime<Utc>, DataError> {
        match self.require(column)? {
            Value::Timestamp(v) => Ok(*v),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }
}

fn mismatch(column: &str, expected: &str, got: &Value) -> DataError {
    DataError::DataIntegrityViolation(format!(
        "column '{column}': expected {expected}, got {}",
        got.kind()
    ))
}
