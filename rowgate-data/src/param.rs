//! Typed bind parameters.
//!
//! Every value that reaches a query plan goes through [`BindParam`]. The
//! renderer only ever emits a placeholder for it; the value travels next to
//! the SQL text and is handed to the driver separately.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DataError;

/// Declared type of a bind slot, mirroring the column it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Decimal,
    Bool,
    Timestamp,
    /// Text bounded to the given number of characters.
    VarChar(usize),
    /// Unbounded text.
    Text,
}

impl SqlType {
    pub fn name(self) -> &'static str {
        match self {
            SqlType::Integer => "integer",
            SqlType::Decimal => "decimal",
            SqlType::Bool => "bool",
            SqlType::Timestamp => "timestamp",
            SqlType::VarChar(_) => "varchar",
            SqlType::Text => "text",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, SqlType::VarChar(_) | SqlType::Text)
    }

    /// Maximum character width for bounded text types.
    pub fn width(self) -> Option<usize> {
        match self {
            SqlType::VarChar(n) => Some(n),
            _ => None,
        }
    }
}

/// A typed scalar, either bound into a plan or decoded from a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Decimal(f64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for `Null` and for empty text, the two shapes a filter treats as absent.
    pub fn is_absent(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    fn accepts(&self, ty: SqlType) -> bool {
        match (self, ty) {
            (Value::Null, _) => true,
            (Value::Int(_), SqlType::Integer) => true,
            // integers widen into decimal slots, never the other way round
            (Value::Int(_) | Value::Decimal(_), SqlType::Decimal) => true,
            (Value::Bool(_), SqlType::Bool) => true,
            (Value::Text(_), SqlType::VarChar(_) | SqlType::Text) => true,
            (Value::Timestamp(_), SqlType::Timestamp) => true,
            _ => false,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Bool(_) => "bool",
            Value::Text(_) => "text",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Decimal(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A named, typed bind slot.
///
/// Constructed only through [`BindParam::bind`], [`BindParam::secret`] or
/// [`BindParam::parse`], all of which check the value against the declared
/// type before anything is sent to a store.
#[derive(Clone, PartialEq)]
pub struct BindParam {
    name: String,
    ty: SqlType,
    value: Value,
    sensitive: bool,
}

impl BindParam {
    pub fn bind(name: &str, ty: SqlType, value: impl Into<Value>) -> Result<Self, DataError> {
        let value = value.into();
        check(name, ty, &value)?;
        Ok(Self {
            name: name.to_string(),
            ty,
            value,
            sensitive: false,
        })
    }

    /// Bind a value that must never appear in logs or debug output.
    pub fn secret(name: &str, ty: SqlType, value: impl Into<Value>) -> Result<Self, DataError> {
        let mut param = Self::bind(name, ty, value)?;
        param.sensitive = true;
        Ok(param)
    }

    /// Parse a raw inbound string against a declared type.
    ///
    /// A missing type is rejected: untyped input is never coerced.
    pub fn parse(name: &str, raw: &str, ty: Option<SqlType>) -> Result<Self, DataError> {
        let ty = ty.ok_or_else(|| DataError::invalid_parameter(name, "no declared type"))?;
        let unparsable =
            || DataError::invalid_parameter(name, format!("not a valid {}", ty.name()));
        let value = match ty {
            SqlType::Integer => Value::Int(raw.trim().parse().map_err(|_| unparsable())?),
            SqlType::Decimal => Value::Decimal(raw.trim().parse().map_err(|_| unparsable())?),
            SqlType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => return Err(unparsable()),
            },
            SqlType::Timestamp => {
                let parsed = DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| unparsable())?;
                Value::Timestamp(parsed.with_timezone(&Utc))
            }
            SqlType::VarChar(_) | SqlType::Text => Value::Text(raw.to_string()),
        };
        Self::bind(name, ty, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> SqlType {
        self.ty
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }
}

impl std::fmt::Debug for BindParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("BindParam");
        s.field("name", &self.name).field("ty", &self.ty);
        if self.sensitive {
            s.field("value", &"<redacted>");
        } else {
            s.field("value", &self.value);
        }
        s.finish()
    }
}

fn check(name: &str, ty: SqlType, value: &Value) -> Result<(), DataError> {
    if !value.accepts(ty) {
        return Err(DataError::invalid_parameter(
            name,
            format!("expected {}, got {}", ty.name(), value.kind()),
        ));
    }
    match value {
        Value::Decimal(d) if !d.is_finite() => {
            Err(DataError::invalid_parameter(name, "decimal must be finite"))
        }
        Value::Text(s) => match ty.width() {
            Some(max) if s.chars().count() > max => Err(DataError::invalid_parameter(
                name,
                format!("exceeds {max} characters"),
            )),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}
