use std::time::Duration;

use crate::query::QueryError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the data layer.
///
/// None of the variants carries a bound value. Parameter errors name the
/// parameter and the reason only, so secrets cannot leak through an error
/// payload or a log line that prints one.
#[derive(Debug)]
pub enum DataError {
    /// A value could not be turned into a bind parameter.
    InvalidParameter { name: String, reason: String },
    /// `page` or `page_size` is not a positive integer, or the offset overflows.
    InvalidPageRequest { page: i64, page_size: i64 },
    /// The query plan could not be rendered (bad identifier, missing ordering key).
    InvalidQuery(QueryError),
    /// No record exists for the requested key.
    NotFound(String),
    /// The store returned data that contradicts a uniqueness or shape assumption.
    DataIntegrityViolation(String),
    /// A store interaction did not finish within its time budget.
    StoreTimeout { operation: &'static str, after: Duration },
    /// The store could not be reached (connection, transport, closed pool).
    StoreUnavailable(BoxError),
    /// Any other failure reported by the store driver.
    Store(BoxError),
    /// The write phase of an atomic create failed; nothing was persisted.
    WriteFailed(Box<DataError>),
    /// The read-back phase of an atomic create failed; the write was rolled back.
    ReadBackFailed(Box<DataError>),
}

/// Flat classification of [`DataError`], precise enough for a transport layer
/// to pick a response without inspecting payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    InvalidPageRequest,
    InvalidQuery,
    NotFound,
    DataIntegrityViolation,
    StoreTimeout,
    StoreUnavailable,
    Store,
    WriteFailed,
    ReadBackFailed,
}

impl ErrorKind {
    /// `true` for kinds caused by the caller's input rather than the store.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidParameter | ErrorKind::InvalidPageRequest | ErrorKind::NotFound
        )
    }
}

impl DataError {
    /// Construct a `Store` variant from any error type.
    ///
    /// Used by backend crates (e.g. `rowgate-data-sqlx`) to wrap
    /// driver-specific errors.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Store(Box::new(err))
    }

    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::StoreUnavailable(Box::new(err))
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        DataError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            DataError::InvalidPageRequest { .. } => ErrorKind::InvalidPageRequest,
            DataError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            DataError::NotFound(_) => ErrorKind::NotFound,
            DataError::DataIntegrityViolation(_) => ErrorKind::DataIntegrityViolation,
            DataError::StoreTimeout { .. } => ErrorKind::StoreTimeout,
            DataError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            DataError::Store(_) => ErrorKind::Store,
            DataError::WriteFailed(_) => ErrorKind::WriteFailed,
            DataError::ReadBackFailed(_) => ErrorKind::ReadBackFailed,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{name}': {reason}")
            }
            DataError::InvalidPageRequest { page, page_size } => {
                write!(f, "Invalid page request: page={page}, page_size={page_size}")
            }
            DataError::InvalidQuery(err) => write!(f, "Invalid query: {err}"),
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::DataIntegrityViolation(msg) => write!(f, "Data integrity violation: {msg}"),
            DataError::StoreTimeout { operation, after } => {
                write!(f, "Store timeout: {operation} exceeded {}ms", after.as_millis())
            }
            DataError::StoreUnavailable(err) => write!(f, "Store unavailable: {err}"),
            DataError::Store(err) => write!(f, "Store error: {err}"),
            DataError::WriteFailed(err) => write!(f, "Write failed: {err}"),
            DataError::ReadBackFailed(err) => write!(f, "Read-back failed: {err}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::InvalidQuery(err) => Some(err),
            DataError::StoreUnavailable(err) | DataError::Store(err) => Some(err.as_ref()),
            DataError::WriteFailed(err) | DataError::ReadBackFailed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<QueryError> for DataError {
    fn from(err: QueryError) -> Self {
        DataError::InvalidQuery(err)
    }
}
