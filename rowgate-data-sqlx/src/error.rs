use std::time::Duration;

use rowgate_data::DataError;

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for DataError`
/// in this crate. Instead, use `.into_data_error()`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        classify(self, None)
    }
}

/// Map a driver error, reporting pool exhaustion as a timeout when the
/// pool's acquire budget is known.
pub(crate) fn classify(err: sqlx::Error, acquire_timeout: Option<Duration>) -> DataError {
    match err {
        sqlx::Error::RowNotFound => DataError::NotFound("row not found".into()),
        sqlx::Error::PoolTimedOut => match acquire_timeout {
            Some(after) => DataError::StoreTimeout {
                operation: "acquire",
                after,
            },
            None => DataError::unavailable(sqlx::Error::PoolTimedOut),
        },
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            DataError::DataIntegrityViolation(db.message().to_string())
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => DataError::unavailable(err),
        other => DataError::store(other),
    }
}

/// Convenience alias for data-layer results using `DataError`.
pub type SqlxResult<T> = Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rowgate_data::ErrorKind;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert_eq!(sqlx::Error::RowNotFound.into_data_error().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_transport_errors_map_to_unavailable() {
        let io = sqlx::Error::Io(std::io::Error::other("connection refused"));
        assert_eq!(io.into_data_error().kind(), ErrorKind::StoreUnavailable);
        assert_eq!(sqlx::Error::PoolClosed.into_data_error().kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_pool_timeout_maps_to_timeout_when_budget_known() {
        let err = classify(sqlx::Error::PoolTimedOut, Some(Duration::from_secs(3)));
        assert!(matches!(err, DataError::StoreTimeout { operation: "acquire", .. }));
        assert_eq!(sqlx::Error::PoolTimedOut.into_data_error().kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_other_errors_map_to_store() {
        let err = sqlx::Error::Protocol("unexpected message".into());
        assert_eq!(err.into_data_error().kind(), ErrorKind::Store);
    }
}
