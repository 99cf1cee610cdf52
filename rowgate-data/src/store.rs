use std::future::Future;
use std::time::Duration;

use crate::error::DataError;
use crate::plan::{CountPlan, InsertPlan, SelectPlan};
use crate::record::Record;

/// The record-store capability the engine runs against.
///
/// Implementations execute bound plans; they never receive SQL assembled
/// from caller input. Each call is one statement with per-statement
/// consistency, no snapshot spans several calls.
///
/// Uses RPITIT (return-position `impl Trait` in traits), no `async-trait` needed.
pub trait RecordStore: Send + Sync {
    type Tx: StoreTx;

    fn fetch(
        &self,
        plan: &SelectPlan,
    ) -> impl Future<Output = Result<Vec<Record>, DataError>> + Send;
    fn count(&self, plan: &CountPlan) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Open a transactional scope. Dropping the returned value without
    /// calling [`StoreTx::commit`] must roll it back.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, DataError>> + Send;
}

/// A transactional session on a [`RecordStore`].
pub trait StoreTx: Send + Sized {
    /// Insert one row and return its store-generated key.
    fn insert(&mut self, plan: &InsertPlan) -> impl Future<Output = Result<i64, DataError>> + Send;
    fn fetch(
        &mut self,
        plan: &SelectPlan,
    ) -> impl Future<Output = Result<Vec<Record>, DataError>> + Send;
    fn commit(self) -> impl Future<Output = Result<(), DataError>> + Send;
    fn rollback(self) -> impl Future<Output = Result<(), DataError>> + Send;
}

/// Run one store interaction under a time budget.
pub async fn bounded<T, F>(operation: &'static str, after: Duration, fut: F) -> Result<T, DataError>
where
    F: Future<Output = Result<T, DataError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = after.as_millis() as u64,
                "store call timed out"
            );
            Err(DataError::StoreTimeout { operation, after })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, DataError>(1)
        };
        let err = bounded("count", Duration::from_millis(50), slow).await.unwrap_err();
        assert!(matches!(err, DataError::StoreTimeout { operation: "count", .. }));
    }

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let value = bounded("count", Duration::from_secs(1), async { Ok::<_, DataError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
