//! Insert-and-return as one transactional unit.
//!
//! The write and the read-back run in the same store transaction. The
//! read-back targets the key the insert itself returned, so it can only see
//! the row just written, and no other session sees that row before commit.

use std::marker::PhantomData;
use std::time::Duration;

use crate::config::DataConfig;
use crate::entity::Creatable;
use crate::error::DataError;
use crate::plan::{InsertPlan, SelectPlan};
use crate::reader::single_row;
use crate::store::{bounded, RecordStore, StoreTx};

/// Progress of one create operation.
///
/// `Pending -> Written -> Confirmed` on success, `Pending -> Failed` when
/// the write is rejected, `Written -> Failed` when the read-back fails and
/// the write is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateState {
    Pending,
    Written,
    Confirmed,
    Failed,
}

impl CreateState {
    pub fn can_advance_to(self, next: CreateState) -> bool {
        matches!(
            (self, next),
            (CreateState::Pending, CreateState::Written)
                | (CreateState::Written, CreateState::Confirmed)
                | (CreateState::Pending, CreateState::Failed)
                | (CreateState::Written, CreateState::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CreateState::Confirmed | CreateState::Failed)
    }

    fn advance(&mut self, next: CreateState, table: &'static str) {
        debug_assert!(self.can_advance_to(next), "{self:?} -> {next:?}");
        tracing::trace!(table, from = ?*self, to = ?next, "create state");
        *self = next;
    }
}

pub struct AtomicCreator<E, S> {
    store: S,
    timeout: Duration,
    _marker: PhantomData<E>,
}

impl<E, S> AtomicCreator<E, S>
where
    E: Creatable,
    S: RecordStore,
{
    pub fn new(store: S, config: &DataConfig) -> Self {
        Self {
            store,
            timeout: config.statement_timeout(),
            _marker: PhantomData,
        }
    }

    /// Insert `draft` and return the stored entity, server defaults included.
    ///
    /// Either the whole operation is confirmed or nothing is visible.
    pub async fn create(&self, draft: &E::Draft) -> Result<E, DataError> {
        let table = E::table_name();
        let plan = InsertPlan::for_entity::<E>(E::insert_values(draft)?);
        let mut state = CreateState::Pending;

        let mut tx = match bounded("begin", self.timeout, self.store.begin()).await {
            Ok(tx) => tx,
            Err(err) => {
                state.advance(CreateState::Failed, table);
                return Err(DataError::WriteFailed(Box::new(err)));
            }
        };

        let id = match bounded("insert", self.timeout, tx.insert(&plan)).await {
            Ok(id) => id,
            Err(err) => {
                self.abort(tx).await;
                state.advance(CreateState::Failed, table);
                tracing::warn!(table, error = %err, "create rejected by store");
                return Err(DataError::WriteFailed(Box::new(err)));
            }
        };
        state.advance(CreateState::Written, table);

        let entity = match self.read_back(&mut tx, id).await {
            Ok(entity) => entity,
            Err(err) => {
                self.abort(tx).await;
                state.advance(CreateState::Failed, table);
                tracing::warn!(table, id, error = %err, "read-back failed, write rolled back");
                return Err(DataError::ReadBackFailed(Box::new(err)));
            }
        };

        if let Err(err) = bounded("commit", self.timeout, tx.commit()).await {
            state.advance(CreateState::Failed, table);
            return Err(DataError::WriteFailed(Box::new(err)));
        }
        state.advance(CreateState::Confirmed, table);
        tracing::debug!(table, id, "record created");
        Ok(entity)
    }

    async fn read_back(&self, tx: &mut S::Tx, id: i64) -> Result<E, DataError> {
        let plan = SelectPlan::by_id::<E>(id)?;
        let rows = bounded("read_back", self.timeout, tx.fetch(&plan)).await?;
        let record = single_row::<E>(rows, id)?
            .ok_or_else(|| DataError::NotFound(format!("{} {id}", E::table_name())))?;
        let entity = E::from_record(record)?;
        if entity.id() != id {
            return Err(DataError::DataIntegrityViolation(format!(
                "read-back returned {} {} for key {id}",
                E::table_name(),
                entity.id()
            )));
        }
        Ok(entity)
    }

    async fn abort(&self, tx: S::Tx) {
        if let Err(err) = bounded("rollback", self.timeout, tx.rollback()).await {
            // the session is dropped either way, which rolls back too
            tracing::warn!(table = E::table_name(), error = %err, "rollback failed");
        }
    }
}

impl<E, S: Clone> Clone for AtomicCreator<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
            _marker: PhantomData,
        }
    }
}
