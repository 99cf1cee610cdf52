use std::marker::PhantomData;
use std::time::Duration;

use crate::config::DataConfig;
use crate::entity::Entity;
use crate::error::DataError;
use crate::plan::SelectPlan;
use crate::record::Record;
use crate::store::{bounded, RecordStore};

/// Single-record lookups by identifier, projecting only `E::columns()`.
pub struct RecordReader<E, S> {
    store: S,
    timeout: Duration,
    _marker: PhantomData<E>,
}

impl<E, S> RecordReader<E, S>
where
    E: Entity,
    S: RecordStore,
{
    pub fn new(store: S, config: &DataConfig) -> Self {
        Self {
            store,
            timeout: config.statement_timeout(),
            _marker: PhantomData,
        }
    }

    /// `Ok(None)` when no record has this id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<E>, DataError> {
        let plan = SelectPlan::by_id::<E>(id)?;
        let rows = bounded("fetch_by_id", self.timeout, self.store.fetch(&plan)).await?;
        let found = single_row::<E>(rows, id)?;
        tracing::debug!(table = E::table_name(), id, found = found.is_some(), "lookup by id");
        found.map(E::from_record).transpose()
    }

    /// Like [`find_by_id`](Self::find_by_id), with absence as [`DataError::NotFound`].
    pub async fn get_by_id(&self, id: i64) -> Result<E, DataError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DataError::NotFound(format!("{} {id}", E::table_name())))
    }
}

impl<E, S: Clone> Clone for RecordReader<E, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            timeout: self.timeout,
            _marker: PhantomData,
        }
    }
}

/// Zero or one row for a unique key; more is a violated uniqueness assumption.
pub(crate) fn single_row<E: Entity>(
    mut rows: Vec<Record>,
    id: i64,
) -> Result<Option<Record>, DataError> {
    match rows.len() {
        0 | 1 => Ok(rows.pop()),
        n => Err(DataError::DataIntegrityViolation(format!(
            "{n} rows in {} share {} {id}",
            E::table_name(),
            E::id_column()
        ))),
    }
}
