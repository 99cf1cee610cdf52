//! Transactional session over a pooled connection.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use rowgate_data::QueryBuilder;
use sqlx::{Database, Transaction};

/// A wrapper around SQLx [`Transaction`] that renders plans with the
/// builder of the store it was begun from.
///
/// Dropping it without [`commit`](rowgate_data::StoreTx::commit) rolls the
/// transaction back.
pub struct SqlxTx<DB: Database> {
    pub(crate) inner: Transaction<'static, DB>,
    pub(crate) builder: QueryBuilder,
    pub(crate) acquire_timeout: Duration,
}

impl<DB: Database> SqlxTx<DB> {
    pub(crate) fn new(
        inner: Transaction<'static, DB>,
        builder: QueryBuilder,
        acquire_timeout: Duration,
    ) -> Self {
        Self {
            inner,
            builder,
            acquire_timeout,
        }
    }

    /// Unwraps the `SqlxTx` into the inner `Transaction`.
    pub fn into_inner(self) -> Transaction<'static, DB> {
        self.inner
    }

    /// Returns a mutable reference to the underlying connection.
    pub fn as_mut(&mut self) -> &mut <DB as Database>::Connection {
        &mut self.inner
    }
}

impl<DB: Database> Deref for SqlxTx<DB> {
    type Target = Transaction<'static, DB>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<DB: Database> DerefMut for SqlxTx<DB> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
