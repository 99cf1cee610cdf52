//! Bound query and command plans handed to a [`RecordStore`](crate::store::RecordStore).

use crate::entity::{Column, Entity};
use crate::error::DataError;
use crate::filter::{FilterOp, Predicate};
use crate::param::{BindParam, SqlType};

/// A projected, filtered, optionally ordered and sliced read.
#[derive(Debug, Clone)]
pub struct SelectPlan {
    pub table: &'static str,
    pub columns: &'static [Column],
    pub predicate: Predicate,
    pub order_by: Vec<(&'static str, bool)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectPlan {
    /// Select the entity's declared projection under `predicate`.
    pub fn for_entity<E: Entity>(predicate: Predicate) -> Self {
        Self {
            table: E::table_name(),
            columns: E::columns(),
            predicate,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Unique-key lookup. Fetches up to two rows so a duplicate key is
    /// detectable rather than silently truncated.
    pub fn by_id<E: Entity>(id: i64) -> Result<Self, DataError> {
        let key = Column::new(E::id_column(), SqlType::Integer);
        let predicate = Predicate::clause(&key, FilterOp::Eq, key.bind(id)?);
        Ok(Self::for_entity::<E>(predicate).limit(2))
    }

    pub fn order_by(mut self, column: &'static str, ascending: bool) -> Self {
        self.order_by.push((column, ascending));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// `COUNT(*)` over a table under a predicate.
#[derive(Debug, Clone)]
pub struct CountPlan {
    pub table: &'static str,
    pub predicate: Predicate,
}

impl CountPlan {
    pub fn new(table: &'static str, predicate: Predicate) -> Self {
        Self { table, predicate }
    }

    /// Count the whole table.
    pub fn all(table: &'static str) -> Self {
        Self::new(table, Predicate::All)
    }
}

/// Insert one row and return the store-generated key.
#[derive(Debug, Clone)]
pub struct InsertPlan {
    pub table: &'static str,
    pub key_column: &'static str,
    pub values: Vec<(&'static str, BindParam)>,
}

impl InsertPlan {
    pub fn for_entity<E: Entity>(values: Vec<(&'static str, BindParam)>) -> Self {
        Self {
            table: E::table_name(),
            key_column: E::id_column(),
            values,
        }
    }
}
