use std::time::Duration;

use chrono::{DateTime, Utc};
use rowgate_data::{
    BindParam, Column, CountPlan, DataError, Dialect, IdentifierPolicy, InsertPlan, QueryBuilder,
    Record, RecordStore, SelectPlan, SqlType, Statement, StoreTx, Value,
};
use sqlx::{Database, Pool, Row};

use crate::error::{classify, SqlxErrorExt};
use crate::tx::SqlxTx;

/// A [`RecordStore`] backed by an `sqlx::Pool<DB>`.
///
/// Cloning is cheap: clones share the pool.
///
/// # Example
///
/// ```ignore
/// let pool = sqlite_pool_options().connect("sqlite://shop.db").await?;
/// let store = SqlxStore::<Sqlite>::new(pool);
/// let pager = Pager::<Product, _>::new(store.clone(), &config);
/// ```
pub struct SqlxStore<DB: Database> {
    pool: Pool<DB>,
    builder: QueryBuilder,
}

impl<DB: Database> SqlxStore<DB> {
    fn from_parts(pool: Pool<DB>, builder: QueryBuilder) -> Self {
        Self { pool, builder }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    /// Quote identifiers in rendered statements instead of only validating them.
    pub fn with_identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.builder = self.builder.identifier_policy(policy);
        self
    }

    fn acquire_timeout(&self) -> Duration {
        self.pool.options().get_acquire_timeout()
    }
}

impl<DB: Database> Clone for SqlxStore<DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            builder: self.builder.clone(),
        }
    }
}

fn trace_statement(stmt: &Statement) {
    // BindParam's Debug redacts sensitive values
    tracing::trace!(sql = %stmt.sql, params = ?stmt.params, "executing statement");
}

fn undecodable(column: &str, err: sqlx::Error) -> DataError {
    DataError::DataIntegrityViolation(format!("column '{column}': {err}"))
}

fn negative_count(n: i64) -> DataError {
    DataError::DataIntegrityViolation(format!("store returned a negative count ({n})"))
}

/// Implements the store capability for one concrete sqlx driver.
macro_rules! record_store {
    ($db:ty, $row:ty, $dialect:expr) => {
        type Query<'q> = sqlx::query::Query<'q, $db, <$db as sqlx::Database>::Arguments<'q>>;

        fn bind<'q>(query: Query<'q>, param: &BindParam) -> Query<'q> {
            match (param.value(), param.sql_type()) {
                (Value::Null, SqlType::Integer) => query.bind(None::<i64>),
                (Value::Null, SqlType::Decimal) => query.bind(None::<f64>),
                (Value::Null, SqlType::Bool) => query.bind(None::<bool>),
                (Value::Null, SqlType::Timestamp) => query.bind(None::<DateTime<Utc>>),
                (Value::Null, _) => query.bind(None::<String>),
                (Value::Int(v), SqlType::Decimal) => query.bind(*v as f64),
                (Value::Int(v), _) => query.bind(*v),
                (Value::Decimal(v), _) => query.bind(*v),
                (Value::Bool(v), _) => query.bind(*v),
                (Value::Text(v), _) => query.bind(v.clone()),
                (Value::Timestamp(v), _) => query.bind(*v),
            }
        }

        fn prepare(stmt: &Statement) -> Query<'_> {
            trace_statement(stmt);
            stmt.params.iter().fold(sqlx::query(&stmt.sql), bind)
        }

        fn decode(row: &$row, columns: &[Column]) -> Result<Record, DataError> {
            let mut record = Record::new();
            for column in columns {
                let name = column.name;
                let value = match column.ty {
                    SqlType::Integer => row.try_get::<Option<i64>, _>(name).map(Value::from),
                    SqlType::Decimal => row.try_get::<Option<f64>, _>(name).map(Value::from),
                    SqlType::Bool => row.try_get::<Option<bool>, _>(name).map(Value::from),
                    SqlType::Timestamp => {
                        row.try_get::<Option<DateTime<Utc>>, _>(name).map(Value::from)
                    }
                    SqlType::VarChar(_) | SqlType::Text => {
                        row.try_get::<Option<String>, _>(name).map(Value::from)
                    }
                }
                .map_err(|e| undecodable(name, e))?;
                record.insert(name, value);
            }
            Ok(record)
        }

        impl SqlxStore<$db> {
            pub fn new(pool: sqlx::Pool<$db>) -> Self {
                Self::from_parts(pool, QueryBuilder::new($dialect))
            }
        }

        impl RecordStore for SqlxStore<$db> {
            type Tx = SqlxTx<$db>;

            async fn fetch(&self, plan: &SelectPlan) -> Result<Vec<Record>, DataError> {
                let stmt = self.builder.build_select(plan)?;
                let rows = prepare(&stmt)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| classify(e, Some(self.acquire_timeout())))?;
                rows.iter().map(|row| decode(row, plan.columns)).collect()
            }

            async fn count(&self, plan: &CountPlan) -> Result<u64, DataError> {
                let stmt = self.builder.build_count(plan)?;
                let row = prepare(&stmt)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| classify(e, Some(self.acquire_timeout())))?;
                let n: i64 = row.try_get(0).map_err(|e| undecodable("count", e))?;
                u64::try_from(n).map_err(|_| negative_count(n))
            }

            async fn begin(&self) -> Result<SqlxTx<$db>, DataError> {
                let tx = self
                    .pool
                    .begin()
                    .await
                    .map_err(|e| classify(e, Some(self.acquire_timeout())))?;
                Ok(SqlxTx::new(tx, self.builder.clone(), self.acquire_timeout()))
            }
        }

        impl StoreTx for SqlxTx<$db> {
            async fn insert(&mut self, plan: &InsertPlan) -> Result<i64, DataError> {
                let stmt = self.builder.build_insert(plan)?;
                let row = prepare(&stmt)
                    .fetch_one(&mut *self.inner)
                    .await
                    .map_err(|e| classify(e, Some(self.acquire_timeout)))?;
                row.try_get::<i64, _>(plan.key_column)
                    .map_err(|e| undecodable(plan.key_column, e))
            }

            async fn fetch(&mut self, plan: &SelectPlan) -> Result<Vec<Record>, DataError> {
                let stmt = self.builder.build_select(plan)?;
                let rows = prepare(&stmt)
                    .fetch_all(&mut *self.inner)
                    .await
                    .map_err(|e| classify(e, Some(self.acquire_timeout)))?;
                rows.iter().map(|row| decode(row, plan.columns)).collect()
            }

            async fn commit(self) -> Result<(), DataError> {
                self.inner.commit().await.map_err(|e| e.into_data_error())
            }

            async fn rollback(self) -> Result<(), DataError> {
                self.inner.rollback().await.map_err(|e| e.into_data_error())
            }
        }
    };
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;

    record_store!(sqlx::Sqlite, sqlx::sqlite::SqliteRow, Dialect::Sqlite);
}

#[cfg(feature = "postgres")]
mod postgres {
    use super::*;

    record_store!(sqlx::Postgres, sqlx::postgres::PgRow, Dialect::Postgres);
}
