use rowgate_data::{DataConfig, DataError, RecordStore};
use rowgate_data_sqlx::{sqlite_pool_options, SqlxErrorExt, SqlxStore};
use sqlx::Sqlite;

use crate::services::{ProductService, UserService};

const SCHEMA: &str = include_str!("../schema.sql");

/// Both services over one shared store.
#[derive(Clone)]
pub struct Catalog<S> {
    pub products: ProductService<S>,
    pub users: UserService<S>,
}

impl<S: RecordStore + Clone> Catalog<S> {
    pub fn new(store: S, config: &DataConfig) -> Self {
        Self {
            products: ProductService::new(store.clone(), config),
            users: UserService::new(store, config),
        }
    }
}

impl Catalog<SqlxStore<Sqlite>> {
    /// Connect to a SQLite database and create the catalog tables if missing.
    ///
    /// An in-memory URL gets a single connection that is never recycled,
    /// since every connection to `sqlite::memory:` is a separate database.
    pub async fn connect_sqlite(url: &str, config: &DataConfig) -> Result<Self, DataError> {
        let options = sqlite_pool_options().acquire_timeout(config.statement_timeout());
        let options = if url.contains(":memory:") {
            options.max_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            options.max_connections(5)
        };
        let pool = options
            .connect(url)
            .await
            .map_err(|e| e.into_data_error())?;
        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| e.into_data_error())?;
        tracing::info!(url, "catalog schema applied");
        Ok(Self::new(SqlxStore::new(pool), config))
    }
}
