//! # rowgate-data-sqlx: SQLx backend for rowgate-data
//!
//! This crate provides the [SQLx](https://github.com/launchbadge/sqlx)-specific
//! implementation of the [`RecordStore`](rowgate_data::RecordStore) capability.
//! It renders plans with the engine's `QueryBuilder`, binds every parameter
//! through the driver, and decodes rows by the declared column types.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxStore`] | Pool-backed store for `Sqlite` or `Postgres` |
//! | [`SqlxTx`] | Transaction wrapper; rolls back on drop |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//! | [`sqlite_pool_options`] | SQLite pool options with Unicode `lower()` installed |
//!
//! # Feature flags
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` (default) |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//!
//! Columns declared `Integer` decode as `i64` and `Decimal` as `f64`, so on
//! Postgres keys are `BIGINT`/`BIGSERIAL` and decimals `DOUBLE PRECISION`.
//!
//! Case-insensitive filters compare `LOWER(col)` with a value lowercased in
//! Rust. SQLite pools must be built with [`sqlite_pool_options`] (or call
//! [`register_unicode_lower`] from their own `after_connect`) so that
//! `LOWER()` folds non-ASCII text too.
//!
//! # Quick start
//!
//! ```ignore
//! use rowgate_data_sqlx::SqlxStore;
//! use sqlx::Sqlite;
//!
//! let pool = rowgate_data_sqlx::sqlite_pool_options()
//!     .connect("sqlite://shop.db")
//!     .await?;
//! let store = SqlxStore::<Sqlite>::new(pool);
//! ```
//!
//! # Error bridging
//!
//! Due to Rust's orphan rules, `From<sqlx::Error> for DataError` can't be
//! implemented here. Use the [`SqlxErrorExt`] trait instead:
//!
//! ```ignore
//! use rowgate_data_sqlx::SqlxErrorExt;
//!
//! sqlx::query("DELETE FROM sessions")
//!     .execute(store.pool())
//!     .await
//!     .map_err(|e| e.into_data_error())?;
//! ```

pub mod error;
#[cfg(feature = "sqlite")]
pub mod fold;
pub mod store;
pub mod tx;

pub use error::{SqlxErrorExt, SqlxResult};
#[cfg(feature = "sqlite")]
pub use fold::{register_unicode_lower, sqlite_pool_options};
pub use store::SqlxStore;
pub use tx::SqlxTx;

/// Re-exports of the most commonly used types from both `rowgate-data` and this crate.
pub mod prelude {
    pub use crate::{SqlxErrorExt, SqlxStore, SqlxTx};
    pub use rowgate_data::prelude::*;
}
