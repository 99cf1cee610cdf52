pub mod config;
pub mod creator;
pub mod credentials;
pub mod entity;
pub mod error;
pub mod filter;
pub mod page;
pub mod pager;
pub mod param;
pub mod plan;
pub mod query;
pub mod reader;
pub mod record;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, CredentialLimits, DataConfig};
pub use creator::{AtomicCreator, CreateState};
pub use credentials::{Credential, CredentialValidator, Secret};
pub use entity::{Authenticatable, Column, Creatable, Entity};
pub use error::{DataError, ErrorKind};
pub use filter::{FilterOp, FilterSpec, Predicate};
pub use page::{Page, PageRequest, PageWindow};
pub use pager::Pager;
pub use param::{BindParam, SqlType, Value};
pub use plan::{CountPlan, InsertPlan, SelectPlan};
pub use query::{Dialect, IdentifierPolicy, QueryBuilder, QueryError, Statement};
pub use reader::RecordReader;
pub use record::Record;
pub use store::{RecordStore, StoreTx};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        AtomicCreator, Authenticatable, Column, Creatable, Credential, CredentialValidator,
        DataConfig, DataError, Entity, FilterSpec, Page, PageRequest, Pager, Record, RecordReader,
        RecordStore, SqlType,
    };
}
