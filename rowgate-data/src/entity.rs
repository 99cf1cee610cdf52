use crate::error::DataError;
use crate::param::{BindParam, SqlType};
use crate::record::Record;

/// A projected column: its name and the type its values bind and decode as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: SqlType,
}

impl Column {
    pub const fn new(name: &'static str, ty: SqlType) -> Self {
        Self { name, ty }
    }

    /// Bind `value` for this column, using the column's declared type.
    pub fn bind(&self, value: impl Into<crate::param::Value>) -> Result<BindParam, DataError> {
        BindParam::bind(self.name, self.ty, value)
    }
}

/// Trait representing a database entity with a table name, id column, and
/// an explicit projection.
///
/// `columns()` is the allowlist every read projects. Secret columns are
/// left out of it, which makes them unreachable from any plan built for the
/// entity.
///
/// # Example
///
/// ```ignore
/// impl Entity for Product {
///     fn table_name() -> &'static str { "products" }
///     fn id_column() -> &'static str { "id" }
///     fn columns() -> &'static [Column] { &PRODUCT_COLUMNS }
///     fn from_record(record: Record) -> Result<Self, DataError> { ... }
///     fn id(&self) -> i64 { self.id }
/// }
/// ```
pub trait Entity: Sized + Send + Sync + Unpin + 'static {
    fn table_name() -> &'static str;
    fn id_column() -> &'static str;
    fn columns() -> &'static [Column];

    /// Column used to order paged reads. `None` makes paging a precondition failure.
    fn order_key() -> Option<&'static str> {
        Some(Self::id_column())
    }

    fn from_record(record: Record) -> Result<Self, DataError>;
    fn id(&self) -> i64;

    /// Look up a projected column by name.
    fn column(name: &str) -> Option<Column> {
        Self::columns().iter().copied().find(|c| c.name == name)
    }
}

/// An entity that can be created from a draft through the atomic creator.
pub trait Creatable: Entity {
    type Draft: Send + Sync;

    /// Bind every client-supplied column of the draft.
    ///
    /// The identifier and server-defaulted columns must not appear here.
    fn insert_values(draft: &Self::Draft) -> Result<Vec<(&'static str, BindParam)>, DataError>;
}

/// An entity whose table also stores a username and a password hash.
pub trait Authenticatable: Entity {
    fn username_column() -> &'static str;
    fn secret_column() -> &'static str;
}
