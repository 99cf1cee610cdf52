//! Product catalog and user directory built on `rowgate-data`.
//!
//! ```ignore
//! let config = DataConfig::load("application.yaml")?;
//! let catalog = Catalog::connect_sqlite("sqlite://shop.db", &config).await?;
//! let page = catalog.products.list(&ProductQuery::default()).await?;
//! ```

pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use error::CatalogError;
pub use models::{NewProduct, NewUser, Product, ProductQuery, User};
pub use services::{ProductService, UserService};
pub use state::Catalog;
