pub mod product;
pub mod user;

pub use product::{NewProduct, Product, ProductQuery};
pub use user::{NewUser, User};
