#![allow(dead_code)]

use rowgate_catalog::{Catalog, NewProduct, Product};
use rowgate_data::DataConfig;
use rowgate_data_sqlx::SqlxStore;
use sqlx::Sqlite;

pub type TestCatalog = Catalog<SqlxStore<Sqlite>>;

pub async fn catalog() -> TestCatalog {
    Catalog::connect_sqlite("sqlite::memory:", &DataConfig::default())
        .await
        .unwrap()
}

pub fn draft(name: &str, price: f64, category: &str) -> NewProduct {
    NewProduct::new(name, price, category)
}

/// Twelve in-range books interleaved with tools, out-of-range books and
/// one inactive-looking description, so filters have something to exclude.
pub async fn seeded() -> (TestCatalog, Vec<Product>) {
    let catalog = catalog().await;
    let mut created = Vec::new();
    for i in 1..=12 {
        let mut book = draft(&format!("Book {i:02}"), 10.0 + (i as f64 - 1.0) * 3.5, "Books");
        book.description = Some(format!("volume {i} of the series"));
        created.push(catalog.products.create(book).await.unwrap());
        let tool = draft(&format!("Tool {i:02}"), 20.0, "Tools");
        created.push(catalog.products.create(tool).await.unwrap());
    }
    created.push(catalog.products.create(draft("Rare Folio", 120.0, "Books")).await.unwrap());
    created.push(catalog.products.create(draft("Pamphlet", 2.5, "Books")).await.unwrap());
    let mut saw = draft("Saw", 15.0, "Tools");
    saw.description = Some("cuts 100% of lumber".into());
    created.push(catalog.products.create(saw).await.unwrap());
    (catalog, created)
}
