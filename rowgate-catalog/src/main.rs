use rowgate_catalog::{Catalog, NewProduct, ProductQuery};
use rowgate_data::DataConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = DataConfig::load("application.yaml")?;
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let catalog = Catalog::connect_sqlite(&url, &config).await?;

    if catalog.products.list(&ProductQuery::default()).await?.unfiltered_total == 0 {
        for (name, price, category) in [
            ("The Rust Book", 39.5, "Books"),
            ("Claw Hammer", 12.0, "Tools"),
            ("Socket Set", 54.9, "Tools"),
        ] {
            catalog.products.create(NewProduct::new(name, price, category)).await?;
        }
    }

    let query = ProductQuery {
        category: std::env::args().nth(1),
        ..ProductQuery::default()
    };
    let page = catalog.products.list(&query).await?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
