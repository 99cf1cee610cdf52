use garde::Validate;
use rowgate_data::{
    AtomicCreator, DataConfig, DataError, FilterSpec, Page, PageRequest, Pager, RecordReader,
    RecordStore,
};

use crate::error::CatalogError;
use crate::models::{NewProduct, Product, ProductQuery};

#[derive(Clone)]
pub struct ProductService<S> {
    pager: Pager<Product, S>,
    reader: RecordReader<Product, S>,
    creator: AtomicCreator<Product, S>,
}

impl<S: RecordStore + Clone> ProductService<S> {
    pub fn new(store: S, config: &DataConfig) -> Self {
        Self {
            pager: Pager::new(store.clone(), config),
            reader: RecordReader::new(store.clone(), config),
            creator: AtomicCreator::new(store, config),
        }
    }

    /// Page through products matching every filter present in `query`.
    pub async fn list(&self, query: &ProductQuery) -> Result<Page<Product>, CatalogError> {
        let filter = FilterSpec::new()
            .eq(Product::CATEGORY, query.category.as_deref())
            .gte(Product::PRICE, query.min_price)
            .lte(Product::PRICE, query.max_price)
            .contains_any(&[Product::NAME, Product::DESCRIPTION], query.search_term.as_deref());
        Ok(self.pager.paginate(&filter, &query.page_request()).await?)
    }

    /// Case-insensitive substring search over name and description.
    pub async fn search(
        &self,
        term: &str,
        page: &PageRequest,
    ) -> Result<Page<Product>, CatalogError> {
        if term.trim().is_empty() {
            return Err(DataError::invalid_parameter("search_term", "must not be empty").into());
        }
        let filter =
            FilterSpec::new().contains_any(&[Product::NAME, Product::DESCRIPTION], Some(term));
        Ok(self.pager.paginate(&filter, page).await?)
    }

    /// Products in `category`, compared without regard to case.
    pub async fn list_by_category(
        &self,
        category: &str,
        page: &PageRequest,
    ) -> Result<Page<Product>, CatalogError> {
        if category.trim().is_empty() {
            return Err(DataError::invalid_parameter("category", "must not be empty").into());
        }
        let filter = FilterSpec::new().eq_ignore_case(Product::CATEGORY, Some(category));
        Ok(self.pager.paginate(&filter, page).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>, CatalogError> {
        Ok(self.reader.find_by_id(id).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Product, CatalogError> {
        Ok(self.reader.get_by_id(id).await?)
    }

    pub async fn create(&self, draft: NewProduct) -> Result<Product, CatalogError> {
        draft.validate()?;
        let product = self.creator.create(&draft).await?;
        tracing::info!(id = product.id, category = %product.category, "product created");
        Ok(product)
    }
}
