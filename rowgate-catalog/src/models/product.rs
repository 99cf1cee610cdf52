use chrono::{DateTime, Utc};
use garde::Validate;
use rowgate_data::{BindParam, Column, Creatable, DataError, Entity, PageRequest, Record, SqlType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
    pub created_date: DateTime<Utc>,
    pub is_active: bool,
}

impl Product {
    pub const ID: Column = Column::new("id", SqlType::Integer);
    pub const NAME: Column = Column::new("name", SqlType::VarChar(100));
    pub const DESCRIPTION: Column = Column::new("description", SqlType::Text);
    pub const PRICE: Column = Column::new("price", SqlType::Decimal);
    pub const CATEGORY: Column = Column::new("category", SqlType::VarChar(50));
    pub const IN_STOCK: Column = Column::new("in_stock", SqlType::Bool);
    pub const CREATED_DATE: Column = Column::new("created_date", SqlType::Timestamp);
    pub const IS_ACTIVE: Column = Column::new("is_active", SqlType::Bool);
}

const PRODUCT_COLUMNS: [Column; 8] = [
    Product::ID,
    Product::NAME,
    Product::DESCRIPTION,
    Product::PRICE,
    Product::CATEGORY,
    Product::IN_STOCK,
    Product::CREATED_DATE,
    Product::IS_ACTIVE,
];

impl Entity for Product {
    fn table_name() -> &'static str {
        "products"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn columns() -> &'static [Column] {
        &PRODUCT_COLUMNS
    }

    fn from_record(record: Record) -> Result<Self, DataError> {
        Ok(Self {
            id: record.get_i64("id")?,
            name: record.get_str("name")?,
            description: record.get_opt_str("description")?,
            price: record.get_f64("price")?,
            category: record.get_str("category")?,
            in_stock: record.get_bool("in_stock")?,
            created_date: record.get_timestamp("created_date")?,
            is_active: record.get_bool("is_active")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

impl Creatable for Product {
    type Draft = NewProduct;

    fn insert_values(draft: &NewProduct) -> Result<Vec<(&'static str, BindParam)>, DataError> {
        Ok(vec![
            ("name", Product::NAME.bind(draft.name.as_str())?),
            ("description", Product::DESCRIPTION.bind(draft.description.as_deref())?),
            ("price", Product::PRICE.bind(draft.price)?),
            ("category", Product::CATEGORY.bind(draft.category.as_str())?),
            ("in_stock", Product::IN_STOCK.bind(draft.in_stock)?),
        ])
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[garde(length(chars, min = 3, max = 100))]
    pub name: String,
    #[garde(skip)]
    #[serde(default)]
    pub description: Option<String>,
    #[garde(custom(positive_price))]
    pub price: f64,
    #[garde(length(chars, min = 1, max = 50))]
    pub category: String,
    #[garde(skip)]
    #[serde(default, alias = "inStock")]
    pub in_stock: bool,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            category: category.into(),
            in_stock: false,
        }
    }
}

fn positive_price(value: &f64, _: &()) -> garde::Result {
    if value.is_finite() && *value > 0.0 {
        Ok(())
    } else {
        Err(garde::Error::new("must be greater than zero"))
    }
}

/// Listing parameters as they arrive from a query string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub category: Option<String>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<f64>,
    #[serde(alias = "searchTerm")]
    pub search_term: Option<String>,
    pub page: i64,
    #[serde(alias = "pageSize")]
    pub page_size: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        let page = PageRequest::default();
        Self {
            category: None,
            min_price: None,
            max_price: None,
            search_term: None,
            page: page.page,
            page_size: page.page_size,
        }
    }
}

impl ProductQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}
