use serde::{Deserialize, Serialize};

use super::model::Product;

/// Body for product creation. Fields are optional so that every missing or
/// invalid one can be reported in a single validation message.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
}

/// Catalog listing with a count.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub count: usize,
}
