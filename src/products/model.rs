use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
}

/// Fields needed to create a product; the id is assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
}
