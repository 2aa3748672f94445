use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;

use super::model::{NewProduct, Product};

#[async_trait]
pub trait ProductRepo: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<Product>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Product>>;
    async fn insert(&self, new: NewProduct) -> anyhow::Result<Product>;
    /// Remove a product, returning the removed row if it existed.
    async fn delete(&self, id: i64) -> anyhow::Result<Option<Product>>;
}

/// Process-local catalog with monotonically increasing ids.
pub struct MemoryProductRepo {
    inner: RwLock<Vec<Product>>,
    next_id: AtomicI64,
}

impl MemoryProductRepo {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Catalog preloaded with a small demo inventory.
    pub fn with_demo_data() -> Self {
        let demo = vec![
            Product {
                id: 1,
                name: "Laptop".into(),
                price: 999.99,
                category: "Electronics".into(),
                in_stock: true,
            },
            Product {
                id: 2,
                name: "Wireless Mouse".into(),
                price: 29.99,
                category: "Electronics".into(),
                in_stock: true,
            },
            Product {
                id: 3,
                name: "Desk Chair".into(),
                price: 199.99,
                category: "Furniture".into(),
                in_stock: false,
            },
        ];
        Self {
            next_id: AtomicI64::new(demo.len() as i64 + 1),
            inner: RwLock::new(demo),
        }
    }
}

impl Default for MemoryProductRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepo for MemoryProductRepo {
    async fn list(&self) -> anyhow::Result<Vec<Product>> {
        let items = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("product store lock poisoned"))?;
        Ok(items.clone())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Product>> {
        let items = self
            .inner
            .read()
            .map_err(|_| anyhow::anyhow!("product store lock poisoned"))?;
        Ok(items.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, new: NewProduct) -> anyhow::Result<Product> {
        let mut items = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("product store lock poisoned"))?;
        let product = Product {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: new.name,
            price: new.price,
            category: new.category,
            in_stock: new.in_stock,
        };
        items.push(product.clone());
        Ok(product)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<Option<Product>> {
        let mut items = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("product store lock poisoned"))?;
        let position = items.iter().position(|p| p.id == id);
        Ok(position.map(|idx| items.remove(idx)))
    }
}

pub struct PgProductRepo {
    pool: PgPool,
}

impl PgProductRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepo for PgProductRepo {
    async fn list(&self) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, category, in_stock
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, category, in_stock
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn insert(&self, new: NewProduct) -> anyhow::Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, category, in_stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, category, in_stock
            "#,
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(&new.category)
        .bind(new.in_stock)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, name, price, category, in_stock
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }
}
