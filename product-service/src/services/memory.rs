use crate::models::{NewProduct, Product};
use crate::services::store::{parse_object_id, ProductStore, StoreError};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use regex::RegexBuilder;
use std::sync::{Mutex, MutexGuard};
use validator::Validate;

/// Process-local product store.
///
/// Keeps insertion order, which is what a full collection scan returns from
/// MongoDB for a collection that only ever sees inserts and in-place saves.
#[derive(Default)]
pub struct InMemoryProductStore {
    products: Mutex<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Product>>, StoreError> {
        self.products
            .lock()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("In-memory product store is poisoned")))
    }

    fn filter(&self, predicate: impl Fn(&Product) -> bool) -> Result<Vec<Product>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|&p| predicate(p))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.lock()?.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let oid = parse_object_id(id)?;
        Ok(self.lock()?.iter().find(|p| p.id == Some(oid)).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, StoreError> {
        self.filter(|p| p.name == name)
    }

    // `regex` syntax, not PCRE: no lookaround or backreferences.
    async fn search_by_name(&self, pattern: &str) -> Result<Vec<Product>, StoreError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("Regular expression is invalid: {}", e)))?;

        self.filter(|p| regex.is_match(&p.name))
    }

    async fn insert(&self, new: NewProduct) -> Result<Product, StoreError> {
        new.validate()?;

        let mut product = Product::from_new(new);
        product.id = Some(ObjectId::new());

        self.lock()?.push(product.clone());
        Ok(product)
    }

    async fn save(&self, product: Product) -> Result<Product, StoreError> {
        product.validate()?;

        let oid = product
            .id
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("Cannot save a product without an id")))?;

        let mut products = self.lock()?;
        let slot = products
            .iter_mut()
            .find(|p| p.id == Some(oid))
            .ok_or_else(|| StoreError::NotFound(oid.to_hex()))?;
        *slot = product.clone();

        Ok(product)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let oid = parse_object_id(id)?;
        let mut products = self.lock()?;
        let before = products.len();
        products.retain(|p| p.id != Some(oid));
        Ok(products.len() != before)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut products = self.lock()?;
        let removed = products.len() as u64;
        products.clear();
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
