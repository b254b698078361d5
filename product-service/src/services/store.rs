//! Persistence seam for products.
//!
//! Handlers talk to an `Arc<dyn ProductStore>`; MongoDB backs it in
//! production and [`InMemoryProductStore`](super::InMemoryProductStore) in
//! tests or database-less runs. Both validate documents the same way and use
//! ObjectId identifiers, so they are interchangeable behind the handlers.

use crate::models::{NewProduct, Product};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cast to ObjectId failed for value \"{0}\" at path \"_id\"")]
    InvalidId(String),

    #[error("Product validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("No document found for id \"{0}\"")]
    NotFound(String),

    #[error("{0}")]
    Backend(#[from] anyhow::Error),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(anyhow::Error::new(err))
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StoreError>;

    /// Products whose name equals `name` exactly.
    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, StoreError>;

    /// Products whose name matches `pattern` as a case-insensitive regular
    /// expression. The pattern is used as given, not escaped.
    ///
    /// The dialect is the backend's: MongoDB evaluates PCRE, the in-memory
    /// store the `regex` crate, which rejects lookaround and backreferences.
    /// Such patterns are a `Backend` error there.
    async fn search_by_name(&self, pattern: &str) -> Result<Vec<Product>, StoreError>;

    /// Validate and persist a new product, returning it with its assigned id.
    async fn insert(&self, new: NewProduct) -> Result<Product, StoreError>;

    /// Validate and replace an existing product in full.
    async fn save(&self, product: Product) -> Result<Product, StoreError>;

    /// Returns `false` when no product had that id.
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;

    /// Returns the number of products removed.
    async fn delete_all(&self) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

pub fn parse_object_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}
