use crate::models::{NewProduct, Product};
use crate::services::store::{parse_object_id, ProductStore, StoreError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use validator::Validate;

const PRODUCTS_COLLECTION: &str = "products";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for product-service");

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .name("name_lookup".to_string())
                    .build(),
            )
            .build();

        self.products()
            .create_index(name_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create name index on products collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on products.name");

        Ok(())
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection(PRODUCTS_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    async fn find_many(&self, filter: Document) -> Result<Vec<Product>, StoreError> {
        let cursor = self.products().find(filter, None).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[async_trait]
impl ProductStore for MongoDb {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        self.find_many(doc! {}).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let oid = parse_object_id(id)?;
        Ok(self.products().find_one(doc! { "_id": oid }, None).await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, StoreError> {
        self.find_many(doc! { "name": name }).await
    }

    async fn search_by_name(&self, pattern: &str) -> Result<Vec<Product>, StoreError> {
        self.find_many(doc! { "name": { "$regex": pattern, "$options": "i" } })
            .await
    }

    async fn insert(&self, new: NewProduct) -> Result<Product, StoreError> {
        new.validate()?;

        let mut product = Product::from_new(new);
        product.id = Some(ObjectId::new());

        self.products().insert_one(&product, None).await?;
        Ok(product)
    }

    async fn save(&self, product: Product) -> Result<Product, StoreError> {
        product.validate()?;

        let oid = product
            .id
            .ok_or_else(|| StoreError::Backend(anyhow::anyhow!("Cannot save a product without an id")))?;

        let result = self
            .products()
            .replace_one(doc! { "_id": oid }, &product, None)
            .await?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound(oid.to_hex()));
        }

        Ok(product)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let oid = parse_object_id(id)?;
        let result = self.products().delete_one(doc! { "_id": oid }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = self.products().delete_many(doc! {}, None).await?;
        Ok(result.deleted_count)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }
}
