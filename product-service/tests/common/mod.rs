#![allow(dead_code)]

use async_trait::async_trait;
use product_service::config::{MongoConfig, ProductConfig, StoreBackend, StoreConfig};
use product_service::models::{NewProduct, Product};
use product_service::services::{InMemoryProductStore, ProductStore, StoreError};
use product_service::startup::Application;
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub fn test_config(backend: StoreBackend) -> ProductConfig {
    ProductConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "error".to_string(),
            otlp_endpoint: None,
        },
        mongodb: MongoConfig {
            uri: Secret::new(
                std::env::var("MONGODB_URI")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            database: "product_test".to_string(),
        },
        store: StoreConfig { backend },
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: Arc<dyn ProductStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the full application on a random port, backed by a fresh
    /// in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(InMemoryProductStore::new())).await
    }

    pub async fn spawn_with_store(store: Arc<dyn ProductStore>) -> Self {
        let app = Application::with_store(test_config(StoreBackend::Memory), store)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let store = app.store();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_product(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/products"))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a product and return its assigned id.
    pub async fn seed(&self, body: Value) -> String {
        let response = self.create_product(body).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let created: Value = response.json().await.expect("Failed to parse JSON");
        created["id"]
            .as_str()
            .expect("created product has no id")
            .to_string()
    }
}

/// Store double whose every operation fails with a backend error.
pub struct UnavailableStore;

fn unavailable() -> StoreError {
    StoreError::Backend(anyhow::anyhow!("connection refused"))
}

#[async_trait]
impl ProductStore for UnavailableStore {
    async fn find_all(&self) -> Result<Vec<Product>, StoreError> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Product>, StoreError> {
        Err(unavailable())
    }

    async fn find_by_name(&self, _name: &str) -> Result<Vec<Product>, StoreError> {
        Err(unavailable())
    }

    async fn search_by_name(&self, _pattern: &str) -> Result<Vec<Product>, StoreError> {
        Err(unavailable())
    }

    async fn insert(&self, _new: NewProduct) -> Result<Product, StoreError> {
        Err(unavailable())
    }

    async fn save(&self, _product: Product) -> Result<Product, StoreError> {
        Err(unavailable())
    }

    async fn delete_by_id(&self, _id: &str) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        Err(unavailable())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }
}
