//! HTTP handlers for the `/products` resource.
//!
//! Each handler performs one store operation (two for update and delete,
//! which look the product up first) and maps the outcome to a response.
//! Lookup-then-write sequences are not atomic: a concurrent delete between
//! the two calls surfaces as a 404 from update and as a no-op from delete.

use crate::dtos::{CreateProductRequest, MessageResponse, ProductResponse, UpdateProductRequest};
use crate::models::Product;
use crate::services::StoreError;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use service_core::extract::JsonBody;

pub const PRODUCT_NOT_FOUND: &str = "Product not found";
pub const NO_PRODUCTS_WITH_NAME: &str = "No products found with that name";
pub const PRODUCT_DELETED: &str = "Product deleted";
pub const ALL_PRODUCTS_DELETED: &str = "All products deleted";

/// Reads and deletes: every store failure is a 500 carrying its message.
fn read_failure(err: StoreError) -> AppError {
    tracing::error!(error = %err, "Product store read failed");
    AppError::DatabaseError(anyhow::Error::new(err))
}

/// Writes: the store rejected the input, 400 carrying its message.
fn write_failure(err: StoreError) -> AppError {
    tracing::warn!(error = %err, "Product store rejected write");
    AppError::BadRequest(anyhow::Error::new(err))
}

fn product_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!(PRODUCT_NOT_FOUND))
}

fn to_responses(products: Vec<Product>) -> Vec<ProductResponse> {
    products.into_iter().map(ProductResponse::from).collect()
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.store.find_all().await.map_err(read_failure)?;
    tracing::debug!(count = products.len(), "Listed products");

    Ok(Json(to_responses(products)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state
        .store
        .find_by_id(&id)
        .await
        .map_err(read_failure)?
        .ok_or_else(product_not_found)?;

    Ok(Json(ProductResponse::from(product)))
}

/// `GET /products/name/:name`: case-insensitive pattern match on the name.
pub async fn search_products_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state
        .store
        .search_by_name(&name)
        .await
        .map_err(read_failure)?;

    if products.is_empty() {
        return Err(AppError::NotFound(anyhow::anyhow!(NO_PRODUCTS_WITH_NAME)));
    }

    tracing::debug!(pattern = %name, count = products.len(), "Matched products by name");
    Ok(Json(to_responses(products)))
}

/// `GET /products/name/exact/:name`: name must match byte for byte.
pub async fn get_products_by_exact_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state
        .store
        .find_by_name(&name)
        .await
        .map_err(read_failure)?;

    if products.is_empty() {
        return Err(AppError::NotFound(anyhow::anyhow!(NO_PRODUCTS_WITH_NAME)));
    }

    Ok(Json(to_responses(products)))
}

pub async fn create_product(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let product = state
        .store
        .insert(payload.into())
        .await
        .map_err(write_failure)?;

    tracing::info!(
        product_id = ?product.id,
        name = %product.name,
        "Created product"
    );

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    let mut product = state
        .store
        .find_by_id(&id)
        .await
        .map_err(write_failure)?
        .ok_or_else(product_not_found)?;

    product.merge(payload.into());

    let updated = state.store.save(product).await.map_err(|e| match e {
        StoreError::NotFound(_) => product_not_found(),
        other => write_failure(other),
    })?;

    tracing::info!(product_id = %id, "Updated product");
    Ok(Json(ProductResponse::from(updated)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .store
        .find_by_id(&id)
        .await
        .map_err(read_failure)?
        .ok_or_else(product_not_found)?;

    state.store.delete_by_id(&id).await.map_err(read_failure)?;

    tracing::info!(product_id = %id, "Deleted product");
    Ok(Json(MessageResponse::new(PRODUCT_DELETED)))
}

pub async fn delete_all_products(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let removed = state.store.delete_all().await.map_err(read_failure)?;

    tracing::info!(removed, "Deleted all products");
    Ok(Json(MessageResponse::new(ALL_PRODUCTS_DELETED)))
}
