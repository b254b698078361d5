//! Request extractors whose rejections render as [`AppError`].

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Json, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

/// Drop-in replacement for [`axum::Json`] on the request side.
///
/// Malformed or mistyped bodies are rejected with `400 {"message": ...}`
/// instead of axum's plain-text rejection, so every error a client sees has
/// the same shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                AppError::BadRequest(anyhow::anyhow!(rejection.body_text()))
            })?;

        Ok(JsonBody(value))
    }
}
