//! Custom Axum extractors.
//!
//! - `CorrelationId`: the request's correlation ID, as assigned by the middleware
//! - `ValidJson`: a JSON body that is deserialized and then validated
//!
//! # Examples
//!
//! ```ignore
//! use todo_kv_web::extractors::{CorrelationId, ValidJson};
//!
//! async fn handler(
//!     correlation_id: CorrelationId,
//!     ValidJson(request): ValidJson<CreateListRequest>,
//! ) -> Result<Json<TodoList>, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, "Creating list");
//!     // ...
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Prefers the ID stored by the correlation-id middleware, then the
/// `X-Correlation-ID` header, and generates a new UUID v4 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| Uuid::parse_str(s).ok())
            })
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Request payloads that check their own field constraints.
pub trait Validate {
    /// Check the payload.
    ///
    /// # Errors
    ///
    /// Returns a 422 `AppError` describing the first invalid field.
    fn validate(&self) -> Result<(), AppError>;
}

/// JSON body extractor that rejects with 422 on malformed or invalid input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}
