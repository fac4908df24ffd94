//! services/api/src/web/deadline.rs
//!
//! The per-request deadline. It is fixed when the request is extracted and every
//! service call a handler makes runs against the same instant, so a slow store
//! cannot hold a request past `HTTP_REQUEST_TIMEOUT`.

use crate::web::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use qa_core::error::{DomainError, DomainResult};
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

#[derive(Clone, Copy, Debug)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    /// Runs a service call, dropping it once the deadline passes.
    /// Expiry is reported as a query failure.
    pub async fn run<T, F>(&self, call: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout_at(self.0, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Request deadline elapsed before the service call completed");
                Err(DomainError::DatabaseQuery)
            }
        }
    }
}

impl FromRequestParts<Arc<AppState>> for Deadline {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::after(state.config.server.request_timeout))
    }
}
