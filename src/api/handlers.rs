//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheFactory, CacheHandle};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, FlushResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// Backends synchronize internally, so the handle is shared without a lock.
#[derive(Clone)]
pub struct AppState {
    /// The cache served by this process
    pub cache: Arc<CacheHandle>,
}

impl AppState {
    /// Creates a new AppState around an opened cache.
    pub fn new(cache: CacheHandle) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The configured backend becomes the factory default and is opened
    /// with the configured options.
    pub fn from_config(config: &Config, factory: &CacheFactory) -> Result<Self> {
        factory.set_default_backend(config.backend.clone());
        let cache = factory.open(config.cache_options())?;
        Ok(Self::new(cache))
    }

    /// Runs a cache operation on the blocking pool.
    async fn with_cache<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&CacheHandle) -> Result<T> + Send + 'static,
    {
        let cache = self.cache.clone();
        tokio::task::spawn_blocking(move || op(cache.as_ref()))
            .await
            .map_err(|err| CacheError::Internal(err.to_string()))?
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in the cache.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let SetRequest { key, value } = req;
    let response = SetResponse::new(key.clone());
    state.with_cache(move |cache| cache.write(&key, value)).await?;

    Ok(Json(response))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = key.clone();
    let value = state.with_cache(move |cache| cache.read(&lookup)).await?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
///
/// Deletes a key from the cache. Deleting an absent key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let target = key.clone();
    state.with_cache(move |cache| cache.destroy(&target)).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /flush
///
/// Destroys every record of the served cache.
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    state.with_cache(|cache| cache.destroy_all()).await?;

    Ok(Json(FlushResponse::new(state.cache.backend_name())))
}

/// Handler for GET /health
///
/// Returns health status of the service.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.backend_name()))
}
