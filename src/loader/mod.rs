//! Loader factories: the view-facing side of the fetch pipeline.
//!
//! A loader owns one fetch-and-store operation. It flips the shared loading
//! flag, calls the service, stores the (optionally transformed) payload, and
//! on failure hands itself to the error handler as the retry callback, which
//! closes the loop: the handler can re-run the loader after a delay.
//!
//! Loaders hold only a `Weak` reference to themselves and carry a liveness
//! flag. When the owning view is torn down it calls [`DataLoader::retire`]
//! (or drops the `Arc`), and any retry still scheduled against the loader
//! becomes a no-op instead of mutating freed view state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use futures::future::BoxFuture;
use thiserror::Error;

use crate::api::ApiResponse;
use crate::error::Failure;
use crate::handler::{ErrorHandler, RetryContext, RetryFn};

/// Gives each loader instance a distinct default retry key.
static LOADER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Failure to construct a loader: a programming error, raised at build time
/// before any fetch can happen.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required builder option was not supplied.
    #[error("{factory}: required option missing: {option}")]
    MissingOption {
        /// Which factory rejected the configuration.
        factory: &'static str,
        /// The missing option.
        option: &'static str,
    },
}

/// Fetch operation for collection loaders.
pub type FetchFn<T> =
    Arc<dyn Fn() -> BoxFuture<'static, Result<ApiResponse<T>, Failure>> + Send + Sync>;

/// Fetch operation for item loaders; receives the id to fetch.
pub type FetchByIdFn<T> =
    Arc<dyn Fn(String) -> BoxFuture<'static, Result<ApiResponse<T>, Failure>> + Send + Sync>;

/// Supplies the id for an item loader, read at call time: navigating to a
/// new id before the loader re-fires picks up the new value.
pub type GetIdFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Optional payload transformation. A transform error never propagates; the
/// loader logs it and stores the untransformed payload.
pub type TransformFn<T> = Arc<dyn Fn(&T) -> Result<T, String> + Send + Sync>;

/// Loading flag and data slot shared between a view and its loader.
///
/// The view owns the `Arc`; the loader mutates through it as a side effect.
/// `loading` is true from the moment a load starts until the fetch settles,
/// success or failure.
#[derive(Debug, Default)]
pub struct LoaderState<T> {
    loading: AtomicBool,
    data: RwLock<Option<T>>,
}

impl<T> LoaderState<T> {
    /// Creates an empty, shareable state.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self {
            loading: AtomicBool::new(false),
            data: RwLock::new(None),
        })
    }

    /// Returns true while a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Stores a payload directly. Views use this for optimistic updates;
    /// loaders use it on every successful fetch.
    pub fn set_data(&self, value: T) {
        *self.data.write().unwrap() = Some(value);
    }

    fn set_loading(&self, loading: bool) {
        self.loading.store(loading, Ordering::SeqCst);
    }
}

impl<T: Clone> LoaderState<T> {
    /// Returns a copy of the stored payload, if any.
    pub fn data(&self) -> Option<T> {
        self.data.read().unwrap().clone()
    }
}

/// Loads a collection-style payload: `service()` with no arguments.
pub struct DataLoader<T> {
    state: Arc<LoaderState<T>>,
    service: FetchFn<T>,
    entity_name: String,
    handler: ErrorHandler,
    transform: Option<TransformFn<T>>,
    retry_key: String,
    alive: AtomicBool,
    this: Weak<DataLoader<T>>,
}

impl<T> std::fmt::Debug for DataLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLoader")
            .field("entity_name", &self.entity_name)
            .field("retry_key", &self.retry_key)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> DataLoader<T> {
    /// Starts building a loader.
    pub fn builder() -> DataLoaderBuilder<T> {
        DataLoaderBuilder::default()
    }

    /// Runs one fetch-and-store pass.
    ///
    /// Safe to call repeatedly; overlapping calls run concurrently. The
    /// returned future always completes successfully; failures are absorbed
    /// by the handler and surface only as notices, redirects, or retries.
    pub async fn load(&self) {
        if !self.alive.load(Ordering::SeqCst) {
            return;
        }
        self.state.set_loading(true);

        match (self.service)().await {
            Ok(response) => self.store(response.data),
            Err(failure) => {
                let context = RetryContext::new()
                    .with_retry_fn(self.retry_fn())
                    .with_retry_key(self.retry_key.clone());
                self.handler.handle(&failure, context);
            }
        }

        if self.alive.load(Ordering::SeqCst) {
            self.state.set_loading(false);
        }
    }

    /// Marks the loader as dead. Pending retries against it become no-ops.
    pub fn retire(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// The retry key this loader reports to the handler.
    pub fn retry_key(&self) -> &str {
        &self.retry_key
    }

    fn store(&self, payload: T) {
        if !self.alive.load(Ordering::SeqCst) {
            return;
        }
        let value = self.apply_transform(payload);
        self.state.set_data(value);
        tracing::info!(entity = %self.entity_name, "loaded");
    }

    fn apply_transform(&self, payload: T) -> T {
        let Some(transform) = &self.transform else {
            return payload;
        };
        match transform(&payload) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(
                    entity = %self.entity_name,
                    error = %err,
                    "failed to transform data, storing raw payload"
                );
                payload
            }
        }
    }

    fn retry_fn(&self) -> RetryFn {
        let weak = self.this.clone();
        Arc::new(move || {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(loader) = weak.upgrade() {
                    loader.load().await;
                }
            })
        })
    }
}

/// Builder for [`DataLoader`]. Missing required options fail at
/// [`build`](DataLoaderBuilder::build), before any fetch occurs.
pub struct DataLoaderBuilder<T> {
    state: Option<Arc<LoaderState<T>>>,
    service: Option<FetchFn<T>>,
    entity_name: Option<String>,
    handler: Option<ErrorHandler>,
    transform: Option<TransformFn<T>>,
    retry_key: Option<String>,
}

impl<T> Default for DataLoaderBuilder<T> {
    fn default() -> Self {
        Self {
            state: None,
            service: None,
            entity_name: None,
            handler: None,
            transform: None,
            retry_key: None,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> DataLoaderBuilder<T> {
    /// Sets the shared loading/data state. Required.
    pub fn state(mut self, state: Arc<LoaderState<T>>) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the fetch operation. Required.
    pub fn service(mut self, service: FetchFn<T>) -> Self {
        self.service = Some(service);
        self
    }

    /// Sets the entity name used in log lines. Required.
    pub fn entity_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Sets the error handler. Required.
    pub fn handler(mut self, handler: ErrorHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the optional payload transformation.
    pub fn transform(mut self, transform: TransformFn<T>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Overrides the instance-unique default retry key. Two loaders given
    /// the same key share one retry counter.
    pub fn retry_key(mut self, key: impl Into<String>) -> Self {
        self.retry_key = Some(key.into());
        self
    }

    /// Validates the configuration and builds the loader.
    pub fn build(self) -> Result<Arc<DataLoader<T>>, ConfigurationError> {
        const FACTORY: &str = "DataLoader";
        let state = require(self.state, FACTORY, "state")?;
        let service = require(self.service, FACTORY, "service")?;
        let entity_name = require(self.entity_name, FACTORY, "entity_name")?;
        let handler = require(self.handler, FACTORY, "handler")?;
        let retry_key = self
            .retry_key
            .unwrap_or_else(|| instance_key(&entity_name));
        let transform = self.transform;

        Ok(Arc::new_cyclic(|this| DataLoader {
            state,
            service,
            entity_name,
            handler,
            transform,
            retry_key,
            alive: AtomicBool::new(true),
            this: this.clone(),
        }))
    }
}

/// Loads a single item by id: `service(get_id())`.
pub struct ItemLoader<T> {
    state: Arc<LoaderState<T>>,
    service: FetchByIdFn<T>,
    get_id: GetIdFn,
    entity_name: String,
    handler: ErrorHandler,
    transform: Option<TransformFn<T>>,
    retry_key: String,
    alive: AtomicBool,
    this: Weak<ItemLoader<T>>,
}

impl<T> std::fmt::Debug for ItemLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemLoader")
            .field("entity_name", &self.entity_name)
            .field("retry_key", &self.retry_key)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> ItemLoader<T> {
    /// Starts building an item loader.
    pub fn builder() -> ItemLoaderBuilder<T> {
        ItemLoaderBuilder::default()
    }

    /// Runs one fetch-and-store pass for the id `get_id` currently yields.
    pub async fn load(&self) {
        if !self.alive.load(Ordering::SeqCst) {
            return;
        }
        self.state.set_loading(true);

        let id = (self.get_id)();
        match (self.service)(id.clone()).await {
            Ok(response) => self.store(response.data, &id),
            Err(failure) => {
                let context = RetryContext::new()
                    .with_retry_fn(self.retry_fn())
                    .with_retry_key(self.retry_key.clone());
                self.handler.handle(&failure, context);
            }
        }

        if self.alive.load(Ordering::SeqCst) {
            self.state.set_loading(false);
        }
    }

    /// Marks the loader as dead. Pending retries against it become no-ops.
    pub fn retire(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// The retry key this loader reports to the handler.
    pub fn retry_key(&self) -> &str {
        &self.retry_key
    }

    fn store(&self, payload: T, id: &str) {
        if !self.alive.load(Ordering::SeqCst) {
            return;
        }
        let value = self.apply_transform(payload);
        self.state.set_data(value);
        tracing::info!(entity = %self.entity_name, id = %id, "loaded");
    }

    fn apply_transform(&self, payload: T) -> T {
        let Some(transform) = &self.transform else {
            return payload;
        };
        match transform(&payload) {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(
                    entity = %self.entity_name,
                    error = %err,
                    "failed to transform data, storing raw payload"
                );
                payload
            }
        }
    }

    fn retry_fn(&self) -> RetryFn {
        let weak = self.this.clone();
        Arc::new(move || {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(loader) = weak.upgrade() {
                    loader.load().await;
                }
            })
        })
    }
}

/// Builder for [`ItemLoader`].
pub struct ItemLoaderBuilder<T> {
    state: Option<Arc<LoaderState<T>>>,
    service: Option<FetchByIdFn<T>>,
    get_id: Option<GetIdFn>,
    entity_name: Option<String>,
    handler: Option<ErrorHandler>,
    transform: Option<TransformFn<T>>,
    retry_key: Option<String>,
}

impl<T> Default for ItemLoaderBuilder<T> {
    fn default() -> Self {
        Self {
            state: None,
            service: None,
            get_id: None,
            entity_name: None,
            handler: None,
            transform: None,
            retry_key: None,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ItemLoaderBuilder<T> {
    /// Sets the shared loading/data state. Required.
    pub fn state(mut self, state: Arc<LoaderState<T>>) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the fetch-by-id operation. Required.
    pub fn service(mut self, service: FetchByIdFn<T>) -> Self {
        self.service = Some(service);
        self
    }

    /// Sets the id supplier, read at each call. Required.
    pub fn get_id(mut self, get_id: GetIdFn) -> Self {
        self.get_id = Some(get_id);
        self
    }

    /// Sets the entity name used in log lines. Required.
    pub fn entity_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Sets the error handler. Required.
    pub fn handler(mut self, handler: ErrorHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Sets the optional payload transformation.
    pub fn transform(mut self, transform: TransformFn<T>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Overrides the instance-unique default retry key.
    pub fn retry_key(mut self, key: impl Into<String>) -> Self {
        self.retry_key = Some(key.into());
        self
    }

    /// Validates the configuration and builds the loader.
    pub fn build(self) -> Result<Arc<ItemLoader<T>>, ConfigurationError> {
        const FACTORY: &str = "ItemLoader";
        let state = require(self.state, FACTORY, "state")?;
        let service = require(self.service, FACTORY, "service")?;
        let get_id = require(self.get_id, FACTORY, "get_id")?;
        let entity_name = require(self.entity_name, FACTORY, "entity_name")?;
        let handler = require(self.handler, FACTORY, "handler")?;
        let retry_key = self
            .retry_key
            .unwrap_or_else(|| instance_key(&entity_name));
        let transform = self.transform;

        Ok(Arc::new_cyclic(|this| ItemLoader {
            state,
            service,
            get_id,
            entity_name,
            handler,
            transform,
            retry_key,
            alive: AtomicBool::new(true),
            this: this.clone(),
        }))
    }
}

fn require<V>(
    value: Option<V>,
    factory: &'static str,
    option: &'static str,
) -> Result<V, ConfigurationError> {
    value.ok_or(ConfigurationError::MissingOption { factory, option })
}

fn instance_key(entity_name: &str) -> String {
    format!("{}-{}", entity_name, LOADER_SEQ.fetch_add(1, Ordering::Relaxed))
}
