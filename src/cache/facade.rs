//! Cache Facade Module
//!
//! Resolves a backend name to a constructed backend and hands back a
//! [`CacheHandle`] exposing the uniform cache operations.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::cache::backend::CacheBackend;
use crate::cache::file::FileBackend;
use crate::cache::memory::MemoryBackend;
use crate::cache::options::CacheOptions;
use crate::cache::registry::KeyRegistry;
use crate::cache::remote::RemoteBackend;
use crate::cache::store::{KeyValueStore, SharedMemoryStore};
use crate::error::{CacheError, Result};

/// Backend used when a request names none.
pub const DEFAULT_BACKEND: &str = "file";

/// Builds a backend from its options and the factory's shared state.
pub type BackendConstructor = fn(&CacheOptions, &BackendContext) -> Result<Box<dyn CacheBackend>>;

// == Backend Context ==
/// Shared state handed to every backend constructor.
///
/// Memory backends built from one context share its store and its used-key
/// registry; remote backends share the remote connection and their own
/// registry.
#[derive(Debug, Clone)]
pub struct BackendContext {
    memory_store: Arc<dyn KeyValueStore>,
    memory_keys: Arc<KeyRegistry>,
    remote_store: Option<Arc<dyn KeyValueStore>>,
    remote_keys: Arc<KeyRegistry>,
}

impl Default for BackendContext {
    /// Uses the process-wide shared memory store.
    fn default() -> Self {
        Self::with_memory_store(SharedMemoryStore::global())
    }
}

impl BackendContext {
    /// A context over a private memory store, isolated from the rest of
    /// the process.
    pub fn isolated() -> Self {
        Self::with_memory_store(Arc::new(SharedMemoryStore::new()))
    }

    pub fn with_memory_store(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            memory_store: store,
            memory_keys: Arc::new(KeyRegistry::new()),
            remote_store: None,
            remote_keys: Arc::new(KeyRegistry::new()),
        }
    }

    /// Attaches the connection remote backends delegate to.
    pub fn with_remote_store(mut self, connection: Arc<dyn KeyValueStore>) -> Self {
        self.remote_store = Some(connection);
        self
    }

    pub fn memory_store(&self) -> &Arc<dyn KeyValueStore> {
        &self.memory_store
    }

    pub fn memory_keys(&self) -> &Arc<KeyRegistry> {
        &self.memory_keys
    }

    pub fn remote_store(&self) -> Option<&Arc<dyn KeyValueStore>> {
        self.remote_store.as_ref()
    }

    pub fn remote_keys(&self) -> &Arc<KeyRegistry> {
        &self.remote_keys
    }
}

fn open_file(options: &CacheOptions, _context: &BackendContext) -> Result<Box<dyn CacheBackend>> {
    Ok(Box::new(FileBackend::new(options)?))
}

fn open_memory(options: &CacheOptions, context: &BackendContext) -> Result<Box<dyn CacheBackend>> {
    Ok(Box::new(MemoryBackend::new(
        options,
        context.memory_store.clone(),
        context.memory_keys.clone(),
    )?))
}

fn open_remote(options: &CacheOptions, context: &BackendContext) -> Result<Box<dyn CacheBackend>> {
    Ok(Box::new(RemoteBackend::new(
        options,
        context.remote_store.clone(),
        context.remote_keys.clone(),
    )?))
}

// == Open Request ==
/// What to open: an optional backend name plus options.
///
/// Converts from a name (`"memory"`), from options alone (default
/// backend), or from a `(name, options)` pair.
#[derive(Debug, Clone, Default)]
pub struct OpenRequest {
    backend: Option<String>,
    options: CacheOptions,
}

impl OpenRequest {
    pub fn new(backend: Option<&str>, options: CacheOptions) -> Self {
        Self {
            backend: backend.map(str::to_string),
            options,
        }
    }
}

impl From<&str> for OpenRequest {
    fn from(backend: &str) -> Self {
        Self::new(Some(backend), CacheOptions::new())
    }
}

impl From<String> for OpenRequest {
    fn from(backend: String) -> Self {
        Self {
            backend: Some(backend),
            options: CacheOptions::new(),
        }
    }
}

impl From<CacheOptions> for OpenRequest {
    fn from(options: CacheOptions) -> Self {
        Self::new(None, options)
    }
}

impl From<(&str, CacheOptions)> for OpenRequest {
    fn from((backend, options): (&str, CacheOptions)) -> Self {
        Self::new(Some(backend), options)
    }
}

impl From<(String, CacheOptions)> for OpenRequest {
    fn from((backend, options): (String, CacheOptions)) -> Self {
        Self {
            backend: Some(backend),
            options,
        }
    }
}

// == Cache Factory ==
/// Registry of backend constructors plus the default backend name.
pub struct CacheFactory {
    backends: RwLock<HashMap<String, BackendConstructor>>,
    default_backend: RwLock<String>,
    context: BackendContext,
}

impl fmt::Debug for CacheFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheFactory")
            .field("backends", &self.backends())
            .field("default_backend", &self.default_backend())
            .field("context", &self.context)
            .finish()
    }
}

impl Default for CacheFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheFactory {
    // == Constructors ==
    /// A factory over the process-wide shared memory store.
    pub fn new() -> Self {
        Self::with_context(BackendContext::default())
    }

    /// A factory with the built-in `file`, `memory` and `remote` backends.
    pub fn with_context(context: BackendContext) -> Self {
        let factory = Self {
            backends: RwLock::new(HashMap::new()),
            default_backend: RwLock::new(DEFAULT_BACKEND.to_string()),
            context,
        };
        factory.register("file", open_file);
        factory.register("memory", open_memory);
        factory.register("remote", open_remote);
        factory
    }

    /// The process-wide factory.
    pub fn global() -> &'static CacheFactory {
        static GLOBAL: OnceLock<CacheFactory> = OnceLock::new();
        GLOBAL.get_or_init(CacheFactory::new)
    }

    // == Registry ==
    /// Registers (or replaces) a backend under `name`.
    pub fn register(&self, name: impl Into<String>, constructor: BackendConstructor) {
        self.backends.write().insert(name.into(), constructor);
    }

    /// Registered backend names, sorted.
    pub fn backends(&self) -> Vec<String> {
        let mut names: Vec<String> = self.backends.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn set_default_backend(&self, name: impl Into<String>) {
        *self.default_backend.write() = name.into();
    }

    pub fn default_backend(&self) -> String {
        self.default_backend.read().clone()
    }

    pub fn context(&self) -> &BackendContext {
        &self.context
    }

    // == Open ==
    /// Constructs a fresh backend for the request.
    ///
    /// An absent or empty backend name resolves to the default backend.
    /// Backend construction errors are returned unchanged.
    pub fn open(&self, request: impl Into<OpenRequest>) -> Result<CacheHandle> {
        let OpenRequest { backend, options } = request.into();
        let name = backend
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.default_backend());

        let constructor = self
            .backends
            .read()
            .get(&name)
            .copied()
            .ok_or_else(|| CacheError::UnknownBackend(name.clone()))?;
        let backend = constructor(&options, &self.context)?;

        debug!(backend = %name, "opened cache");
        Ok(CacheHandle {
            backend_name: name,
            backend,
        })
    }
}

/// Opens a cache through the process-wide factory.
pub fn open(request: impl Into<OpenRequest>) -> Result<CacheHandle> {
    CacheFactory::global().open(request)
}

// == Cache Handle ==
/// A constructed cache. Errors from the backend pass through unchanged.
#[derive(Debug)]
pub struct CacheHandle {
    backend_name: String,
    backend: Box<dyn CacheBackend>,
}

impl CacheHandle {
    /// Name the request resolved to.
    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Stores any serializable value under `key`.
    pub fn write<V: Serialize>(&self, key: &str, value: V) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|err| CacheError::Write {
            key: key.to_string(),
            reason: err.to_string(),
        })?;
        self.backend.write(key, value)
    }

    pub fn read(&self, key: &str) -> Result<Value> {
        self.backend.read(key)
    }

    /// Reads `key` and deserializes it into `T`.
    pub fn read_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.backend.read(key)?;
        serde_json::from_value(value).map_err(|err| CacheError::CorruptRecord {
            key: key.to_string(),
            reason: err.to_string(),
        })
    }

    pub fn destroy(&self, key: &str) -> Result<()> {
        self.backend.destroy(key)
    }

    pub fn destroy_all(&self) -> Result<()> {
        self.backend.destroy_all()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct NullBackend;

    impl CacheBackend for NullBackend {
        fn write(&self, _key: &str, _value: Value) -> Result<()> {
            Ok(())
        }

        fn read(&self, key: &str) -> Result<Value> {
            Err(CacheError::ExpiredOrMissing(key.to_string()))
        }

        fn validate(&self, _key: &str) -> bool {
            false
        }

        fn destroy(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        fn destroy_all(&self) -> Result<()> {
            Ok(())
        }
    }

    fn open_null(_options: &CacheOptions, _context: &BackendContext) -> Result<Box<dyn CacheBackend>> {
        Ok(Box::new(NullBackend))
    }

    #[test]
    fn test_builtin_backends() {
        let factory = CacheFactory::with_context(BackendContext::isolated());

        assert_eq!(factory.backends(), ["file", "memory", "remote"]);
        assert_eq!(factory.default_backend(), "file");
    }

    #[test]
    fn test_register_is_one_line() {
        let factory = CacheFactory::with_context(BackendContext::isolated());
        factory.register("null", open_null);

        let cache = factory.open("null").unwrap();

        assert_eq!(cache.backend_name(), "null");
        cache.write("k", 1).unwrap();
        assert!(matches!(cache.read("k"), Err(CacheError::ExpiredOrMissing(_))));
    }

    #[test]
    fn test_unknown_backend() {
        let factory = CacheFactory::with_context(BackendContext::isolated());

        let err = factory.open("bogus").unwrap_err();

        assert!(matches!(err, CacheError::UnknownBackend(name) if name == "bogus"));
    }

    #[test]
    fn test_empty_name_uses_default() {
        let factory = CacheFactory::with_context(BackendContext::isolated());
        factory.set_default_backend("memory");

        let cache = factory
            .open(OpenRequest::new(Some(""), CacheOptions::new()))
            .unwrap();

        assert_eq!(cache.backend_name(), "memory");
    }

    #[test]
    fn test_unknown_default_backend() {
        let factory = CacheFactory::with_context(BackendContext::isolated());
        factory.set_default_backend("gone");

        assert!(matches!(
            factory.open(CacheOptions::new()),
            Err(CacheError::UnknownBackend(name)) if name == "gone"
        ));
    }

    #[test]
    fn test_construction_errors_pass_through() {
        let factory = CacheFactory::with_context(BackendContext::isolated());

        assert!(matches!(
            factory.open("file"),
            Err(CacheError::MissingOption("directory"))
        ));
        assert!(matches!(
            factory.open("remote"),
            Err(CacheError::BackendUnavailable(_))
        ));
    }

    #[test]
    fn test_memory_handles_share_context_state() {
        let factory = CacheFactory::with_context(BackendContext::isolated());

        let first = factory.open("memory").unwrap();
        let second = factory.open("memory").unwrap();

        first.write("name", "Ada").unwrap();
        assert_eq!(second.read("name").unwrap(), json!("Ada"));

        second.destroy_all().unwrap();
        assert!(first.read("name").is_err());
        assert!(factory.context().memory_keys().is_empty());
    }

    #[test]
    fn test_remote_through_context() {
        let connection: Arc<dyn KeyValueStore> = Arc::new(SharedMemoryStore::new());
        let factory =
            CacheFactory::with_context(BackendContext::isolated().with_remote_store(connection));

        let cache = factory.open("remote").unwrap();
        cache.write("name", "Ada").unwrap();

        assert_eq!(cache.read("name").unwrap(), json!("Ada"));
        assert!(factory.context().remote_keys().contains("koi_name"));
        assert!(factory.context().memory_keys().is_empty());
    }

    #[test]
    fn test_typed_read() {
        let factory = CacheFactory::with_context(BackendContext::isolated());
        let cache = factory.open("memory").unwrap();

        cache.write("list", vec![1u32, 2, 3]).unwrap();

        let list: Vec<u32> = cache.read_as("list").unwrap();
        assert_eq!(list, [1, 2, 3]);
        assert!(matches!(
            cache.read_as::<String>("list"),
            Err(CacheError::CorruptRecord { .. })
        ));
    }
}
