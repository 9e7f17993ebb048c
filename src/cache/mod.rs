//! Cache Module
//!
//! Pluggable cache backends behind one contract, selected by name through
//! the [`CacheFactory`].
//!
//! # Backends
//! - `file` - one JSON envelope per key on disk, TTL checked on read
//! - `memory` - process-wide shared memory store with store-native TTL
//! - `remote` - any external [`KeyValueStore`] connection

mod backend;
mod entry;
mod facade;
mod file;
mod keyed;
mod memory;
mod options;
mod record;
mod registry;
mod remote;
mod store;


// Re-export public types
pub use backend::{CacheBackend, DEFAULT_PREFIX, DEFAULT_TTL};
pub use entry::StoreEntry;
pub use facade::{
    open, BackendConstructor, BackendContext, CacheFactory, CacheHandle, OpenRequest,
    DEFAULT_BACKEND,
};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use options::CacheOptions;
pub use record::StoredRecord;
pub use registry::KeyRegistry;
pub use remote::RemoteBackend;
pub use store::{KeyValueStore, SharedMemoryStore, StoreError, StoreOp};
