//! Reels storage abstraction
//!
//! Object storage behind a narrow trait: per-chunk writes during upload, a
//! compose step that makes the complete file addressable under one key, and
//! the usual download/delete/exists surface. Backends: local filesystem and
//! in-memory (tests).

pub mod keys;
pub mod local;
pub mod memory;
pub mod traits;

pub use local::LocalStorage;
pub use memory::MemoryStorage;
pub use traits::{Storage, StorageError, StorageResult};

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}
