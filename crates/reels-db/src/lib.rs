//! Reels persistence layer
//!
//! Port traits in [`ports`], a PostgreSQL backend in [`pg`], and an in-memory
//! backend in [`memory`] used by tests and embedded setups.

pub mod memory;
pub mod pg;
pub mod ports;
pub mod setup;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use ports::{
    ContentStore, CustomerStore, EventStore, JobStore, LibraryStore, MachineStore,
};
pub use setup::setup_database;
