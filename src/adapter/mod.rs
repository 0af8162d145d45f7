//! Storage adapters implementing the ports in [`crate::port`]

pub mod memory;
pub mod rocksdb;

pub use memory::InMemoryStore;
pub use rocksdb::{RocksDbStore, StoreBackend, StoreFactory, StoreHandle};
