//! Multi-tenant business-process management core.
//!
//! Organizations own processes and process roles; personas act within their
//! organization and every scoped operation is guarded against cross-tenant
//! access. Process mutations append to an immutable audit trail, deletion is
//! soft by default (status `INACTIVE`) and hard deletion is reserved for
//! ADMIN actors.
//!
//! Layering follows ports and adapters:
//! - [`domain`] holds entities, payloads and the pure guard rules
//! - [`port`] defines the storage traits the core depends on
//! - [`adapter`] provides the in-memory and RocksDB implementations
//! - [`service`] hosts the engines orchestrating the rules over the ports
//! - [`cli`] is the terminal boundary wiring everything together

pub mod adapter;
pub mod cli;
pub mod config;
pub mod container;
pub mod domain;
pub mod port;
pub mod seed;
pub mod service;

pub use config::Config;
pub use container::Container;
pub use domain::DomainError;
