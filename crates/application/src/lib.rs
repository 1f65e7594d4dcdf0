//! Application services and ports.

#![forbid(unsafe_code)]

mod filter_store;
mod storage_ports;

pub use filter_store::{FilterStore, PersistenceFailure};
pub use storage_ports::{FilterStorageKeys, KeyValueStore};
