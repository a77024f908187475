#![forbid(unsafe_code)]

pub mod adapter;
pub mod repository;
pub mod sqlite;

pub use adapter::{ProgressAdapter, SlotKey};
pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
