#![forbid(unsafe_code)]

pub mod kv;
pub mod records;
pub mod repository;
pub mod sqlite;

pub use kv::JsonStore;
pub use repository::{
    InMemoryRepository, KeyValueStore, SessionSummaryRepository, SessionSummaryRow, Storage,
    StorageError,
};
