//! Persistence seams used by the pieces
//!
//! Each store is a trait with a Postgres implementation for the running
//! service and an in-memory one for tests and local runs.

pub mod kv;
pub mod messages;
pub mod users;

pub use kv::{KeyValueStore, MemoryKeyValueStore, PgKeyValueStore};
pub use messages::{MemoryMessageStore, MessageStore, PgMessageStore};
pub use users::{MemoryUserStore, PgUserStore, UserStore};

#[cfg(test)]
pub use users::MockUserStore;
