//! Session persistence: Redis durable backend, in-process fallback
//! map, and the timeout-and-fallback policy that composes them.

pub mod backend;
pub mod config;
pub mod memory;
pub mod redis_backend;
pub mod store;

pub use backend::{OfflineBackend, SessionBackend};
pub use config::StoreConfig;
pub use memory::MemoryStore;
pub use redis_backend::RedisBackend;
pub use store::SessionStore;
