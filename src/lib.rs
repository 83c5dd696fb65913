//! Check-and-deduct request charging over a shared key-value store.
//!
//! [`Gateway`] authorizes a request when the key's balance covers its charge
//! amount and deducts it with a single atomic conditional decrement, so
//! concurrent callers on the same key can never overdraw it.

pub mod config;
pub mod domain;
pub mod gateway;
pub mod memory_store;
pub mod redis_store;

pub use config::{Backend, GatewayOptions, StoreConfig};
pub use domain::{BalanceStore, ChargeOutcome, Debit, Error, StoreFault};
pub use gateway::Gateway;
pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
