//! # Adapters
//!
//! Reference implementations of the driven ports.

pub mod memory_store;
pub mod validators;

pub use memory_store::InMemoryKVStore;
pub use validators::StaticValidatorSet;
