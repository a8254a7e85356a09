//! Domain layer for the Oracle subsystem
//!
//! - seed: rolling sampling entropy
//! - sampler: weighted validator sampling
//! - guards: calldata, data source and execute gas ceilings
//! - gas: caller gas metering

pub mod context;
pub mod entities;
pub mod errors;
pub mod gas;
pub mod guards;
pub mod invariants;
pub mod sampler;
pub mod seed;
pub mod value_objects;

pub use context::*;
pub use entities::*;
pub use errors::*;
pub use gas::GasMeter;
pub use seed::{RollingSeed, ROLLING_SEED_SIZE};
pub use value_objects::*;
