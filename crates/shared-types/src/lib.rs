//! # Shared Types Crate
//!
//! Chain primitives shared between subsystems and the node that hosts them.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the block header and validator descriptor
//!   the consensus engine hands to every block hook are defined here.
//! - **Fixed-width identities**: hashes are `[u8; 32]`, addresses `[u8; 20]`.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
