//! Ports (Hexagonal Architecture)
//!
//! - inbound: transaction entry points and block hooks
//! - outbound: storage, validator set, script execution

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
