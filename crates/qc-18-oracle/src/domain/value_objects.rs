//! # Value Objects
//!
//! Identifiers for the oracle domain. Each is a `u64` newtype so a request id
//! can never be passed where a data source id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use shared_types::Address;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Big-endian encoding, used in storage keys so byte order matches numeric order.
            #[must_use]
            pub const fn to_be_bytes(self) -> [u8; 8] {
                self.0.to_be_bytes()
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Sequential identifier assigned to a request on successful admission.
    RequestId
);
id_type!(
    /// Identifier of a registered oracle script.
    OracleScriptId
);
id_type!(
    /// Identifier of a registered data source.
    DataSourceId
);
id_type!(
    /// Request-local identifier of one raw data request, chosen by the oracle script.
    ExternalId
);

/// Short hex rendering of an address for log fields.
#[must_use]
pub fn short_address(address: &Address) -> String {
    format!("0x{}..{}", hex::encode(&address[..4]), hex::encode(&address[18..]))
}
