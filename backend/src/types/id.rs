//! Typed ID wrappers for compile-time type safety.
//!
//! Device and order identifiers are both plain non-negative integers on the
//! wire; wrapping them prevents a device id from being used as an order key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Macro to generate typed integer ID wrappers with common trait implementations.
macro_rules! typed_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Creates an ID from its raw integer value.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw integer value.
            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_u64(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                u64::deserialize(deserializer).map(Self)
            }
        }
    };
}

typed_id!(DeviceId, "Physical device identity used for session binding and redirects.");
typed_id!(OrderId, "Logical challenge instance a device is bound to.");

/// Exclusive upper bound for order ids accepted at the HTTP boundary.
pub const MAX_ORDER_ID: u64 = 1_000_000;

impl OrderId {
    /// Whether the id is inside the range accepted from external callers.
    pub const fn is_in_public_range(&self) -> bool {
        self.0 < MAX_ORDER_ID
    }
}
