//! Typed byte-array identifiers
//!
//! Zero-cost wrappers that keep 20-byte Well addresses apart from token
//! addresses and other byte arrays at compile time.
//!
//! ```rust
//! use well_types::{TokenAddress, WellAddress};
//!
//! let well = WellAddress::from_hex("0x00000000000000000000000000000000000000aa").unwrap();
//! let token = TokenAddress::new([1u8; 20]);
//!
//! fn pump_key(well: WellAddress) -> [u8; 20] { well.into_inner() }
//! assert_eq!(pump_key(well)[19], 0xaa);
//! // pump_key(token); // ❌ Compile error!
//! # let _ = token;
//! ```

use thiserror::Error;

/// Errors raised while parsing identifiers from text
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdentifierError {
    /// Input is not valid hex
    #[error("Invalid hex identifier '{input}': {reason}")]
    InvalidHex { input: String, reason: String },

    /// Decoded byte length differs from the identifier width
    #[error("Identifier length mismatch: expected {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },
}

/// Macro for generating zero-cost typed byte array wrappers
///
/// Creates a new type that wraps fixed-size byte arrays with complete type safety
/// while maintaining identical runtime performance and memory layout.
#[macro_export]
macro_rules! define_typed_wrapper {
    (
        $(#[$meta:meta])*
        $name:ident, $len:expr
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Default
        )]
        #[repr(transparent)] // Same memory layout as inner type for zero cost
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width of the identifier in bytes
            pub const LEN: usize = $len;

            /// Create a new typed wrapper
            #[inline(always)]
            pub const fn new(inner: [u8; $len]) -> Self {
                Self(inner)
            }

            /// Extract the inner value
            #[inline(always)]
            pub const fn inner(&self) -> &[u8; $len] {
                &self.0
            }

            /// Extract the inner value by value
            #[inline(always)]
            pub const fn into_inner(self) -> [u8; $len] {
                self.0
            }

            /// Get a reference to the inner bytes
            #[inline(always)]
            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            /// Parse from a hex string, with or without `0x` prefix
            pub fn from_hex(input: &str) -> Result<Self, $crate::IdentifierError> {
                let digits = input.strip_prefix("0x").unwrap_or(input);
                let bytes = hex::decode(digits).map_err(|e| $crate::IdentifierError::InvalidHex {
                    input: input.to_string(),
                    reason: e.to_string(),
                })?;
                let array: [u8; $len] = bytes.as_slice().try_into().map_err(|_| {
                    $crate::IdentifierError::WrongLength {
                        expected: $len,
                        got: bytes.len(),
                    }
                })?;
                Ok(Self(array))
            }
        }

        // Display for debugging and logging
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(self.0))
            }
        }

        // Conversions for interoperability
        impl From<[u8; $len]> for $name {
            #[inline(always)]
            fn from(inner: [u8; $len]) -> Self {
                Self(inner)
            }
        }

        impl From<$name> for [u8; $len] {
            #[inline(always)]
            fn from(wrapper: $name) -> [u8; $len] {
                wrapper.0
            }
        }

        impl AsRef<[u8]> for $name {
            #[inline(always)]
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        // Serialization support - serializes the inner type directly
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                self.0.serialize(serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                <[u8; $len]>::deserialize(deserializer).map(Self)
            }
        }
    };
}

define_typed_wrapper!(
    /// Well (liquidity pool) address (20 bytes)
    ///
    /// Pumps partition their persisted state by this identity.
    WellAddress, 20
);

define_typed_wrapper!(
    /// Token contract address (20 bytes)
    TokenAddress, 20
);
