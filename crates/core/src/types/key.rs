//! Validated string keys for entity references.
//!
//! Users are keyed by username and products by model name. Use the
//! `define_key!` macro to create type-safe wrappers that prevent mixing a
//! username with a product model.

use thiserror::Error;

/// Errors that can occur when parsing a string key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The input is empty or only whitespace.
    #[error("{kind} cannot be empty")]
    Empty {
        /// Which key was being parsed.
        kind: &'static str,
    },
    /// The input is too long.
    #[error("{kind} must be at most {max} characters")]
    TooLong {
        /// Which key was being parsed.
        kind: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
}

/// Macro to define a validated string key.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` rejecting blank or overlong input
/// - `as_str()`, `Display`, `FromStr` and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use ezelectronics_core::define_key;
/// define_key!(Sku, "sku");
///
/// assert!(Sku::parse("ABC-1").is_ok());
/// assert!(Sku::parse("   ").is_err());
/// ```
#[macro_export]
macro_rules! define_key {
    ($name:ident, $kind:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Maximum length of the key.
            pub const MAX_LENGTH: usize = 255;

            /// Parse the key from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is blank or longer than
            /// [`Self::MAX_LENGTH`] characters.
            pub fn parse(s: &str) -> Result<Self, $crate::types::KeyError> {
                if s.trim().is_empty() {
                    return Err($crate::types::KeyError::Empty { kind: $kind });
                }

                if s.chars().count() > Self::MAX_LENGTH {
                    return Err($crate::types::KeyError::TooLong {
                        kind: $kind,
                        max: Self::MAX_LENGTH,
                    });
                }

                Ok(Self(s.to_owned()))
            }

            /// Returns the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key!(Username, "username");
define_key!(ProductModel, "model");
