//! Fixed-length digit identifiers.
//!
//! Lookups only fire for complete values, so these newtypes only exist for
//! inputs whose unmasked form has exactly the expected number of digits.

use serde::{Deserialize, Serialize};

use crate::mask::{MaskKind, unmask};

/// Errors that can occur when parsing a fixed-length digit identifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} must have exactly {expected} digits (got {actual})")]
pub struct DigitsError {
    /// Human readable name of the identifier.
    pub kind: &'static str,
    /// Required digit count.
    pub expected: usize,
    /// Digit count found in the input.
    pub actual: usize,
}

/// Define a newtype over a string of exactly `len` digits.
///
/// Creates a wrapper with:
/// - `parse()` accepting masked or unmasked input
/// - `as_str()` returning the digits
/// - `masked()` returning the display form
/// - `Display` printing the digits
macro_rules! define_digits {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $mask:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Number of digits in a complete value.
            pub const LEN: usize = $mask.max_digits();

            /// Parse from masked or unmasked input.
            ///
            /// # Errors
            ///
            /// Returns [`DigitsError`] unless the input contains exactly
            /// [`Self::LEN`] digits.
            pub fn parse(s: &str) -> Result<Self, DigitsError> {
                let digits = unmask(s);
                if digits.len() == Self::LEN {
                    Ok(Self(digits))
                } else {
                    Err(DigitsError {
                        kind: $kind,
                        expected: Self::LEN,
                        actual: digits.len(),
                    })
                }
            }

            /// The digits, without separators.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The display form of the value.
            #[must_use]
            pub fn masked(&self) -> String {
                $mask.apply(&self.0)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = DigitsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_digits!(
    /// A complete CEP (8 digits).
    PostalCode,
    "CEP",
    MaskKind::PostalCode
);

define_digits!(
    /// A complete CPF (11 digits).
    DocumentNumber,
    "CPF",
    MaskKind::Document
);
