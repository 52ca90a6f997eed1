//! Strongly-typed identifiers used across the cart domain.
//!
//! Identifiers here are **opaque strings**: product ids come from the catalog
//! and cart/line ids from the storefront backend, and neither guarantees any
//! particular format. The newtypes exist so the compiler keeps them apart.

use serde::{Deserialize, Serialize};

/// Identifier of a product (owned by the catalog).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

/// Identifier of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(String);

/// Server-assigned identifier of a single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(String);

macro_rules! impl_opaque_id {
    ($t:ty) => {
        impl $t {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

impl_opaque_id!(ProductId);
impl_opaque_id!(CartId);
impl_opaque_id!(LineId);

impl CartId {
    /// Placeholder identity for a guest cart.
    ///
    /// Guest carts have no backend identity; the backend assigns a real id at
    /// merge-on-login.
    pub fn placeholder() -> Self {
        Self("1".to_owned())
    }
}
