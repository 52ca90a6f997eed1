use serde::{Deserialize, Serialize};

use storefront_core::ProductId;

/// Catalog snapshot of a product as offered for sale.
///
/// This is the only thing the cart needs from the catalog: the current price,
/// the discount, and which variant dimensions the product exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOffer {
    pub id: ProductId,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Percent discount, `0..=100`.
    pub percent_off: u8,
    /// Size choices the product exposes; empty means sizes do not apply.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Color choices the product exposes; empty means colors do not apply.
    #[serde(default)]
    pub colors: Vec<String>,
}

/// The caller's variant choice for an add-to-cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSelection {
    pub size: Option<String>,
    pub color: Option<String>,
}

impl VariantSelection {
    /// No variant selected (for unconstrained products).
    pub fn none() -> Self {
        Self::default()
    }
}
