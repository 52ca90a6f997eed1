use serde::{Deserialize, Serialize};

use storefront_core::{CartId, DomainError, DomainResult, LineId, ProductId};

use crate::offer::{ProductOffer, VariantSelection};
use crate::pricing;

/// One product entry in a cart.
///
/// The price fields are a snapshot taken from the catalog at add time (guest
/// mode) or supplied by the backend (authenticated mode); they are not live
/// catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Percent discount, `0..=100`.
    pub percent_off: u8,
    /// Server-assigned line identifier; absent on guest lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<LineId>,
}

impl CartLine {
    /// Build a validated line.
    ///
    /// An empty-string variant value means "no variant selected" and is
    /// normalized to `None`.
    pub fn new(
        product_id: ProductId,
        quantity: u32,
        size: Option<String>,
        color: Option<String>,
        unit_price: u64,
        percent_off: u8,
    ) -> DomainResult<Self> {
        if quantity < 1 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        if percent_off > 100 {
            return Err(DomainError::validation("percent_off must be within 0..=100"));
        }

        Ok(Self {
            product_id,
            quantity,
            size: normalize_variant(size),
            color: normalize_variant(color),
            unit_price,
            percent_off,
            line_id: None,
        })
    }

    /// Build a guest line from a catalog offer, enforcing the variant policy:
    /// a product that exposes sizes (or colors) must come with an explicit
    /// selection, and the selection must be one of the offered values.
    pub fn from_offer(
        offer: &ProductOffer,
        quantity: u32,
        selection: &VariantSelection,
    ) -> DomainResult<Self> {
        let size = pick_variant("size", &offer.sizes, selection.size.as_deref())?;
        let color = pick_variant("color", &offer.colors, selection.color.as_deref())?;
        Self::new(
            offer.id.clone(),
            quantity,
            size,
            color,
            offer.unit_price,
            offer.percent_off,
        )
    }

    /// Line identity: same product and same variant selection.
    ///
    /// Two lines with the same identity are "the same line" for merge
    /// purposes; quantities add and the authoritative side keeps its price
    /// snapshot.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.product_id == other.product_id && self.size == other.size && self.color == other.color
    }

    pub fn line_total(&self) -> u64 {
        pricing::line_total(self)
    }
}

fn normalize_variant(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn pick_variant(
    dimension: &str,
    offered: &[String],
    selected: Option<&str>,
) -> DomainResult<Option<String>> {
    let selected = selected.filter(|v| !v.is_empty());
    if offered.is_empty() {
        // Unconstrained dimension: any stray selection is ignored.
        return Ok(None);
    }
    match selected {
        None => Err(DomainError::validation(format!(
            "{dimension} selection is required for this product"
        ))),
        Some(v) if offered.iter().any(|o| o == v) => Ok(Some(v.to_owned())),
        Some(v) => Err(DomainError::validation(format!(
            "{dimension} '{v}' is not offered for this product"
        ))),
    }
}

/// The cart aggregate: ordered lines plus a derived total.
///
/// `total_price` is a cache of the pricing derivation over `lines`, never a
/// second source of truth; local mutations recompute it and remote snapshots
/// replace it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    /// Insertion-ordered lines. Order is not semantically significant but must
    /// stay stable for display.
    #[serde(alias = "items")]
    pub lines: Vec<CartLine>,
    pub total_price: u64,
}

impl Cart {
    pub fn empty(id: CartId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            total_price: 0,
        }
    }

    /// A guest cart under the placeholder identity, with its total derived
    /// from the given lines.
    pub fn guest(lines: Vec<CartLine>) -> Self {
        Self::from_lines(CartId::placeholder(), lines)
    }

    pub fn from_lines(id: CartId, lines: Vec<CartLine>) -> Self {
        let mut cart = Self {
            id,
            lines,
            total_price: 0,
        };
        cart.recompute_total();
        cart
    }

    pub fn recompute_total(&mut self) {
        self.total_price = pricing::cart_total(&self.lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(id: &str, unit_price: u64, percent_off: u8) -> ProductOffer {
        ProductOffer {
            id: ProductId::from(id),
            unit_price,
            percent_off,
            sizes: Vec::new(),
            colors: Vec::new(),
        }
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = CartLine::new(ProductId::from("P1"), 0, None, None, 1000, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn percent_off_above_hundred_is_rejected() {
        let err = CartLine::new(ProductId::from("P1"), 1, None, None, 1000, 101).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_variant_strings_normalize_to_none() {
        let line = CartLine::new(
            ProductId::from("P1"),
            1,
            Some(String::new()),
            Some(String::new()),
            1000,
            0,
        )
        .unwrap();
        assert_eq!(line.size, None);
        assert_eq!(line.color, None);
    }

    #[test]
    fn identity_matches_on_product_and_variant() {
        let a = CartLine::new(
            ProductId::from("P1"),
            1,
            Some("M".into()),
            None,
            1000,
            0,
        )
        .unwrap();
        let b = CartLine::new(
            ProductId::from("P1"),
            3,
            Some("M".into()),
            None,
            900,
            10,
        )
        .unwrap();
        let c = CartLine::new(
            ProductId::from("P1"),
            1,
            Some("L".into()),
            None,
            1000,
            0,
        )
        .unwrap();

        // Quantity and price snapshot are not part of the identity.
        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
    }

    #[test]
    fn unconstrained_offer_adds_with_default_variants() {
        let line = CartLine::from_offer(&offer("P1", 1000, 10), 2, &VariantSelection::none())
            .unwrap();
        assert_eq!(line.size, None);
        assert_eq!(line.color, None);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, 1000);
        assert_eq!(line.percent_off, 10);
    }

    #[test]
    fn missing_size_selection_is_rejected() {
        let mut constrained = offer("P1", 1000, 0);
        constrained.sizes = vec!["S".into(), "M".into()];

        let err =
            CartLine::from_offer(&constrained, 1, &VariantSelection::none()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn unknown_size_selection_is_rejected() {
        let mut constrained = offer("P1", 1000, 0);
        constrained.sizes = vec!["S".into(), "M".into()];

        let selection = VariantSelection {
            size: Some("XXL".into()),
            color: None,
        };
        let err = CartLine::from_offer(&constrained, 1, &selection).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn offered_size_selection_is_accepted() {
        let mut constrained = offer("P1", 1000, 0);
        constrained.sizes = vec!["S".into(), "M".into()];

        let selection = VariantSelection {
            size: Some("M".into()),
            color: None,
        };
        let line = CartLine::from_offer(&constrained, 1, &selection).unwrap();
        assert_eq!(line.size.as_deref(), Some("M"));
    }

    #[test]
    fn cart_total_is_derived_from_lines() {
        let lines = vec![
            CartLine::from_offer(&offer("P1", 1000, 10), 2, &VariantSelection::none()).unwrap(),
            CartLine::from_offer(&offer("P2", 500, 0), 1, &VariantSelection::none()).unwrap(),
        ];
        let cart = Cart::guest(lines);
        assert_eq!(cart.total_price, 1800 + 500);
        assert_eq!(cart.id, CartId::placeholder());
    }

    #[test]
    fn cart_deserializes_server_shape_with_items_alias() {
        let raw = r#"{
            "id": "c-42",
            "items": [
                {"productId": "P1", "quantity": 2, "unitPrice": 1000, "percentOff": 10, "lineId": "l-1"}
            ],
            "totalPrice": 1800
        }"#;
        let cart: Cart = serde_json::from_str(raw).unwrap();
        assert_eq!(cart.id, CartId::from("c-42"));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].line_id, Some(LineId::from("l-1")));
        assert_eq!(cart.total_price, 1800);
    }
}
