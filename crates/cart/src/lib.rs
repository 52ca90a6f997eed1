//! Cart domain model (pure, deterministic).
//!
//! This crate contains the data shapes shared by every cart backend (the
//! cart aggregate, its lines, and the catalog offer a line is built from)
//! plus the pricing derivations over them. No IO, no HTTP, no storage.

pub mod line;
pub mod offer;
pub mod pricing;

pub use line::{Cart, CartLine};
pub use offer::{ProductOffer, VariantSelection};
