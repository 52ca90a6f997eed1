//! Durable guest-cart persistence plus the pure line-sequence operations.
//!
//! The guest cart is a single JSON document (an array of camelCase `CartLine`
//! records) at a fixed path under the OS data directory. Storage failures are
//! swallowed by design: an unreadable or corrupt document loads as an empty
//! cart, and a failed save is a logged no-op from the caller's perspective.
//! The guest cart is best-effort convenience state, never the only copy of
//! anything the user paid for.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use storefront_cart::CartLine;
use storefront_core::ProductId;

/// File-backed store for the unauthenticated cart snapshot.
#[derive(Debug, Clone)]
pub struct LocalCartStore {
    /// `None` when no storage location could be resolved; every operation is
    /// then a no-op and `load` returns an empty cart.
    path: Option<PathBuf>,
}

impl LocalCartStore {
    /// Store at the default OS data-directory location
    /// (`{data_dir}/storefront/guest_cart.json`).
    pub fn new() -> Self {
        let path = match default_store_path() {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!("guest cart storage unavailable: {err:?}");
                None
            }
        };
        Self { path }
    }

    /// Store at an explicit path (tests, embedders with their own layout).
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Load the persisted guest lines.
    ///
    /// Returns an empty sequence when nothing is stored or the stored document
    /// fails to parse; parse failure is logged and never surfaced.
    pub fn load(&self) -> Vec<CartLine> {
        match self.try_load() {
            Ok(lines) => lines,
            Err(err) => {
                tracing::warn!("failed to load guest cart, treating as empty: {err:?}");
                Vec::new()
            }
        }
    }

    /// Persist the full line sequence, replacing any previous document.
    ///
    /// Failure (unavailable path, IO error) is logged and otherwise silent.
    pub fn save(&self, lines: &[CartLine]) {
        if let Err(err) = self.try_save(lines) {
            tracing::warn!("failed to save guest cart: {err:?}");
        }
    }

    /// Remove the persisted document. Silent on failure.
    pub fn clear(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if path.exists() {
            if let Err(err) = fs::remove_file(path) {
                tracing::warn!("failed to clear guest cart at {path:?}: {err}");
            }
        }
    }

    fn try_load(&self) -> anyhow::Result<Vec<CartLine>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read guest cart at {path:?}"))?;
        serde_json::from_str(&raw).context("failed to parse stored guest cart")
    }

    fn try_save(&self, lines: &[CartLine]) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            anyhow::bail!("no storage path available");
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create store directory at {parent:?}"))?;
        }
        let payload = serde_json::to_string(lines).context("failed to serialize guest cart")?;
        fs::write(path, payload).with_context(|| format!("failed to write guest cart at {path:?}"))
    }
}

impl Default for LocalCartStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the path to the guest cart document:
/// `{app_data_dir}/storefront/guest_cart.json`.
fn default_store_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory")?;

    let mut path = base;
    path.push("storefront");
    path.push("guest_cart.json");
    Ok(path)
}

/// Merge `new_line` into `lines` by line identity: a line with the same
/// product and variant selection absorbs the new quantity (saturating),
/// otherwise the line is appended. Insertion order is preserved.
pub fn add_or_merge(mut lines: Vec<CartLine>, new_line: CartLine) -> Vec<CartLine> {
    match lines.iter_mut().find(|line| line.same_identity(&new_line)) {
        Some(existing) => {
            existing.quantity = existing.quantity.saturating_add(new_line.quantity);
        }
        None => lines.push(new_line),
    }
    lines
}

/// Adjust the first line matching `product_id` (variant-insensitive) by
/// `delta`, flooring the quantity at 1. Decrementing never removes a line;
/// removal is an explicit, separate operation.
pub fn adjust_quantity(mut lines: Vec<CartLine>, product_id: &ProductId, delta: i64) -> Vec<CartLine> {
    if let Some(line) = lines.iter_mut().find(|line| &line.product_id == product_id) {
        let adjusted = i64::from(line.quantity).saturating_add(delta).max(1);
        line.quantity = u32::try_from(adjusted).unwrap_or(u32::MAX);
    }
    lines
}

/// Remove the line at `index`; an out-of-range index is a no-op.
pub fn remove_at(mut lines: Vec<CartLine>, index: usize) -> Vec<CartLine> {
    if index < lines.len() {
        lines.remove(index);
    }
    lines
}
