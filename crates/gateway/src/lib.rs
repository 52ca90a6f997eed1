//! Remote cart contract and its HTTP implementation.
//!
//! Every mutating call returns the server's **full, authoritative cart
//! snapshot**, never a partial delta. Callers must not assume their
//! in-memory cart changed when a call fails; the pre-call snapshot remains the
//! displayed state.

pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_cart::{Cart, CartLine};
use storefront_core::{CartId, LineId, ProductId};

pub use http::HttpCartGateway;

/// Credentials for the login/merge exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Transport/application failure of a backend call.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Backend cart endpoints, one round trip per operation.
#[allow(async_fn_in_trait)]
pub trait CartBackend {
    /// Fetch the current server cart.
    async fn fetch(&self) -> Result<Cart, GatewayError>;

    /// Add a product (with an optional variant selection) to the cart.
    async fn add(
        &self,
        product_id: &ProductId,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Cart, GatewayError>;

    /// Raise the quantity of the line at `position` by `quantity`.
    async fn increment(
        &self,
        product_id: &ProductId,
        quantity: u32,
        position: usize,
    ) -> Result<Cart, GatewayError>;

    /// Lower the quantity of the line at `position` by `quantity`.
    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        position: usize,
    ) -> Result<Cart, GatewayError>;

    /// Remove the line at `position`.
    async fn remove_at(
        &self,
        position: usize,
        line_id: Option<&LineId>,
    ) -> Result<Cart, GatewayError>;

    /// Empty the cart.
    async fn clear(&self, cart_id: &CartId) -> Result<(), GatewayError>;

    /// Authenticate and merge the guest lines into the server cart in a
    /// single call, so the merge is atomic with authentication from the
    /// client's point of view. The response is the merged server cart.
    async fn login_and_merge(
        &self,
        credentials: &Credentials,
        guest_lines: &[CartLine],
    ) -> Result<Cart, GatewayError>;
}
