//! HTTP implementation of the cart backend.

use serde::Deserialize;
use serde_json::json;

use storefront_cart::{Cart, CartLine};
use storefront_core::{CartId, LineId, ProductId};

use crate::{CartBackend, Credentials, GatewayError};

/// Cart client over the storefront API.
///
/// Endpoints are fixed paths under `api_url`; responses wrap the cart in a
/// `{"cart": ...}` envelope and errors carry a JSON `{"error": "..."}` body.
#[derive(Debug, Clone)]
pub struct HttpCartGateway {
    api_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CartEnvelope {
    cart: Cart,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpCartGateway {
    pub fn new(api_url: String) -> Self {
        Self {
            api_url,
            token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Gateway with bearer-token authentication.
    pub fn with_token(api_url: String, token: String) -> Self {
        Self {
            api_url,
            token: Some(token),
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.api_url, path);
        let mut req = self.client.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send_for_cart(&self, req: reqwest::RequestBuilder) -> Result<Cart, GatewayError> {
        let resp = req
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::read_cart(resp).await
    }

    async fn read_cart(resp: reqwest::Response) -> Result<Cart, GatewayError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::api_error(status, resp).await);
        }
        let envelope: CartEnvelope = resp
            .json()
            .await
            .map_err(|e| GatewayError::Parse(format!("failed to parse cart response: {e}")))?;
        Ok(envelope.cart)
    }

    async fn api_error(status: reqwest::StatusCode, resp: reqwest::Response) -> GatewayError {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        GatewayError::Api(status.as_u16(), message)
    }
}

impl CartBackend for HttpCartGateway {
    async fn fetch(&self) -> Result<Cart, GatewayError> {
        tracing::debug!("fetching server cart");
        self.send_for_cart(self.request(reqwest::Method::GET, "/cart"))
            .await
    }

    async fn add(
        &self,
        product_id: &ProductId,
        quantity: u32,
        size: Option<&str>,
        color: Option<&str>,
    ) -> Result<Cart, GatewayError> {
        let body = json!({
            "productId": product_id,
            "quantity": quantity,
            "size": size.unwrap_or(""),
            "color": color.unwrap_or(""),
        });
        self.send_for_cart(self.request(reqwest::Method::POST, "/cart/add").json(&body))
            .await
    }

    async fn increment(
        &self,
        product_id: &ProductId,
        quantity: u32,
        position: usize,
    ) -> Result<Cart, GatewayError> {
        let body = json!({
            "productId": product_id,
            "quantity": quantity,
            "position": position,
        });
        self.send_for_cart(
            self.request(reqwest::Method::POST, "/cart/increment")
                .json(&body),
        )
        .await
    }

    async fn decrement(
        &self,
        product_id: &ProductId,
        quantity: u32,
        position: usize,
    ) -> Result<Cart, GatewayError> {
        let body = json!({
            "productId": product_id,
            "quantity": quantity,
            "position": position,
        });
        self.send_for_cart(
            self.request(reqwest::Method::POST, "/cart/decrement")
                .json(&body),
        )
        .await
    }

    async fn remove_at(
        &self,
        position: usize,
        line_id: Option<&LineId>,
    ) -> Result<Cart, GatewayError> {
        let body = json!({
            "position": position,
            "lineId": line_id,
        });
        self.send_for_cart(self.request(reqwest::Method::POST, "/cart/remove").json(&body))
            .await
    }

    async fn clear(&self, cart_id: &CartId) -> Result<(), GatewayError> {
        let path = format!("/cart/{cart_id}");
        let resp = self
            .request(reqwest::Method::DELETE, &path)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::api_error(status, resp).await);
        }
        Ok(())
    }

    async fn login_and_merge(
        &self,
        credentials: &Credentials,
        guest_lines: &[CartLine],
    ) -> Result<Cart, GatewayError> {
        tracing::debug!(guest_lines = guest_lines.len(), "login with guest cart merge");
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
            "guestCart": guest_lines,
        });
        self.send_for_cart(self.request(reqwest::Method::POST, "/auth/login").json(&body))
            .await
    }
}
