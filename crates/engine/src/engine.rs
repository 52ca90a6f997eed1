//! Cart state machine: guest vs. authenticated delegation and merge-on-login.

use thiserror::Error;

use storefront_cart::{Cart, CartLine, ProductOffer, VariantSelection};
use storefront_core::{CartId, DomainError, ProductId};
use storefront_gateway::{CartBackend, Credentials, GatewayError};
use storefront_store::{LocalCartStore, add_or_merge, adjust_quantity, remove_at};

/// Which backend currently serves mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Guest,
    Authenticated,
}

/// Engine lifecycle state.
///
/// `Merging` is transient (held only while the login/merge round trip is in
/// flight). `Error` is non-terminal: the last known-good snapshot stays
/// displayed, and a later successful mutation or explicit `refresh` restores
/// the resumed mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Guest,
    Authenticated,
    Merging,
    Error { resume: Mode },
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before any store/gateway call; no state change.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A remote call failed; the engine is in the error state and the last
    /// known-good snapshot is still displayed.
    #[error("cart backend call failed: {0}")]
    Transport(#[source] GatewayError),

    /// The login/merge call failed; the engine stays in guest mode and the
    /// local guest cart is untouched.
    #[error("merge-on-login failed: {0}")]
    Merge(#[source] GatewayError),

    /// A mutation was issued before `init`.
    #[error("engine is not initialized")]
    Uninitialized,
}

/// Orchestrator for the cart.
///
/// Single-threaded and event-driven: the engine takes `&mut self` for every
/// mutation, so at most one remote mutation is in flight at a time. Responses
/// are still guarded by a request sequence number (last-snapshot-wins), so a
/// superseded completion can never overwrite a newer snapshot.
#[derive(Debug)]
pub struct CartEngine<G> {
    gateway: G,
    store: LocalCartStore,
    state: EngineState,
    cart: Cart,
    next_seq: u64,
    applied_seq: u64,
}

impl<G: CartBackend> CartEngine<G> {
    pub fn new(gateway: G, store: LocalCartStore) -> Self {
        Self {
            gateway,
            store,
            state: EngineState::Uninitialized,
            cart: Cart::empty(CartId::placeholder()),
            next_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The displayed snapshot. Always the last known-good cart, even while in
    /// the error state.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// First-render initialization from the injected authentication signal.
    ///
    /// Idempotent: calling again after initialization leaves the current
    /// snapshot in place.
    pub async fn init(&mut self, authenticated: bool) -> Result<&Cart, EngineError> {
        if self.state != EngineState::Uninitialized {
            return Ok(&self.cart);
        }

        if authenticated {
            self.state = EngineState::Authenticated;
            let seq = self.begin_remote();
            let result = self.gateway.fetch().await;
            self.adopt_remote(seq, result)
        } else {
            self.state = EngineState::Guest;
            self.cart = Cart::guest(self.store.load());
            Ok(&self.cart)
        }
    }

    /// Add a product to the cart.
    ///
    /// The offer's variant policy is enforced first: a product exposing
    /// size/color choices is rejected without an explicit matching selection,
    /// with no state change.
    pub async fn add(
        &mut self,
        offer: &ProductOffer,
        quantity: u32,
        selection: &VariantSelection,
    ) -> Result<&Cart, EngineError> {
        let line = CartLine::from_offer(offer, quantity, selection)?;

        match self.mode()? {
            Mode::Guest => Ok(self.apply_guest(|lines| add_or_merge(lines, line))),
            Mode::Authenticated => {
                let seq = self.begin_remote();
                let result = self
                    .gateway
                    .add(
                        &line.product_id,
                        line.quantity,
                        line.size.as_deref(),
                        line.color.as_deref(),
                    )
                    .await;
                self.adopt_remote(seq, result)
            }
        }
    }

    /// Raise the quantity of the line at `position` by one.
    pub async fn increment(
        &mut self,
        product_id: &ProductId,
        position: usize,
    ) -> Result<&Cart, EngineError> {
        match self.mode()? {
            Mode::Guest => Ok(self.apply_guest(|lines| adjust_quantity(lines, product_id, 1))),
            Mode::Authenticated => {
                let seq = self.begin_remote();
                let result = self.gateway.increment(product_id, 1, position).await;
                self.adopt_remote(seq, result)
            }
        }
    }

    /// Lower the quantity of the line at `position` by one, floored at 1.
    pub async fn decrement(
        &mut self,
        product_id: &ProductId,
        position: usize,
    ) -> Result<&Cart, EngineError> {
        match self.mode()? {
            Mode::Guest => Ok(self.apply_guest(|lines| adjust_quantity(lines, product_id, -1))),
            Mode::Authenticated => {
                let seq = self.begin_remote();
                let result = self.gateway.decrement(product_id, 1, position).await;
                self.adopt_remote(seq, result)
            }
        }
    }

    /// Remove the line at `position`. An out-of-range position is a no-op in
    /// guest mode and left to the server to reject in authenticated mode.
    pub async fn remove_at(&mut self, position: usize) -> Result<&Cart, EngineError> {
        match self.mode()? {
            Mode::Guest => Ok(self.apply_guest(|lines| remove_at(lines, position))),
            Mode::Authenticated => {
                let line_id = self
                    .cart
                    .lines
                    .get(position)
                    .and_then(|line| line.line_id.clone());
                let seq = self.begin_remote();
                let result = self.gateway.remove_at(position, line_id.as_ref()).await;
                self.adopt_remote(seq, result)
            }
        }
    }

    /// Empty the cart.
    pub async fn clear(&mut self) -> Result<&Cart, EngineError> {
        match self.mode()? {
            Mode::Guest => {
                self.store.clear();
                self.cart = Cart::guest(Vec::new());
                self.state = EngineState::Guest;
                Ok(&self.cart)
            }
            Mode::Authenticated => {
                let seq = self.begin_remote();
                match self.gateway.clear(&self.cart.id).await {
                    Ok(()) => {
                        if seq >= self.applied_seq {
                            self.applied_seq = seq;
                            self.cart.lines.clear();
                            self.cart.total_price = 0;
                        }
                        self.state = EngineState::Authenticated;
                        Ok(&self.cart)
                    }
                    Err(err) => {
                        self.state = EngineState::Error {
                            resume: Mode::Authenticated,
                        };
                        Err(EngineError::Transport(err))
                    }
                }
            }
        }
    }

    /// Merge-on-login: transmit the guest lines alongside the credential
    /// exchange in a single call. On success the local guest entry is
    /// discarded and the merged server cart becomes the new state; on failure
    /// the engine stays in guest mode and the local cart is untouched, so no
    /// data is lost.
    ///
    /// Fires at most once per session: calling while already authenticated is
    /// a no-op.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&Cart, EngineError> {
        match self.state {
            EngineState::Uninitialized => return Err(EngineError::Uninitialized),
            EngineState::Authenticated
            | EngineState::Merging
            | EngineState::Error {
                resume: Mode::Authenticated,
            } => return Ok(&self.cart),
            EngineState::Guest
            | EngineState::Error {
                resume: Mode::Guest,
            } => {}
        }

        let guest_lines = self.store.load();
        tracing::info!(guest_lines = guest_lines.len(), "merging guest cart on login");
        self.state = EngineState::Merging;

        let seq = self.begin_remote();
        match self.gateway.login_and_merge(credentials, &guest_lines).await {
            Ok(snapshot) => {
                self.store.clear();
                if seq >= self.applied_seq {
                    self.applied_seq = seq;
                    self.cart = snapshot;
                }
                self.state = EngineState::Authenticated;
                Ok(&self.cart)
            }
            Err(err) => {
                self.state = EngineState::Guest;
                Err(EngineError::Merge(err))
            }
        }
    }

    /// Explicit re-read of the authoritative state for the current mode;
    /// clears the error state on success.
    pub async fn refresh(&mut self) -> Result<&Cart, EngineError> {
        match self.mode()? {
            Mode::Guest => {
                self.cart = Cart::guest(self.store.load());
                self.state = EngineState::Guest;
                Ok(&self.cart)
            }
            Mode::Authenticated => {
                let seq = self.begin_remote();
                let result = self.gateway.fetch().await;
                self.adopt_remote(seq, result)
            }
        }
    }

    /// Which backend serves the next mutation. In the error state, mutations
    /// are served by the mode the engine will resume into.
    fn mode(&self) -> Result<Mode, EngineError> {
        match self.state {
            EngineState::Uninitialized => Err(EngineError::Uninitialized),
            EngineState::Guest => Ok(Mode::Guest),
            EngineState::Authenticated | EngineState::Merging => Ok(Mode::Authenticated),
            EngineState::Error { resume } => Ok(resume),
        }
    }

    /// Run a guest mutation against the local store and recompute the total.
    fn apply_guest(&mut self, op: impl FnOnce(Vec<CartLine>) -> Vec<CartLine>) -> &Cart {
        let lines = op(std::mem::take(&mut self.cart.lines));
        self.store.save(&lines);
        self.cart.lines = lines;
        self.cart.recompute_total();
        self.state = EngineState::Guest;
        &self.cart
    }

    fn begin_remote(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Adopt a remote completion. The server snapshot replaces the displayed
    /// cart wholesale, never patched, and only if it is not older than the
    /// last applied one (last-snapshot-wins).
    fn adopt_remote(
        &mut self,
        seq: u64,
        result: Result<Cart, GatewayError>,
    ) -> Result<&Cart, EngineError> {
        match result {
            Ok(snapshot) => {
                if seq >= self.applied_seq {
                    self.applied_seq = seq;
                    self.cart = snapshot;
                } else {
                    tracing::debug!(seq, applied = self.applied_seq, "ignoring superseded response");
                }
                self.state = EngineState::Authenticated;
                Ok(&self.cart)
            }
            Err(err) => {
                self.state = EngineState::Error {
                    resume: Mode::Authenticated,
                };
                Err(EngineError::Transport(err))
            }
        }
    }
}
