//! Application state shared across views and handlers.
//!
//! The cart/checkout state was once reachable from anywhere as a global
//! store; here it is an explicit object constructed once and passed to the
//! views that need it. All mutation goes through the operations below, and
//! the storage and order-API dependencies are injected so tests can swap
//! them without touching any cart logic.

use crate::auth::{self, CurrentUser, LoginRedirect};
use crate::cart::{Cart, CartStore, ProductSummary, VariantChoice, VariantKey};
use crate::checkout::{
    CheckoutError, CheckoutSelection, CheckoutSessionManager, DirectBuyItem, ShippingDetails,
    ShippingRegion,
};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::orders::{HttpOrderClient, OrderConfirmation, OrderGateway};
use crate::storage::{JsonFileStore, KeyValueStore};

use rust_decimal::Decimal;

/// What happened when the buyer hit "buy now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuyNowOutcome {
    /// The buy-now item is set; proceed to checkout.
    CheckoutReady,
    /// No session yet; the intent is stashed and the buyer must log in.
    LoginRequired(LoginRedirect),
}

/// The cart & checkout session core, wired together.
///
/// Generic over the storage and order-gateway ports; production code uses
/// the defaults, tests inject [`MemoryStore`](crate::storage::MemoryStore)
/// and a scripted gateway.
#[derive(Debug)]
pub struct AppState<S = JsonFileStore, G = HttpOrderClient> {
    config: StorefrontConfig,
    storage: S,
    cart: CartStore,
    checkout: CheckoutSessionManager,
    orders: G,
    current_user: Option<CurrentUser>,
}

impl AppState {
    /// Build the production state: file-backed storage under the configured
    /// profile directory and an HTTP client against the order API.
    #[must_use]
    pub fn from_config(config: StorefrontConfig) -> Self {
        let storage = JsonFileStore::new(&config.storage_dir);
        let orders = HttpOrderClient::new(config.order_api_url.clone());
        Self::new(config, storage, orders)
    }
}

impl<S: KeyValueStore, G: OrderGateway> AppState<S, G> {
    /// Wire the core from explicit parts, hydrating cart and checkout state
    /// from whatever the storage already holds.
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: S, orders: G) -> Self {
        let cart = CartStore::load(&storage);
        let checkout = CheckoutSessionManager::load(&storage, config.shipping);
        Self {
            config,
            storage,
            cart,
            checkout,
            orders,
            current_user: None,
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// The current cart state.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.cart_store().cart()
    }

    /// The active buy-now item, if any.
    #[must_use]
    pub const fn direct_buy(&self) -> Option<&DirectBuyItem> {
        self.checkout.direct_buy()
    }

    /// The authenticated buyer, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    const fn cart_store(&self) -> &CartStore {
        &self.cart
    }

    // =========================================================================
    // Cart operations
    // =========================================================================

    /// Add one unit of a product variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the cart fails.
    pub fn add_to_cart(
        &mut self,
        product: &ProductSummary,
        choice: &VariantChoice,
    ) -> Result<()> {
        self.cart.add_item(&mut self.storage, product, choice)?;
        Ok(())
    }

    /// Remove a line from the cart; absent lines are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the cart fails.
    pub fn remove_from_cart(&mut self, key: &VariantKey) -> Result<()> {
        self.cart.remove_item(&mut self.storage, key)?;
        Ok(())
    }

    /// Increase a line's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the cart fails.
    pub fn increment_quantity(&mut self, key: &VariantKey) -> Result<()> {
        self.cart.increment_quantity(&mut self.storage, key)?;
        Ok(())
    }

    /// Decrease a line's quantity by one, never below 1.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the cart fails.
    pub fn decrement_quantity(&mut self, key: &VariantKey) -> Result<()> {
        self.cart.decrement_quantity(&mut self.storage, key)?;
        Ok(())
    }

    /// Empty the cart and delete its persisted record.
    pub fn clear_cart(&mut self) {
        self.cart.clear(&mut self.storage);
    }

    // =========================================================================
    // Buy now & login resume
    // =========================================================================

    /// Start a buy-now purchase of one unit of a product variant.
    ///
    /// With a session present the item becomes the active checkout selection
    /// immediately; without one the intent is stashed and the buyer is sent
    /// to login, to be resumed by [`login_succeeded`](Self::login_succeeded).
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the intent fails.
    pub fn buy_now(
        &mut self,
        product: &ProductSummary,
        choice: &VariantChoice,
    ) -> Result<BuyNowOutcome> {
        let item = DirectBuyItem::new(product, choice);
        if self.current_user.is_some() {
            self.checkout.start_direct_buy(&mut self.storage, item)?;
            Ok(BuyNowOutcome::CheckoutReady)
        } else {
            let redirect = auth::stash_pending_buy(&mut self.storage, item)?;
            Ok(BuyNowOutcome::LoginRequired(redirect))
        }
    }

    /// Install the authenticated-user marker and resume a stashed buy-now
    /// intent, if one exists. Returns whether an intent was resumed.
    ///
    /// # Errors
    ///
    /// Returns an error only if persisting the resumed item fails.
    pub fn login_succeeded(&mut self, user: CurrentUser) -> Result<bool> {
        self.current_user = Some(user);
        let resumed = auth::resume_if_pending(&mut self.storage, &mut self.checkout)?;
        Ok(resumed)
    }

    /// Drop the authenticated-user marker.
    pub fn logout(&mut self) {
        self.current_user = None;
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Resolve what a checkout attempt would submit right now.
    #[must_use]
    pub fn resolve_selection(&self) -> CheckoutSelection {
        self.checkout.resolve_selection(self.cart())
    }

    /// Drop the buy-now item, falling back to the cart selection.
    pub fn clear_direct_buy(&mut self) {
        self.checkout.clear_direct_buy(&mut self.storage);
    }

    /// The fixed delivery fee for a region tier.
    #[must_use]
    pub const fn shipping_fee(&self, region: ShippingRegion) -> Decimal {
        self.checkout.shipping_fee(region)
    }

    /// Submit the resolved selection as an order.
    ///
    /// On confirmed success the cart and buy-now item are both cleared; on
    /// any failure all state is left untouched so the buyer can retry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotAuthenticated`] without a session, and
    /// otherwise whatever [`CheckoutSessionManager::finalize_order`] returns.
    pub async fn place_order(&mut self, details: ShippingDetails) -> Result<OrderConfirmation> {
        let buyer = self
            .current_user
            .as_ref()
            .ok_or(CheckoutError::NotAuthenticated)?;
        let confirmation = self
            .checkout
            .finalize_order(&mut self.storage, &mut self.cart, &self.orders, buyer, details)
            .await?;
        Ok(confirmation)
    }
}
