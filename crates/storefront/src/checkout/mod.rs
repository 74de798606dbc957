//! Checkout session: the single "item set to check out now".
//!
//! [`CheckoutSessionManager`] owns the optional buy-now item and resolves
//! what a checkout attempt will submit: the buy-now item if one is set,
//! otherwise the whole cart. Finalizing an order is the only async path in
//! the core; it awaits the order API's settlement before clearing anything,
//! so a failed submission never loses the buyer's cart.

mod types;

pub use types::{
    CheckoutSelection, DirectBuyItem, PaymentMethod, ShippingDetails, ShippingRegion,
    ValidationError,
};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument};

use crate::auth::CurrentUser;
use crate::cart::{Cart, CartStore};
use crate::config::ShippingConfig;
use crate::orders::{OrderApiError, OrderConfirmation, OrderGateway, OrderLine, OrderPayload};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Errors finalizing a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Neither a buy-now item nor any cart lines to submit.
    #[error("nothing to check out")]
    EmptySelection,

    /// Checkout requires an authenticated buyer.
    #[error("checkout requires login")]
    NotAuthenticated,

    /// The order API refused or could not be reached; state is untouched.
    #[error(transparent)]
    Submission(#[from] OrderApiError),

    /// Persisting state after a confirmed order failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owns the buy-now item and drives order finalization.
#[derive(Debug, Clone)]
pub struct CheckoutSessionManager {
    direct_buy: Option<DirectBuyItem>,
    shipping: ShippingConfig,
}

impl CheckoutSessionManager {
    /// Hydrate the session from persisted storage.
    ///
    /// An absent or malformed buy-now record means no buy-now item is set.
    #[must_use]
    pub fn load<S: KeyValueStore>(storage: &S, shipping: ShippingConfig) -> Self {
        Self {
            direct_buy: storage.get(keys::DIRECT_BUY_ITEM),
            shipping,
        }
    }

    /// The active buy-now item, if any.
    #[must_use]
    pub const fn direct_buy(&self) -> Option<&DirectBuyItem> {
        self.direct_buy.as_ref()
    }

    /// Set and persist the buy-now item, making it the active selection
    /// regardless of cart contents.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if persisting the item fails.
    #[instrument(skip(self, storage, item), fields(product_id = %item.product_id))]
    pub fn start_direct_buy<S: KeyValueStore>(
        &mut self,
        storage: &mut S,
        item: DirectBuyItem,
    ) -> Result<(), StorageError> {
        storage.set(keys::DIRECT_BUY_ITEM, &item)?;
        self.direct_buy = Some(item);
        Ok(())
    }

    /// Drop the buy-now item and its persisted record, falling back to the
    /// cart as the active selection.
    #[instrument(skip(self, storage))]
    pub fn clear_direct_buy<S: KeyValueStore>(&mut self, storage: &mut S) {
        self.direct_buy = None;
        storage.remove(keys::DIRECT_BUY_ITEM);
    }

    /// Resolve what a checkout attempt will submit.
    ///
    /// Pure: the buy-now item wins if present, otherwise the cart's lines.
    #[must_use]
    pub fn resolve_selection(&self, cart: &Cart) -> CheckoutSelection {
        self.direct_buy.as_ref().map_or_else(
            || CheckoutSelection {
                items: cart.line_items.clone(),
                subtotal: cart.total_amount,
            },
            |item| CheckoutSelection {
                items: vec![item.as_line_item()],
                subtotal: item.subtotal(),
            },
        )
    }

    /// The fixed delivery fee for a region tier.
    #[must_use]
    pub const fn shipping_fee(&self, region: ShippingRegion) -> Decimal {
        self.shipping.fee(region)
    }

    /// Submit the resolved selection as an order.
    ///
    /// Awaits the order API's settlement. On confirmed success both sources
    /// are cleared, cart and buy-now, including their persisted records; on
    /// any failure every piece of state is left untouched so the buyer can
    /// retry the same selection.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptySelection`] when there is nothing to
    /// submit, [`CheckoutError::Submission`] when the order API fails, and
    /// [`CheckoutError::Storage`] only for post-confirmation persistence.
    #[instrument(skip_all, fields(buyer_id = %buyer.id()))]
    pub async fn finalize_order<S, G>(
        &mut self,
        storage: &mut S,
        cart: &mut CartStore,
        gateway: &G,
        buyer: &CurrentUser,
        details: ShippingDetails,
    ) -> Result<OrderConfirmation, CheckoutError>
    where
        S: KeyValueStore,
        G: OrderGateway,
    {
        let selection = self.resolve_selection(cart.cart());
        if selection.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }

        let shipping_fee = self.shipping_fee(details.region);
        let payload = OrderPayload {
            buyer_id: buyer.id().clone(),
            items: selection
                .items
                .iter()
                .map(|line| OrderLine {
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                    size: line.size.clone(),
                    color: line.color.clone(),
                    unit_price: line.unit_price,
                })
                .collect(),
            subtotal: selection.subtotal,
            shipping_fee,
            total: selection.subtotal + shipping_fee,
            shipping_details: details,
        };

        let confirmation = gateway.submit(buyer, &payload).await?;

        info!(order_id = ?confirmation.order_id, "order confirmed; clearing cart and buy-now");
        cart.clear(storage);
        self.clear_direct_buy(storage);
        Ok(confirmation)
    }
}
