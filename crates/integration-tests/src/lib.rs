//! Integration tests for Thread Haven.
//!
//! The suites live in `tests/` and exercise the cart & checkout session
//! core end to end with injected storage and a scripted order gateway:
//!
//! - `cart_persistence` - cart mutations against real file-backed storage
//! - `checkout_flow` - cart vs. buy-now precedence, login resume, and order
//!   finalization
//!
//! Run with: `cargo test -p thread-haven-integration-tests`

use std::sync::Mutex;

use thread_haven_storefront::auth::CurrentUser;
use thread_haven_storefront::orders::{
    OrderApiError, OrderConfirmation, OrderGateway, OrderPayload,
};

/// Scripted stand-in for the external order API.
///
/// Records every submitted payload and answers success or failure per its
/// configuration, so tests can assert both the submitted totals and the
/// state-preservation guarantees around a failed submission.
pub struct ScriptedOrderApi {
    accept: bool,
    submissions: Mutex<Vec<OrderPayload>>,
}

impl ScriptedOrderApi {
    /// A gateway that accepts every order.
    #[must_use]
    pub fn accepting() -> Self {
        Self {
            accept: true,
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// A gateway that rejects every order with a 503.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            accept: false,
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// The payloads submitted so far.
    ///
    /// # Panics
    ///
    /// Panics if the submissions lock is poisoned.
    #[must_use]
    pub fn submissions(&self) -> Vec<OrderPayload> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned")
            .clone()
    }
}

impl OrderGateway for ScriptedOrderApi {
    async fn submit(
        &self,
        _buyer: &CurrentUser,
        payload: &OrderPayload,
    ) -> Result<OrderConfirmation, OrderApiError> {
        self.submissions
            .lock()
            .expect("submissions lock poisoned")
            .push(payload.clone());
        if self.accept {
            Ok(OrderConfirmation {
                order_id: Some("ord-accepted".into()),
            })
        } else {
            Err(OrderApiError::Rejected {
                status: 503,
                message: "order service unavailable".to_owned(),
            })
        }
    }
}
