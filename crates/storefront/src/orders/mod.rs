//! Order submission to the external order API.
//!
//! The order service is an external collaborator; this module holds the
//! payload types, the [`OrderGateway`] port the checkout flow drives, and
//! the production [`HttpOrderClient`] over `reqwest`. Tests substitute the
//! port with an in-process mock.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use thread_haven_core::{OrderId, Price, ProductId, UserId};

use crate::auth::CurrentUser;
use crate::checkout::ShippingDetails;

/// Header carrying a per-submission correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors from the order API boundary.
#[derive(Debug, Error)]
pub enum OrderApiError {
    /// The HTTP request itself failed (network, timeout, bad response body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("order rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code returned by the API.
        status: u16,
        /// Response body, for the user-facing error surface.
        message: String,
    },

    /// The order API base URL could not be combined with the orders path.
    #[error("invalid order API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// One line of the submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Catalog identifier of the product.
    pub product_id: ProductId,
    /// Number of units.
    pub quantity: u32,
    /// Chosen size.
    pub size: String,
    /// Chosen color.
    pub color: String,
    /// Unit price at submission time.
    pub unit_price: Price,
}

/// The finalized order payload, as the order API expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// The authenticated buyer placing the order.
    pub buyer_id: UserId,
    /// Resolved line items.
    pub items: Vec<OrderLine>,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Fixed fee for the selected delivery region.
    pub shipping_fee: Decimal,
    /// `subtotal + shipping_fee`.
    pub total: Decimal,
    /// Where and how to deliver.
    pub shipping_details: ShippingDetails,
}

/// Acknowledgement from the order API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Identifier assigned by the order service, when it returns one.
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

/// Port for submitting a finalized order.
///
/// Submission is the single asynchronous operation in the core; the checkout
/// flow awaits its settlement before touching any cart state.
pub trait OrderGateway {
    /// Submit an order on behalf of the authenticated buyer.
    ///
    /// # Errors
    ///
    /// Returns [`OrderApiError`] on transport failure or API rejection.
    fn submit(
        &self,
        buyer: &CurrentUser,
        payload: &OrderPayload,
    ) -> impl Future<Output = Result<OrderConfirmation, OrderApiError>> + Send;
}

impl<G: OrderGateway + Sync> OrderGateway for &G {
    fn submit(
        &self,
        buyer: &CurrentUser,
        payload: &OrderPayload,
    ) -> impl Future<Output = Result<OrderConfirmation, OrderApiError>> + Send {
        (**self).submit(buyer, payload)
    }
}

/// Production order client: POSTs the payload to `{base}/api/orders` with
/// the buyer's bearer token and a fresh request ID per attempt.
#[derive(Debug, Clone)]
pub struct HttpOrderClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpOrderClient {
    /// Create a client against the given API base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

impl OrderGateway for HttpOrderClient {
    #[instrument(skip(self, buyer, payload), fields(buyer_id = %payload.buyer_id))]
    async fn submit(
        &self,
        buyer: &CurrentUser,
        payload: &OrderPayload,
    ) -> Result<OrderConfirmation, OrderApiError> {
        let endpoint = self.base_url.join("api/orders")?;
        let request_id = Uuid::new_v4().to_string();
        debug!(request_id, "submitting order");

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(buyer.token().expose_secret())
            .header(REQUEST_ID_HEADER, &request_id)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OrderApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
