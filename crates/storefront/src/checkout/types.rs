//! Checkout data model: buy-now items, shipping details, and the resolved
//! selection.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use thread_haven_core::{Email, EmailError, Price, ProductId};

use crate::cart::{CartLineItem, ProductSummary, VariantChoice};

/// A single-item "buy now" intent that bypasses the cart.
///
/// At most one exists at a time; it is owned by the session manager and
/// persisted under its own key so a reload mid-checkout does not lose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectBuyItem {
    /// Catalog identifier of the product.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub unit_price: Price,
    /// Product image URL.
    pub image: String,
    /// Chosen size.
    pub size: String,
    /// Chosen color.
    pub color: String,
    /// Number of units, 1 unless the buyer adjusted it at checkout.
    pub quantity: u32,
}

impl DirectBuyItem {
    /// Create a buy-now intent for one unit of a product variant.
    #[must_use]
    pub fn new(product: &ProductSummary, choice: &VariantChoice) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            size: choice.size().to_owned(),
            color: choice.color().to_owned(),
            quantity: 1,
        }
    }

    /// `unit_price x quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }

    /// View this item as a cart line, for the resolved selection.
    #[must_use]
    pub fn as_line_item(&self) -> CartLineItem {
        CartLineItem {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            unit_price: self.unit_price,
            image: self.image.clone(),
            size: self.size.clone(),
            color: self.color.clone(),
            quantity: self.quantity,
        }
    }
}

/// Delivery region tier; each carries a fixed shipping fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingRegion {
    /// Inside the local delivery zone.
    Local,
    /// Everywhere else.
    Remote,
}

/// Accepted payment methods. Cash on delivery is the only one wired up;
/// anything else is rejected at validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Pay the courier on delivery.
    #[serde(rename = "cod")]
    CashOnDelivery,
}

impl PaymentMethod {
    /// Parse a payment method from its form value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedPaymentMethod`] for anything
    /// other than `"cod"`.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value {
            "cod" => Ok(Self::CashOnDelivery),
            other => Err(ValidationError::UnsupportedPaymentMethod(other.to_owned())),
        }
    }
}

/// Errors validating checkout input. These are surfaced to the buyer before
/// any state changes; nothing is silently defaulted.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// The recipient name is empty.
    #[error("name is required")]
    MissingName,
    /// The shipping address is empty.
    #[error("shipping address is required")]
    MissingAddress,
    /// The phone number is empty.
    #[error("phone number is required")]
    MissingPhone,
    /// The email address is missing or malformed.
    #[error(transparent)]
    Email(#[from] EmailError),
    /// The selected payment method is not supported.
    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),
}

/// Validated shipping and payment details for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    /// Recipient name.
    pub name: String,
    /// Contact email.
    pub email: Email,
    /// Full delivery address.
    pub address: String,
    /// Contact phone number.
    pub phone: String,
    /// Delivery region tier.
    pub region: ShippingRegion,
    /// How the order will be paid.
    pub payment_method: PaymentMethod,
}

impl ShippingDetails {
    /// Validate raw checkout form input.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered: empty name,
    /// address, or phone, a malformed email, or an unsupported payment
    /// method.
    pub fn new(
        name: &str,
        email: &str,
        address: &str,
        phone: &str,
        region: ShippingRegion,
        payment_method: &str,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let email = Email::parse(email.trim())?;
        let address = address.trim();
        if address.is_empty() {
            return Err(ValidationError::MissingAddress);
        }
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(ValidationError::MissingPhone);
        }
        let payment_method = PaymentMethod::parse(payment_method)?;
        Ok(Self {
            name: name.to_owned(),
            email,
            address: address.to_owned(),
            phone: phone.to_owned(),
            region,
            payment_method,
        })
    }
}

/// The item set a checkout attempt will submit, resolved per the precedence
/// rule: the buy-now item if one is set, otherwise the whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSelection {
    /// Line items to submit.
    pub items: Vec<CartLineItem>,
    /// Sum of line totals, before shipping.
    pub subtotal: Decimal,
}

impl CheckoutSelection {
    /// Whether there is nothing to check out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn details(
        name: &str,
        email: &str,
        address: &str,
        phone: &str,
        payment_method: &str,
    ) -> Result<ShippingDetails, ValidationError> {
        ShippingDetails::new(
            name,
            email,
            address,
            phone,
            ShippingRegion::Local,
            payment_method,
        )
    }

    #[test]
    fn test_complete_details_accepted() {
        let details = details(
            "Ayesha Rahman",
            "ayesha@example.com",
            "12 Lake Road",
            "01700000000",
            "cod",
        )
        .unwrap();
        assert_eq!(details.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(details.region, ShippingRegion::Local);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = details("  ", "a@example.com", "12 Lake Road", "017", "cod").unwrap_err();
        assert!(matches!(err, ValidationError::MissingName));

        let err = details("Ayesha", "a@example.com", "", "017", "cod").unwrap_err();
        assert!(matches!(err, ValidationError::MissingAddress));

        let err = details("Ayesha", "a@example.com", "12 Lake Road", " ", "cod").unwrap_err();
        assert!(matches!(err, ValidationError::MissingPhone));
    }

    #[test]
    fn test_malformed_email_rejected() {
        let err = details("Ayesha", "not-an-email", "12 Lake Road", "017", "cod").unwrap_err();
        assert!(matches!(err, ValidationError::Email(_)));
    }

    #[test]
    fn test_unsupported_payment_method_rejected() {
        assert!(matches!(
            PaymentMethod::parse("bkash"),
            Err(ValidationError::UnsupportedPaymentMethod(method)) if method == "bkash"
        ));

        let err = details("Ayesha", "a@example.com", "12 Lake Road", "017", "card").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnsupportedPaymentMethod(method) if method == "card"
        ));
    }

    #[test]
    fn test_input_trimmed() {
        let details = details(
            "  Ayesha Rahman ",
            " ayesha@example.com ",
            " 12 Lake Road ",
            " 017 ",
            "cod",
        )
        .unwrap();
        assert_eq!(details.name, "Ayesha Rahman");
        assert_eq!(details.address, "12 Lake Road");
        assert_eq!(details.phone, "017");
    }
}
