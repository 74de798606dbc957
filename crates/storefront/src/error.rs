//! Unified error handling for the cart & checkout core.
//!
//! Module-level APIs return their precise error types; [`AppError`] is the
//! single type the [`state::AppState`](crate::state::AppState) facade hands
//! to the embedding view layer, which only needs to know whether to blame
//! the buyer's input or the system.

use thiserror::Error;

use crate::cart::SelectionError;
use crate::checkout::{CheckoutError, ValidationError};
use crate::config::ConfigError;
use crate::orders::OrderApiError;
use crate::storage::StorageError;

/// Application-level error type for the storefront core.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persisting state failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An incomplete variant selection was rejected.
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Checkout input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A checkout attempt failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// Whether this error is the buyer's input rather than a system fault.
    ///
    /// User errors are surfaced verbatim next to the offending form field;
    /// everything else gets a generic failure message and a log line.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Selection(_)
                | Self::Validation(_)
                | Self::Checkout(
                    CheckoutError::EmptySelection | CheckoutError::NotAuthenticated
                )
        )
    }
}

impl From<OrderApiError> for AppError {
    fn from(err: OrderApiError) -> Self {
        Self::Checkout(CheckoutError::Submission(err))
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
