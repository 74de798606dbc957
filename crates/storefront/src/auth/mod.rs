//! Authentication marker and the login-resume bridge for buy-now.
//!
//! Token issuance and the login flow itself are external; this module
//! consumes only the authenticated-user marker ([`CurrentUser`]) and owns
//! the one piece of auth-adjacent state the core is responsible for: a
//! buy-now intent stashed when checkout is attempted without a session,
//! restored exactly once after login succeeds.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use thread_haven_core::{Email, UserId};

use crate::checkout::{CheckoutSessionManager, DirectBuyItem};
use crate::storage::{KeyValueStore, StorageError, keys};

/// The authenticated buyer, as handed over by the session layer.
///
/// Presence of this value is what gates checkout; the core never inspects
/// the token beyond forwarding it to the order API.
#[derive(Clone)]
pub struct CurrentUser {
    id: UserId,
    name: String,
    email: Email,
    token: SecretString,
}

impl CurrentUser {
    /// Create the marker from session data.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: Email, token: SecretString) -> Self {
        Self {
            id,
            name: name.into(),
            email,
            token,
        }
    }

    /// The buyer's identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// The buyer's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The buyer's email address.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// The bearer token for the order API.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// A buy-now intent parked while the buyer goes through login.
///
/// Persisted under its own key, separate from the active buy-now item, and
/// consumed read-once by [`resume_if_pending`]. The timestamp is diagnostic
/// only; the stash has no expiry and survives until consumed or overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingBuyItem {
    /// The intended purchase.
    pub item: DirectBuyItem,
    /// When the intent was stashed.
    pub stashed_at: DateTime<Utc>,
}

/// Where to send the buyer, returned when checkout needs a login first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    /// Destination to return to once authentication completes.
    pub return_to: &'static str,
}

impl LoginRedirect {
    /// Redirect to login with checkout as the return destination.
    #[must_use]
    pub const fn to_checkout() -> Self {
        Self {
            return_to: "/checkout",
        }
    }
}

/// Park a buy-now intent until the buyer has logged in.
///
/// Overwrites any previously stashed intent. The caller is expected to
/// follow the returned redirect.
///
/// # Errors
///
/// Returns [`StorageError`] if the stash cannot be persisted.
#[instrument(skip(storage, item), fields(product_id = %item.product_id))]
pub fn stash_pending_buy<S: KeyValueStore>(
    storage: &mut S,
    item: DirectBuyItem,
) -> Result<LoginRedirect, StorageError> {
    let pending = PendingBuyItem {
        item,
        stashed_at: Utc::now(),
    };
    storage.set(keys::PENDING_DIRECT_BUY_ITEM, &pending)?;
    Ok(LoginRedirect::to_checkout())
}

/// Restore a stashed buy-now intent after a successful login.
///
/// Reads the stash once, deletes it, and forwards the item to the checkout
/// session as the active buy-now selection with quantity normalized to 1.
/// Idempotent: a second call after one stash finds nothing and does nothing.
/// Returns whether an intent was resumed.
///
/// # Errors
///
/// Returns [`StorageError`] if persisting the restored buy-now item fails.
/// The stash is already consumed at that point, so a failed resume drops
/// the intent rather than leaving a duplicate to re-apply; the buyer
/// restarts from the product page.
#[instrument(skip(storage, checkout))]
pub fn resume_if_pending<S: KeyValueStore>(
    storage: &mut S,
    checkout: &mut CheckoutSessionManager,
) -> Result<bool, StorageError> {
    let Some(pending) = storage.get::<PendingBuyItem>(keys::PENDING_DIRECT_BUY_ITEM) else {
        return Ok(false);
    };

    // Delete before applying so a second call cannot double-apply.
    storage.remove(keys::PENDING_DIRECT_BUY_ITEM);

    let mut item = pending.item;
    item.quantity = 1;
    checkout.start_direct_buy(storage, item)?;
    Ok(true)
}
