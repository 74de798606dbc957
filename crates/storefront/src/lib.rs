//! Thread Haven Storefront - cart & checkout session core.
//!
//! This crate owns the stateful heart of the shop client: the variant-keyed
//! cart, the single buy-now checkout selection, durable persistence of both
//! across reloads, and the login-resume path that preserves a buy-now intent
//! when the buyer is not yet authenticated.
//!
//! Views, routing, the product catalog, and the order API itself live
//! elsewhere; this crate consumes them through the [`storage::KeyValueStore`]
//! and [`orders::OrderGateway`] ports and the [`auth::CurrentUser`] marker.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod state;
pub mod storage;
pub mod telemetry;
