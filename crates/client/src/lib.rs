//! Cafecraft client state layer.
//!
//! This crate is the core consumed by the Cafecraft UI shells (the owner
//! dashboard and the customer-facing storefront). The shells are purely
//! presentational; everything stateful lives here:
//!
//! - [`api`] - single-shot HTTP adapter with bearer auth and a 401 fast path
//! - [`site`] - the active site record and its enabled plugin set
//! - [`cart`] - the durable, local-only order cart
//! - [`gate`] - plugin access guard (notify + redirect on denial)
//! - [`public`] - cached read-only fetchers for public site/menu/sitemap data
//!
//! # Control flow
//!
//! UI triggers a store operation, the store calls the adapter (if remote),
//! the store commits new state synchronously once the call resolves, and the
//! UI re-renders from a [`site::SiteSnapshot`] or the cart's derived values.
//! The cart never talks to the network; the site store is the single source
//! of truth for which site is active and which features are unlocked.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod error;
pub mod gate;
pub mod public;
pub mod site;
pub mod storage;
pub mod ui;

pub use api::{ApiBody, ApiClient};
pub use cart::{CartItem, CartStore, ProductInput};
pub use config::ClientConfig;
pub use error::{ApiError, StorageError};
pub use gate::{GateStatus, PluginGate};
pub use public::PublicCatalog;
pub use site::{Site, SiteSnapshot, SiteStore};
