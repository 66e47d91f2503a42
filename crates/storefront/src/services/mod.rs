//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Mock email/password authentication and bearer tokens
//! - `catalog` - Listing filters, sorting, pagination, facets
//! - `cart` - Session cart with merge-by-variant and stock limits
//! - `wishlist` - Session wishlist
//! - `checkout` - Delivery pricing, quotes, order placement
//! - `invoice` - Plain-text invoice rendering

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod invoice;
pub mod wishlist;
