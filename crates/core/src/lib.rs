//! AFROVIBZ Core - Shared domain types.
//!
//! This crate provides the types used across all AFROVIBZ components:
//! - `storefront` - Public storefront and admin back-office API
//! - `cli` - Command-line tools for catalog and credential management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP, no
//! storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
