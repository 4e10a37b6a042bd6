//! Dine Mart Core - Shared types library.
//!
//! This crate provides common types used across the Dine Mart components:
//! - `storefront` - Public-facing e-commerce site
//! - `integration-tests` - End-to-end tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, slugs, and sizes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
