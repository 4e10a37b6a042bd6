//! Core types for Dine Mart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod size;
pub mod slug;

pub use id::*;
pub use price::Price;
pub use size::ProductSize;
pub use slug::{Slug, SlugError};
