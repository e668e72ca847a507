//! Core types for FarmLink.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coupon;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use coupon::{CouponCode, CouponCodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, to_minor_units};
pub use status::*;
