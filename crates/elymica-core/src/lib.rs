//! # Elymica Core
//!
//! Foundational types shared by every Elymica crate:
//!
//! - [`errors`]: the HTTP-facing [`AppError`] used at the portal boundary
//! - [`time`]: wall-clock helpers expressed in epoch milliseconds
//!
//! # Example
//!
//! ```ignore
//! use elymica_core::{AppError, now_millis};
//!
//! let error = AppError::unauthorized("Invalid email or password");
//! let now = now_millis();
//! ```

pub mod errors;
pub mod time;

pub use errors::AppError;
pub use time::{expires_at_from, now_millis};
