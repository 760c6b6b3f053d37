//! Core types for Vendora.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pricing;
pub mod role;
pub mod status;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use pricing::{order_total, percentage_discount};
pub use role::{Role, RoleParseError};
pub use status::{OrderStatus, OrderStatusParseError};
pub use username::{Username, UsernameError};
