//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types used across all Bazaar components:
//! - `storefront` - Server-rendered storefront over the remote commerce API
//! - `cli` - Terminal client over the same API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! backends. The remote service owns every entity; these types are the
//! client's transient view of them, plus the session/viewer types that drive
//! route gating and role-based rendering.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, quantities, emails, roles, statuses and sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
