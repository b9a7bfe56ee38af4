// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Waypoint Types
//!
//! This crate is the foundational library for Waypoint, containing the data
//! model shared by call composition, submission tracking and delegation
//! resolution, together with the error taxonomy and configuration objects.
//!
//! ## Architectural Role
//!
//! As the base crate, `waypoint-types` has minimal dependencies and is itself a
//! dependency for every other crate in the workspace. This prevents circular
//! dependencies and provides a single canonical definition for shared types
//! like `Address`, `Call`, `ProxyEdge`, `MultisigAccount` and the error enums.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::TransactionError> = std::result::Result<T, E>;

/// Core data structures: addresses, calls, events, proxies and multisigs.
pub mod app;
/// The canonical, deterministic binary codec used for call hashing and signing.
pub mod codec;
/// Client and per-transaction configuration structures.
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
