// Path: crates/client/src/lib.rs
//! # Waypoint Client Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Waypoint Client
//!
//! The application-facing side of Waypoint: the per-endpoint event bus, the
//! delegation graph resolver, and the `ChainClient` façade tying them to
//! transaction submission.

pub mod accounts;
pub mod bus;
pub mod chain_client;

pub use accounts::{
    combined_accounts, find_proxy_sequences, resolve_acting_addresses, select_combined_account,
    MAX_PROXY_DEPTH,
};
pub use bus::{ChainEvents, EventBus, EventSource, OneBlockDelay};
pub use chain_client::ChainClient;
