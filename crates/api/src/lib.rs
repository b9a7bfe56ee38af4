// Path: crates/api/src/lib.rs

//! # Waypoint API Crate Lints
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
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # Waypoint API
//!
//! The seams between the orchestration core and its external collaborators:
//! the node connection, the signing capability, the delegation snapshot
//! fetcher, and the completion sink the submission controller publishes into.

/// The `DelegationSource` trait for fetching proxy snapshots.
pub mod delegation;
/// The `CompletionSink` trait through which in-block events are published.
pub mod events;
/// The `NodeApi` and `NodeProvider` traits for talking to a chain node.
pub mod node;
/// The `Signer` trait for signing extrinsic payloads.
pub mod signer;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::delegation::DelegationSource;
    pub use crate::events::CompletionSink;
    pub use crate::node::{NodeApi, NodeProvider, NodeStream};
    pub use crate::signer::Signer;
}
