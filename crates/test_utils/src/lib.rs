// Path: crates/test_utils/src/lib.rs
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

//! # Waypoint Test Utilities
//!
//! Scripted node, signer and delegation mocks plus fixtures shared by the
//! Waypoint crates' tests.

pub mod assertions;
pub mod fixtures;
pub mod mock_node;
pub mod randomness;
