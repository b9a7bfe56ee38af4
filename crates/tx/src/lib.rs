// Path: crates/tx/src/lib.rs
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

//! # Waypoint Transactions
//!
//! Turns an abstract call into a tracked on-chain submission: composition of
//! delegation layers, balance preflight, and the per-submission lifecycle.

pub mod compose;
pub mod preflight;
pub mod submission;

pub use compose::{acting_address, compose};
pub use preflight::{check_affordability, estimate_fee};
pub use submission::{Submission, Submitter};
