//! Core types and trait definitions for Masil region visits.
//!
//! Holds the region hierarchy model, the visit ledger record, and the three
//! pieces of logic built on top of them: address verification, map stamp
//! aggregation, and the article region gate. Storage lives behind the traits
//! in [`store`]; this crate has no HTTP or database dependencies.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod gate;
pub mod region;
pub mod stamp;
pub mod store;
pub mod user;
pub mod verify;
pub mod visit;

pub use error::{Error, Result};
