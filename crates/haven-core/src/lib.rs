//! Core types and engine for the Haven home-buying companion.
//!
//! Everything here is UI- and database-free: the rubric schema, the pure
//! scoring functions, the evaluation and inspection record models, the
//! debounced autosave controller, and the comparison builder. Storage
//! backends implement [`store::HomeStore`]; `haven-store-sqlite` is the
//! reference implementation.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod autosave;
pub mod compare;
pub mod error;
pub mod evaluation;
pub mod home;
pub mod inspection;
pub mod media;
pub mod rubric;
pub mod score;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Error, Result};
