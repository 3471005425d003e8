//! Core types and trait definitions for the Campus school backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Inputs that reach a [`store::SchoolStore`] are constructed through
//! validating constructors, so a backend never sees a blank login or an empty
//! chat message.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod chat;
pub mod error;
pub mod quota;
pub mod store;
pub mod user;

pub use error::{Error, Result};
