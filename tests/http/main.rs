//! HTTP integration tests.
//!
//! Each test binds an axum server on port 0 and drives it with reqwest.

#![cfg(feature = "http")]

mod support;
mod billing;
mod shop_client;
