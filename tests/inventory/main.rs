//! Inventory integration tests.

mod support;
mod mutations;
mod concurrency;
mod failures;
