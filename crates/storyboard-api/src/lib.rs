//! Storyboard API — HTTP layer.
//!
//! Route handlers validate input, call one external provider (or a short
//! fixed sequence of calls), and record the result in the user's asset
//! history. Everything behind the `storyboard-core` traits is swappable,
//! which is how the integration tests run without a database or network.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod upload;
pub mod voices;
