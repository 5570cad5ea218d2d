//! Storyboard Core — shared domain types and seams.
//!
//! This crate defines the user/asset data model, the error taxonomy, and the
//! traits behind which persistence and the external AI providers sit. It
//! contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod model;
pub mod provider;
pub mod repository;
