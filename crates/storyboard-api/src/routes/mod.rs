//! Route modules, one per API context.

pub mod health;
pub mod speech;
pub mod stories;
pub mod users;
