//! Core business logic for murmur.
//!
//! Every operation that acts on behalf of a user takes the verified
//! [`Actor`] explicitly; nothing here reads request-scoped state.

pub mod context;
pub mod services;

pub use context::Actor;
pub use services::*;
