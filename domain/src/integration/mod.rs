//! Integration domain module
//!
//! Per-user, per-provider OAuth token material and the storage layout used
//! for it. Token records live in a durable table per provider
//! (`<provider>_integration`, keyed by `user_id`) with a fast cache mirror
//! keyed by the provider's own user id.

pub mod entities;
pub mod keys;

pub use entities::{IntegrationStatus, IntegrationToken, TokenGrant, TokenLookup};
