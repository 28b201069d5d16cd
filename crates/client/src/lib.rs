//! Resilient spectator-side adapter over the runtime's read API.
//!
//! Reconnect-and-poll fallback is a resilience concern, not a simulation
//! concern: [`FightFeed`] wraps subscription plumbing so consuming
//! applications get one ordered stream of envelopes and never block
//! indefinitely when live delivery is unavailable.
pub mod feed;

pub use feed::{FeedConfig, FeedOutcome, FightFeed};
