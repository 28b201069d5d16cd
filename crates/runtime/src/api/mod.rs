//! Public API surface: errors, the per-fight handle, and the registry.

pub mod errors;
pub mod handle;
pub mod registry;

pub use errors::{BetError, Result, RuntimeError};
pub use handle::FightHandle;
pub use registry::FightRegistry;
