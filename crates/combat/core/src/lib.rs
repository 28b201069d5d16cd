//! Deterministic fight resolution shared across the platform.
//!
//! `combat-core` defines the canonical combat rules (fighters, actions,
//! status effects, round resolution) and exposes pure APIs reused by the
//! runtime and offline tools. All state mutation flows through
//! [`engine::CombatEngine`]; everything else holds read-only snapshots.
//! Randomness is funneled through the engine's injected RNG so a fight can
//! be replayed from its seed.
pub mod action;
pub mod config;
pub mod effect;
pub mod engine;
pub mod fighter;
pub mod state;
pub mod style;

pub use action::{ActionKind, CombatAction};
pub use config::CombatConfig;
pub use effect::{EffectId, EffectKind, StatusEffect};
pub use engine::{CombatEngine, EngineError, RoundReport};
pub use fighter::{FighterId, FighterProfile, Side, WorldTag};
pub use state::{CombatState, EnvironmentModifier, FighterMeter};
pub use style::CombatStyle;
