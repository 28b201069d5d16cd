//! Mutable state of one running fight.
//!
//! [`CombatState`] is owned exclusively by the engine instance for that
//! fight and is never mutated from outside. Health and energy writes go
//! through the clamping helpers here so the meters can never leave their
//! valid ranges.

use crate::config::CombatConfig;
use crate::effect::{EffectKind, StatusEffect};
use crate::fighter::{Side, WorldTag};

/// Current health and energy for one side.
///
/// Both values are clamped: health to `0..=max_health`, energy to
/// `0..=ENERGY_MAX`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FighterMeter {
    pub health: u32,
    pub max_health: u32,
    pub energy: u32,
}

impl FighterMeter {
    pub fn full(max_health: u32) -> Self {
        Self {
            health: max_health,
            max_health,
            energy: CombatConfig::ENERGY_MAX,
        }
    }

    pub fn apply_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn spend_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_sub(amount);
    }

    pub fn restore_energy(&mut self, amount: u32) {
        self.energy = (self.energy + amount).min(CombatConfig::ENERGY_MAX);
    }

    pub fn health_pct(&self) -> f64 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f64 / self.max_health as f64
    }

    pub fn energy_pct(&self) -> f64 {
        self.energy as f64 / CombatConfig::ENERGY_MAX as f64
    }

    pub fn is_down(&self) -> bool {
        self.health == 0
    }
}

/// Symmetric-world bonus hook attached when both fighters share a tag.
///
/// Currently carries no mechanical weight; reserved for future same-world
/// bonuses. Its presence is still part of the wire snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvironmentModifier {
    pub world: WorldTag,
    pub label: String,
}

impl EnvironmentModifier {
    pub fn for_world(world: WorldTag) -> Self {
        Self {
            world,
            label: format!("home ground: {world}"),
        }
    }
}

/// The full mutable state of one running fight.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub meters: [FighterMeter; 2],
    /// Starts at 1, increments by exactly one per executed round.
    pub round: u32,
    /// Signed scalar in [-100, 100]; positive favors side 1. Decays 10%
    /// toward zero every round.
    pub momentum: i32,
    pub effects: Vec<StatusEffect>,
    pub environment: Option<EnvironmentModifier>,
}

impl CombatState {
    pub fn new(max_health: [u32; 2], environment: Option<EnvironmentModifier>) -> Self {
        Self {
            meters: [
                FighterMeter::full(max_health[0]),
                FighterMeter::full(max_health[1]),
            ],
            round: 1,
            momentum: 0,
            effects: Vec::new(),
            environment,
        }
    }

    pub fn meter(&self, side: Side) -> &FighterMeter {
        &self.meters[side.index()]
    }

    pub fn meter_mut(&mut self, side: Side) -> &mut FighterMeter {
        &mut self.meters[side.index()]
    }

    /// Active debuffs targeting `side`; each one costs 20% effective speed.
    pub fn debuff_count(&self, side: Side) -> usize {
        self.effects
            .iter()
            .filter(|e| e.target == side && e.kind == EffectKind::Debuff)
            .count()
    }

    pub fn is_stunned(&self, side: Side) -> bool {
        self.effects
            .iter()
            .any(|e| e.target == side && e.kind == EffectKind::Stun)
    }

    /// Shifts momentum toward `side` and clamps to the valid range.
    pub fn push_momentum(&mut self, side: Side, amount: i32) {
        let signed = match side {
            Side::One => amount,
            Side::Two => -amount,
        };
        self.momentum = (self.momentum + signed)
            .clamp(-CombatConfig::MOMENTUM_MAX, CombatConfig::MOMENTUM_MAX);
    }

    /// Applies the per-round 10% decay toward zero.
    pub fn decay_momentum(&mut self) {
        self.momentum -= self.momentum / 10;
    }

    /// Momentum from the perspective of `side`: positive means the wind is
    /// at that side's back.
    pub fn momentum_for(&self, side: Side) -> i32 {
        match side {
            Side::One => self.momentum,
            Side::Two => -self.momentum,
        }
    }
}
