//! Atomic combat events appended to the fight log.
//!
//! A [`CombatAction`] is immutable once produced. The log it lands in is
//! append-only and never rewritten; spectators joining late reconstruct the
//! fight from a snapshot plus subsequent actions.

use crate::effect::StatusEffect;
use crate::fighter::Side;

/// Closed set of things a fighter can do in one turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Special,
    Ultimate,
    Defend,
    Recover,
}

/// One atomic event in a fight.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatAction {
    pub kind: ActionKind,
    pub side: Side,
    /// Damage dealt to the opposing side, if any.
    pub damage: Option<u32>,
    pub energy_cost: u32,
    /// Effects this action attached to the fight.
    pub effects: Vec<StatusEffect>,
    pub critical: bool,
    /// Set when the defender's guard stance absorbed part of this hit.
    pub blocked: bool,
    pub text: String,
}

impl CombatAction {
    /// A damaging action (attack, special, or ultimate).
    pub fn strike(
        kind: ActionKind,
        side: Side,
        damage: u32,
        energy_cost: u32,
        critical: bool,
        blocked: bool,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            side,
            damage: Some(damage),
            energy_cost,
            effects: Vec::new(),
            critical,
            blocked,
            text: text.into(),
        }
    }

    /// A non-damaging stance or recovery action.
    pub fn stance(kind: ActionKind, side: Side, energy_cost: u32, text: impl Into<String>) -> Self {
        Self {
            kind,
            side,
            damage: None,
            energy_cost,
            effects: Vec::new(),
            critical: false,
            blocked: false,
            text: text.into(),
        }
    }

    pub fn with_effects(mut self, effects: Vec<StatusEffect>) -> Self {
        self.effects = effects;
        self
    }

    pub fn is_damaging(&self) -> bool {
        self.damage.is_some()
    }
}
