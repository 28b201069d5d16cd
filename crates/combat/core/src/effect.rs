//! Timed status effects attached to a side of the fight.
//!
//! Effects are created by actions, tick down once per round during upkeep,
//! and are removed when their remaining duration reaches zero. Multiple
//! effects stack additively.

use crate::fighter::{Side, WorldTag};

/// Monotonic per-fight effect identifier, assigned by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u32);

/// Behavioral category of a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectKind {
    /// Positive modifier on the target side. A `magnitude` on a buff created
    /// by a defend stance is the percent of incoming damage it absorbs.
    Buff,
    /// Negative modifier; each active debuff also reduces the target's
    /// effective speed by 20%.
    Debuff,
    /// Applies `magnitude` as direct damage to the target every upkeep.
    DamageOverTime,
    /// The target side generates no action while stunned.
    Stun,
}

/// A timed modifier on one side of the fight.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub id: EffectId,
    pub kind: EffectKind,
    pub target: Side,
    /// Rounds left, decremented once per upkeep; removed at zero.
    pub remaining: u32,
    pub magnitude: i32,
    pub label: String,
}

impl StatusEffect {
    pub fn new(
        id: EffectId,
        kind: EffectKind,
        target: Side,
        remaining: u32,
        magnitude: i32,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            target,
            remaining,
            magnitude,
            label: label.into(),
        }
    }

    /// The status effect a special attack from `world` inflicts on `target`.
    ///
    /// Each world flavors its special differently; the id is assigned by the
    /// engine when the effect is attached.
    pub fn from_special(id: EffectId, world: WorldTag, target: Side) -> Self {
        match world {
            WorldTag::DarkArena => {
                Self::new(id, EffectKind::DamageOverTime, target, 3, 5, "bleeding wound")
            }
            WorldTag::SciFiAi => Self::new(id, EffectKind::Debuff, target, 2, 20, "servo scramble"),
            WorldTag::MythicCourt => {
                Self::new(id, EffectKind::Debuff, target, 2, 15, "weakening hex")
            }
            WorldTag::Outlands => Self::new(id, EffectKind::Stun, target, 1, 0, "concussion"),
        }
    }

    /// Incoming-damage guard created by a defend stance, consumed by the
    /// opponent's next hit.
    ///
    /// Two ticks of duration so a guard raised late in a round survives the
    /// round-end decrement and still covers the opponent's next action.
    pub fn guard(id: EffectId, target: Side, mitigation: i32) -> Self {
        Self::new(id, EffectKind::Buff, target, 2, mitigation, "guard stance")
    }

    pub fn is_guard(&self) -> bool {
        self.kind == EffectKind::Buff && self.label == "guard stance"
    }
}
