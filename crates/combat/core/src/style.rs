//! AI combat style selection.
//!
//! Each round the acting side picks a style from its world affiliation and
//! current health/energy situation; the engine maps the style to a concrete
//! action-generation policy.

use crate::state::CombatState;
use crate::fighter::{Side, WorldTag};

/// How the acting side approaches this round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CombatStyle {
    /// Trade damage freely; specials when energy allows.
    ///
    /// Selected when:
    /// - No other rule fires (the fallback)
    Aggressive,

    /// Recover or hold a guard stance.
    ///
    /// Selected when:
    /// - Energy below 35%
    Defensive,

    /// Go for the finisher when the defender is wobbling.
    ///
    /// Selected when:
    /// - sci-fi-ai affiliation with energy above 70%
    /// - Defender's health below 25%
    Opportunistic,

    /// All-in ultimates; nothing left to lose.
    ///
    /// Selected when:
    /// - dark-arena affiliation with health below 30%
    /// - Health below 15% regardless of world
    Desperate,

    /// Plain attacks only; keep it simple while weathering the storm.
    ///
    /// Selected when:
    /// - Healthy but far behind on momentum
    Basic,
}

impl CombatStyle {
    /// Picks a style for `side` from its affiliation and the current state.
    ///
    /// Rules are ordered; the first match wins and the chain falls back to
    /// [`CombatStyle::Aggressive`].
    pub fn select(state: &CombatState, side: Side, world: WorldTag) -> CombatStyle {
        let me = state.meter(side);
        let foe = state.meter(side.opponent());

        if world == WorldTag::DarkArena && me.health_pct() < 0.30 {
            return CombatStyle::Desperate;
        }
        if me.health_pct() < 0.15 {
            return CombatStyle::Desperate;
        }
        if world == WorldTag::SciFiAi && me.energy_pct() > 0.70 {
            return CombatStyle::Opportunistic;
        }
        if foe.health_pct() < 0.25 {
            return CombatStyle::Opportunistic;
        }
        if me.energy_pct() < 0.35 {
            return CombatStyle::Defensive;
        }
        if state.momentum_for(side) <= -40 {
            return CombatStyle::Basic;
        }
        CombatStyle::Aggressive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CombatState;

    fn state() -> CombatState {
        CombatState::new([100, 100], None)
    }

    #[test]
    fn dark_arena_turns_desperate_below_thirty_percent() {
        let mut s = state();
        s.meter_mut(Side::One).apply_damage(71); // 29%
        assert_eq!(
            CombatStyle::select(&s, Side::One, WorldTag::DarkArena),
            CombatStyle::Desperate
        );
        // Same health outside the dark arena is not yet desperate.
        assert_ne!(
            CombatStyle::select(&s, Side::One, WorldTag::MythicCourt),
            CombatStyle::Desperate
        );
    }

    #[test]
    fn sci_fi_ai_is_opportunistic_on_high_energy() {
        let s = state();
        assert_eq!(
            CombatStyle::select(&s, Side::Two, WorldTag::SciFiAi),
            CombatStyle::Opportunistic
        );
    }

    #[test]
    fn low_energy_goes_defensive() {
        let mut s = state();
        s.meter_mut(Side::One).spend_energy(85); // 15%
        assert_eq!(
            CombatStyle::select(&s, Side::One, WorldTag::MythicCourt),
            CombatStyle::Defensive
        );
    }

    #[test]
    fn wounded_defender_invites_opportunism() {
        let mut s = state();
        s.meter_mut(Side::Two).apply_damage(80); // 20%
        assert_eq!(
            CombatStyle::select(&s, Side::One, WorldTag::Outlands),
            CombatStyle::Opportunistic
        );
    }

    #[test]
    fn momentum_deficit_selects_basic() {
        let mut s = state();
        s.momentum = 60; // heavily favors side 1
        assert_eq!(
            CombatStyle::select(&s, Side::Two, WorldTag::MythicCourt),
            CombatStyle::Basic
        );
    }

    #[test]
    fn fallback_is_aggressive() {
        let s = state();
        assert_eq!(
            CombatStyle::select(&s, Side::One, WorldTag::MythicCourt),
            CombatStyle::Aggressive
        );
    }
}
