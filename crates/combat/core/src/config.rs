/// Combat rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatConfig {
    /// Hard cap on simulated rounds. A fight that reaches this cap without a
    /// knockout is resolved by remaining-health percentage (exact tie = draw).
    pub round_cap: u32,
}

impl CombatConfig {
    // ===== fixed rule constants =====
    /// Energy pool ceiling for both sides.
    pub const ENERGY_MAX: u32 = 100;
    /// Momentum is clamped to [-MOMENTUM_MAX, MOMENTUM_MAX]; positive favors side 1.
    pub const MOMENTUM_MAX: i32 = 100;
    /// Momentum shift for a damaging action (non-critical).
    pub const MOMENTUM_HIT: i32 = 10;
    /// Momentum shift for a critical damaging action.
    pub const MOMENTUM_CRIT: i32 = 15;
    /// Effective speed penalty per active debuff on a side (fraction).
    pub const DEBUFF_SPEED_PENALTY: f64 = 0.20;

    // ===== energy costs =====
    pub const SPECIAL_COST: u32 = 30;
    pub const ULTIMATE_COST: u32 = 50;
    pub const DEFEND_COST: u32 = 10;
    pub const RECOVER_GAIN: u32 = 25;

    /// Incoming-damage reduction (percent) granted by a defend stance.
    pub const GUARD_MITIGATION: i32 = 50;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ROUND_CAP: u32 = 20;

    pub fn new() -> Self {
        Self {
            round_cap: Self::DEFAULT_ROUND_CAP,
        }
    }

    pub fn with_round_cap(round_cap: u32) -> Self {
        Self { round_cap }
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
