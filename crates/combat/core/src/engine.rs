//! Round resolution pipeline.
//!
//! The [`CombatEngine`] is the authoritative reducer for [`CombatState`].
//! Given two fighter profiles it simulates a fight to completion, one round
//! per [`CombatEngine::execute_round`] call, producing an append-only action
//! log and read-only state snapshots. The engine performs no I/O and draws
//! all randomness from its injected RNG, so a fight replays exactly from its
//! seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::action::{ActionKind, CombatAction};
use crate::config::CombatConfig;
use crate::effect::{EffectId, EffectKind, StatusEffect};
use crate::fighter::{FighterProfile, Side};
use crate::state::{CombatState, EnvironmentModifier};
use crate::style::CombatStyle;

/// Errors surfaced by the engine.
///
/// The engine itself cannot fail mid-round; the only error is driving it
/// past completion, which is a caller bug the coordinator guards against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("execute_round called on a completed fight")]
    FightComplete,
}

/// Everything that happened in one executed round.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundReport {
    /// Round number this report covers.
    pub round: u32,
    /// Actions appended to the log this round, in execution order (0-2).
    pub actions: Vec<CombatAction>,
}

/// Single-fight state machine that owns all mutation of its [`CombatState`].
pub struct CombatEngine<R: Rng = ChaCha8Rng> {
    profiles: [FighterProfile; 2],
    state: CombatState,
    log: Vec<CombatAction>,
    config: CombatConfig,
    rng: R,
    next_effect_id: u32,
}

impl CombatEngine<ChaCha8Rng> {
    /// Creates an engine with a reproducible ChaCha8 stream for `seed`.
    pub fn from_seed(one: FighterProfile, two: FighterProfile, seed: u64) -> Self {
        Self::with_rng(one, two, CombatConfig::default(), ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> CombatEngine<R> {
    /// Creates an engine with an explicit RNG and rule configuration.
    ///
    /// Both sides start at full health and energy, round 1, zero momentum.
    /// If the fighters share a world tag an environment modifier is attached
    /// (currently a no-op hook reserved for symmetric bonuses).
    pub fn with_rng(one: FighterProfile, two: FighterProfile, config: CombatConfig, rng: R) -> Self {
        let environment = if one.world == two.world {
            Some(EnvironmentModifier::for_world(one.world))
        } else {
            None
        };
        let state = CombatState::new([one.max_health, two.max_health], environment);
        Self {
            profiles: [one, two],
            state,
            log: Vec::new(),
            config,
            rng,
            next_effect_id: 0,
        }
    }

    pub fn profile(&self, side: Side) -> &FighterProfile {
        &self.profiles[side.index()]
    }

    /// Read-only view of the current combat state.
    pub fn state(&self) -> &CombatState {
        &self.state
    }

    /// The append-only action log. Earlier entries are never rewritten.
    pub fn log(&self) -> &[CombatAction] {
        &self.log
    }

    pub fn is_knockout(&self) -> bool {
        Side::both().iter().any(|&s| self.state.meter(s).is_down())
    }

    pub fn is_complete(&self) -> bool {
        self.is_knockout() || self.state.round > self.config.round_cap
    }

    /// The winning side, or `None` while the fight is running or on a draw.
    ///
    /// Round-cap ties resolve to the side with the higher remaining health
    /// percentage; an exact percentage tie is a draw.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_complete() {
            return None;
        }
        let down = [
            self.state.meter(Side::One).is_down(),
            self.state.meter(Side::Two).is_down(),
        ];
        match down {
            [true, true] => None,
            [true, false] => Some(Side::Two),
            [false, true] => Some(Side::One),
            [false, false] => {
                let one = self.state.meter(Side::One).health_pct();
                let two = self.state.meter(Side::Two).health_pct();
                if one > two {
                    Some(Side::One)
                } else if two > one {
                    Some(Side::Two)
                } else {
                    None
                }
            }
        }
    }

    /// Profile of the winner, if the fight has resolved with one.
    pub fn winner_profile(&self) -> Option<&FighterProfile> {
        self.winner().map(|s| self.profile(s))
    }

    /// Executes one full round: turn ordering, up to one action per side,
    /// then end-of-round upkeep.
    ///
    /// Calling this on a completed fight is a caller error.
    pub fn execute_round(&mut self) -> Result<RoundReport, EngineError> {
        if self.is_complete() {
            return Err(EngineError::FightComplete);
        }

        let round = self.state.round;
        let log_start = self.log.len();

        for side in self.turn_order() {
            if self.state.meter(side).is_down() {
                continue;
            }
            if self.state.is_stunned(side) {
                continue;
            }

            let action = self.take_turn(side);
            self.log.push(action);

            // A side reduced to zero health halts the round immediately.
            if self.state.meter(side.opponent()).is_down() {
                break;
            }
        }

        self.upkeep(log_start);

        Ok(RoundReport {
            round,
            actions: self.log[log_start..].to_vec(),
        })
    }

    /// Turn order by effective speed; ties default to side 1.
    ///
    /// Effective speed is base speed reduced 20% per active debuff on that
    /// side.
    fn turn_order(&self) -> [Side; 2] {
        if self.effective_speed(Side::Two) > self.effective_speed(Side::One) {
            [Side::Two, Side::One]
        } else {
            [Side::One, Side::Two]
        }
    }

    fn effective_speed(&self, side: Side) -> f64 {
        let penalty =
            CombatConfig::DEBUFF_SPEED_PENALTY * self.state.debuff_count(side) as f64;
        (self.profile(side).speed as f64 * (1.0 - penalty)).max(0.0)
    }

    // ========================================================================
    // Action generation
    // ========================================================================

    fn take_turn(&mut self, side: Side) -> CombatAction {
        let style = CombatStyle::select(&self.state, side, self.profile(side).world);
        let energy = self.state.meter(side).energy;
        let foe_health_pct = self.state.meter(side.opponent()).health_pct();

        match style {
            CombatStyle::Aggressive => {
                if energy >= CombatConfig::SPECIAL_COST && self.rng.gen::<f64>() < 0.40 {
                    self.special_attack(side)
                } else {
                    self.basic_attack(side)
                }
            }
            CombatStyle::Defensive => {
                if energy < 20 {
                    self.recover(side)
                } else {
                    self.defend(side)
                }
            }
            CombatStyle::Opportunistic => {
                if foe_health_pct < 0.25 && energy >= CombatConfig::SPECIAL_COST {
                    self.special_attack(side)
                } else {
                    self.basic_attack(side)
                }
            }
            CombatStyle::Desperate => {
                if energy >= CombatConfig::ULTIMATE_COST && self.rng.gen::<f64>() < 0.70 {
                    self.ultimate_attack(side)
                } else if energy >= CombatConfig::SPECIAL_COST {
                    self.special_attack(side)
                } else {
                    self.basic_attack(side)
                }
            }
            CombatStyle::Basic => self.basic_attack(side),
        }
    }

    fn basic_attack(&mut self, side: Side) -> CombatAction {
        let attacker = &self.profiles[side.index()];
        let defender = &self.profiles[side.opponent().index()];

        let speed_bonus = self.rng.gen::<f64>() * (attacker.speed as f64 / 100.0);
        let critical = self.rng.gen::<f64>() < 0.20;
        let crit_mult = if critical { 1.5 } else { 1.0 };
        let raw = (attacker.attack as f64 - defender.defense as f64 * 0.5)
            * (1.0 + speed_bonus)
            * crit_mult;

        let text = format!("{} strikes {}", attacker.name, defender.name);
        self.resolve_strike(ActionKind::Attack, side, raw, 0, critical, Vec::new(), text)
    }

    fn special_attack(&mut self, side: Side) -> CombatAction {
        let attacker = &self.profiles[side.index()];
        let defender = &self.profiles[side.opponent().index()];

        let critical = self.rng.gen::<f64>() < 0.30;
        let crit_mult = if critical { 1.3 } else { 1.0 };
        let raw =
            (attacker.attack as f64 * 1.5 - defender.defense as f64 * 0.3) * crit_mult;

        let text = format!("{} unleashes {}", attacker.name, attacker.special_move);
        let effect = StatusEffect::from_special(
            self.allocate_effect_id(),
            self.profile(side).world,
            side.opponent(),
        );
        self.resolve_strike(
            ActionKind::Special,
            side,
            raw,
            CombatConfig::SPECIAL_COST,
            critical,
            vec![effect],
            text,
        )
    }

    fn ultimate_attack(&mut self, side: Side) -> CombatAction {
        let attacker = &self.profiles[side.index()];
        let defender = &self.profiles[side.opponent().index()];

        let critical = self.rng.gen::<f64>() < 0.50;
        let crit_mult = if critical { 1.5 } else { 1.0 };
        let raw =
            (attacker.attack as f64 * 2.5 - defender.defense as f64 * 0.1) * crit_mult;

        let text = format!("{} goes all in against {}", attacker.name, defender.name);
        self.resolve_strike(
            ActionKind::Ultimate,
            side,
            raw,
            CombatConfig::ULTIMATE_COST,
            critical,
            Vec::new(),
            text,
        )
    }

    fn defend(&mut self, side: Side) -> CombatAction {
        let guard = StatusEffect::guard(
            self.allocate_effect_id(),
            side,
            CombatConfig::GUARD_MITIGATION,
        );
        self.state.meter_mut(side).spend_energy(CombatConfig::DEFEND_COST);
        self.state.effects.push(guard.clone());

        let text = format!("{} raises a guard", self.profile(side).name);
        CombatAction::stance(ActionKind::Defend, side, CombatConfig::DEFEND_COST, text)
            .with_effects(vec![guard])
    }

    fn recover(&mut self, side: Side) -> CombatAction {
        self.state
            .meter_mut(side)
            .restore_energy(CombatConfig::RECOVER_GAIN);

        let text = format!("{} catches their breath", self.profile(side).name);
        CombatAction::stance(ActionKind::Recover, side, 0, text)
    }

    // ========================================================================
    // Damage resolution
    // ========================================================================

    /// Applies energy cost, momentum scaling, guard mitigation, and damage,
    /// then attaches any produced effects.
    #[allow(clippy::too_many_arguments)]
    fn resolve_strike(
        &mut self,
        kind: ActionKind,
        side: Side,
        raw_damage: f64,
        energy_cost: u32,
        critical: bool,
        effects: Vec<StatusEffect>,
        text: String,
    ) -> CombatAction {
        self.state.meter_mut(side).spend_energy(energy_cost);

        // Momentum scales damage by up to ±50% in favor of the leading side.
        let momentum_mult = 1.0
            + (self.state.momentum_for(side) as f64 / CombatConfig::MOMENTUM_MAX as f64) * 0.5;
        let mut scaled = raw_damage * momentum_mult;

        // A pending guard on the defender is consumed by this hit.
        let blocked = self.consume_guard(side.opponent());
        if blocked {
            scaled *= (100 - CombatConfig::GUARD_MITIGATION) as f64 / 100.0;
        }

        let damage = scaled.floor().max(1.0) as u32;
        self.state.meter_mut(side.opponent()).apply_damage(damage);
        self.state.effects.extend(effects.iter().cloned());

        CombatAction::strike(kind, side, damage, energy_cost, critical, blocked, text)
            .with_effects(effects)
    }

    /// Removes the defender's oldest guard buff, if any, and reports whether
    /// one was consumed.
    fn consume_guard(&mut self, defender: Side) -> bool {
        if let Some(pos) = self
            .state
            .effects
            .iter()
            .position(|e| e.target == defender && e.is_guard())
        {
            self.state.effects.remove(pos);
            true
        } else {
            false
        }
    }

    // ========================================================================
    // End-of-round upkeep
    // ========================================================================

    /// Ticks damage-over-time effects, expires finished effects, folds this
    /// round's damaging actions into momentum, decays momentum, and advances
    /// the round counter.
    fn upkeep(&mut self, log_start: usize) {
        let ticks: Vec<(Side, u32)> = self
            .state
            .effects
            .iter()
            .filter(|e| e.kind == EffectKind::DamageOverTime)
            .map(|e| (e.target, e.magnitude.max(0) as u32))
            .collect();
        for (target, amount) in ticks {
            self.state.meter_mut(target).apply_damage(amount);
        }

        for effect in &mut self.state.effects {
            effect.remaining = effect.remaining.saturating_sub(1);
        }
        self.state.effects.retain(|e| e.remaining > 0);

        for i in log_start..self.log.len() {
            if self.log[i].is_damaging() {
                let shift = if self.log[i].critical {
                    CombatConfig::MOMENTUM_CRIT
                } else {
                    CombatConfig::MOMENTUM_HIT
                };
                let side = self.log[i].side;
                self.state.push_momentum(side, shift);
            }
        }
        self.state.decay_momentum();

        self.state.round += 1;
    }

    fn allocate_effect_id(&mut self) -> EffectId {
        let id = EffectId(self.next_effect_id);
        self.next_effect_id += 1;
        id
    }
}
