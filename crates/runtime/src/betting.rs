//! Bet admission: validate, then price, then debit, then record.
//!
//! The gate is the only path by which a wager reaches the ledger. Odds are
//! queried before the wager commits so the payout recorded for it is stable.
//! On any failure after the debit the stake is credited back and an
//! already-recorded bet is resolved as refunded; no lasting state exists in
//! which a bet stands without its debit or vice versa.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use combat_core::{FighterId, Side};

use crate::api::errors::BetError;
use crate::api::handle::FightHandle;
use crate::fight::{FightId, LiveFight, UserId};
use crate::services::{BetOutcome, LedgerService, ServiceError};

pub type BetId = Uuid;

/// An accepted wager with its locked-in price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub bet_id: BetId,
    pub fight_id: FightId,
    pub user_id: UserId,
    pub fighter_id: FighterId,
    pub amount: u64,
    /// Decimal odds quoted at admission time.
    pub odds: f64,
    pub potential_payout: u64,
}

/// Pricing collaborator. Policy is external to this core; the gate only
/// requires that a quote exists before a wager commits.
#[async_trait]
pub trait OddsProvider: Send + Sync {
    async fn quote(&self, fight: &LiveFight, fighter_id: FighterId) -> f64;
}

/// Default pricer: decimal odds from relative stat power with a house
/// margin, clamped to a sane band.
pub struct StatOdds;

impl StatOdds {
    const HOUSE_MARGIN: f64 = 0.95;
    const MIN_ODDS: f64 = 1.01;
    const MAX_ODDS: f64 = 10.0;

    fn power(fight: &LiveFight, side: Side) -> f64 {
        let p = &fight.fighters[side.index()];
        (p.attack * 2 + p.defense + p.speed + p.max_health / 2) as f64
    }
}

#[async_trait]
impl OddsProvider for StatOdds {
    async fn quote(&self, fight: &LiveFight, fighter_id: FighterId) -> f64 {
        let side = match fight.fighter_side(fighter_id) {
            Some(side) => side,
            // The gate rejects foreign fighters before quoting; this is a
            // safe floor for direct callers.
            None => return Self::MIN_ODDS,
        };
        let mine = Self::power(fight, side);
        let theirs = Self::power(fight, side.opponent());
        let win_probability = mine / (mine + theirs);
        (Self::HOUSE_MARGIN / win_probability).clamp(Self::MIN_ODDS, Self::MAX_ODDS)
    }
}

/// Validates wagers against the fight's current phase before any money
/// moves, then delegates ledger mutation to the external service.
pub struct BetAdmissionGate {
    ledger: Arc<dyn LedgerService>,
    odds: Arc<dyn OddsProvider>,
}

impl BetAdmissionGate {
    pub fn new(ledger: Arc<dyn LedgerService>, odds: Arc<dyn OddsProvider>) -> Self {
        Self { ledger, odds }
    }

    /// Admits a wager or rejects it with a typed reason.
    ///
    /// The fight worker re-checks the phase when the wager is applied, so a
    /// window that closes mid-flight still refunds cleanly.
    pub async fn place(
        &self,
        handle: &FightHandle,
        user_id: UserId,
        fighter_id: FighterId,
        amount: u64,
    ) -> Result<Wager, BetError> {
        if amount == 0 {
            return Err(BetError::NonPositiveAmount);
        }

        let snapshot = handle.snapshot().await.map_err(|_| BetError::PhaseClosed {
            phase: crate::fight::FightPhase::Completed,
        })?;
        if snapshot.fighter_side(fighter_id).is_none() {
            return Err(BetError::InvalidFighter(fighter_id));
        }
        if !snapshot.phase.accepts_bets() {
            return Err(BetError::PhaseClosed {
                phase: snapshot.phase,
            });
        }

        // Quote before committing so the recorded payout is stable.
        let odds = self.odds.quote(&snapshot, fighter_id).await;
        let wager = Wager {
            bet_id: Uuid::new_v4(),
            fight_id: snapshot.id,
            user_id,
            fighter_id,
            amount,
            odds,
            potential_payout: (amount as f64 * odds).round() as u64,
        };

        self.ledger
            .debit(user_id, amount)
            .await
            .map_err(|error| match error {
                ServiceError::InsufficientBalance { .. } => BetError::InsufficientBalance,
                other => BetError::Ledger(other.to_string()),
            })?;

        if let Err(error) = self.ledger.record_bet(&wager).await {
            self.refund(user_id, amount).await;
            return Err(BetError::Ledger(error.to_string()));
        }

        match handle.apply_bet(wager.clone()).await {
            Ok(()) => {
                debug!(
                    target: "runtime::gate",
                    bet_id = %wager.bet_id,
                    fight_id = %wager.fight_id,
                    amount,
                    odds,
                    "wager admitted"
                );
                Ok(wager)
            }
            Err(rejection) => {
                // Phase closed between validation and apply: undo both
                // ledger writes, the recorded bet and the debit.
                if let Err(error) = self
                    .ledger
                    .resolve_bet(wager.bet_id, BetOutcome::Refunded)
                    .await
                {
                    warn!(
                        target: "runtime::gate",
                        bet_id = %wager.bet_id,
                        %error,
                        "rejected wager could not be marked refunded"
                    );
                }
                self.refund(user_id, amount).await;
                Err(rejection)
            }
        }
    }

    async fn refund(&self, user_id: UserId, amount: u64) {
        if let Err(error) = self.ledger.credit(user_id, amount).await {
            warn!(
                target: "runtime::gate",
                %user_id,
                amount,
                %error,
                "refund after failed bet admission did not reach the ledger"
            );
        }
    }
}
