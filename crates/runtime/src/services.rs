//! External collaborator seams.
//!
//! The core never mutates balances or rosters directly; it goes through
//! these narrow traits. In-memory implementations live alongside the traits
//! for tests and local runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use combat_core::{FighterId, FighterProfile};

use crate::betting::{BetId, Wager};
use crate::fight::{FightId, UserId};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} is not in the roster")]
    UnknownFighter(FighterId),

    #[error("insufficient balance for user {user}")]
    InsufficientBalance { user: UserId },

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Supplies fighter profiles, assumed consistent for a fight's duration.
#[async_trait]
pub trait RosterService: Send + Sync {
    async fn get_fighter(&self, id: FighterId) -> Result<FighterProfile, ServiceError>;
}

/// Outcome of a settled wager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetOutcome {
    Won,
    Lost,
    /// Stake returned, e.g. on a draw at the round cap.
    Refunded,
}

/// Owns user balances and the bet ledger. The coordinator only calls these
/// narrow operations and never touches balances itself.
#[async_trait]
pub trait LedgerService: Send + Sync {
    async fn debit(&self, user: UserId, amount: u64) -> Result<(), ServiceError>;
    async fn credit(&self, user: UserId, amount: u64) -> Result<(), ServiceError>;
    async fn record_bet(&self, wager: &Wager) -> Result<(), ServiceError>;
    async fn resolve_bet(&self, bet_id: BetId, outcome: BetOutcome) -> Result<(), ServiceError>;
}

/// Fire-and-forget delivery; failures must never affect the simulation, so
/// these methods cannot fail.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn fight_completed(&self, fight_id: FightId, winner: Option<&FighterProfile>);
    async fn bet_resolved(&self, wager: &Wager, outcome: BetOutcome);
}

// ============================================================================
// In-memory implementations (tests and local runs)
// ============================================================================

/// Fixed roster backed by a map.
#[derive(Default)]
pub struct InMemoryRoster {
    fighters: HashMap<FighterId, FighterProfile>,
}

impl InMemoryRoster {
    pub fn new(fighters: impl IntoIterator<Item = FighterProfile>) -> Self {
        Self {
            fighters: fighters.into_iter().map(|f| (f.id, f)).collect(),
        }
    }
}

#[async_trait]
impl RosterService for InMemoryRoster {
    async fn get_fighter(&self, id: FighterId) -> Result<FighterProfile, ServiceError> {
        self.fighters
            .get(&id)
            .cloned()
            .ok_or(ServiceError::UnknownFighter(id))
    }
}

/// Balance and bet bookkeeping behind a mutex; good enough for tests.
pub struct InMemoryLedger {
    inner: Mutex<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    balances: HashMap<UserId, u64>,
    bets: HashMap<BetId, (Wager, Option<BetOutcome>)>,
}

impl InMemoryLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(LedgerInner::default()),
        })
    }

    pub async fn deposit(&self, user: UserId, amount: u64) {
        let mut inner = self.inner.lock().await;
        *inner.balances.entry(user).or_default() += amount;
    }

    pub async fn balance_of(&self, user: UserId) -> u64 {
        self.inner
            .lock()
            .await
            .balances
            .get(&user)
            .copied()
            .unwrap_or(0)
    }

    pub async fn outcome_of(&self, bet_id: BetId) -> Option<BetOutcome> {
        self.inner
            .lock()
            .await
            .bets
            .get(&bet_id)
            .and_then(|(_, outcome)| *outcome)
    }

    pub async fn recorded_bets(&self) -> usize {
        self.inner.lock().await.bets.len()
    }

    /// Recorded bets that were never resolved one way or the other.
    pub async fn unresolved_bets(&self) -> usize {
        self.inner
            .lock()
            .await
            .bets
            .values()
            .filter(|(_, outcome)| outcome.is_none())
            .count()
    }
}

#[async_trait]
impl LedgerService for InMemoryLedger {
    async fn debit(&self, user: UserId, amount: u64) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        let balance = inner.balances.entry(user).or_default();
        if *balance < amount {
            return Err(ServiceError::InsufficientBalance { user });
        }
        *balance -= amount;
        Ok(())
    }

    async fn credit(&self, user: UserId, amount: u64) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        *inner.balances.entry(user).or_default() += amount;
        Ok(())
    }

    async fn record_bet(&self, wager: &Wager) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        inner.bets.insert(wager.bet_id, (wager.clone(), None));
        Ok(())
    }

    async fn resolve_bet(&self, bet_id: BetId, outcome: BetOutcome) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().await;
        match inner.bets.get_mut(&bet_id) {
            Some((_, slot)) => {
                *slot = Some(outcome);
                Ok(())
            }
            None => Err(ServiceError::Unavailable(format!(
                "bet {bet_id} was never recorded"
            ))),
        }
    }
}

/// Notification sink that only logs. Useful as the default collaborator.
pub struct NullNotifier;

#[async_trait]
impl NotificationService for NullNotifier {
    async fn fight_completed(&self, fight_id: FightId, winner: Option<&FighterProfile>) {
        debug!(
            target: "runtime::notify",
            %fight_id,
            winner = winner.map(|w| w.name.as_str()),
            "fight completed"
        );
    }

    async fn bet_resolved(&self, wager: &Wager, outcome: BetOutcome) {
        debug!(
            target: "runtime::notify",
            bet_id = %wager.bet_id,
            ?outcome,
            "bet resolved"
        );
    }
}
