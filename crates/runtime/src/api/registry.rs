//! Registry of live fights, keyed by fight id.
//!
//! One worker per fight, created on schedule and archived once terminal;
//! an explicit registry with a controlled lifecycle rather than ambient
//! global state. The registry also routes client intents and fronts the bet
//! admission gate.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::info;
use uuid::Uuid;

use combat_core::{CombatEngine, FighterId};

use crate::api::errors::{Result, RuntimeError};
use crate::api::handle::FightHandle;
use crate::betting::{BetAdmissionGate, OddsProvider, Wager};
use crate::config::CoordinatorConfig;
use crate::events::ClientIntent;
use crate::fight::{FightId, LiveFight, UserId};
use crate::services::{LedgerService, NotificationService, RosterService};
use crate::worker::FightWorker;

/// Owns every live fight worker and the collaborator services.
pub struct FightRegistry {
    fights: RwLock<HashMap<FightId, FightHandle>>,
    roster: Arc<dyn RosterService>,
    ledger: Arc<dyn LedgerService>,
    notifier: Arc<dyn NotificationService>,
    gate: BetAdmissionGate,
    config: CoordinatorConfig,
}

impl FightRegistry {
    pub fn new(
        roster: Arc<dyn RosterService>,
        ledger: Arc<dyn LedgerService>,
        notifier: Arc<dyn NotificationService>,
        odds: Arc<dyn OddsProvider>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            fights: RwLock::new(HashMap::new()),
            roster,
            ledger: ledger.clone(),
            notifier,
            gate: BetAdmissionGate::new(ledger, odds),
            config,
        }
    }

    /// Schedules a fight between two roster fighters with a random seed.
    pub async fn create_fight(
        &self,
        one: FighterId,
        two: FighterId,
        operator: UserId,
    ) -> Result<FightHandle> {
        self.create_fight_with_seed(one, two, operator, rand::random())
            .await
    }

    /// Schedules a fight with an explicit simulation seed (reproducible).
    pub async fn create_fight_with_seed(
        &self,
        one: FighterId,
        two: FighterId,
        operator: UserId,
        seed: u64,
    ) -> Result<FightHandle> {
        let first = self
            .roster
            .get_fighter(one)
            .await
            .map_err(RuntimeError::Roster)?;
        let second = self
            .roster
            .get_fighter(two)
            .await
            .map_err(RuntimeError::Roster)?;

        let fight_id = Uuid::new_v4();
        let engine = CombatEngine::from_seed(first, second, seed);

        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);
        let (event_tx, _) = broadcast::channel(self.config.event_buffer_size);

        let worker = FightWorker::new(
            fight_id,
            engine,
            operator,
            command_rx,
            event_tx,
            self.config.clone(),
            self.ledger.clone(),
            self.notifier.clone(),
        );
        tokio::spawn(worker.run());

        let handle = FightHandle::new(fight_id, command_tx);
        self.fights.write().await.insert(fight_id, handle.clone());
        info!(target: "runtime::registry", %fight_id, seed, "fight scheduled");
        Ok(handle)
    }

    pub async fn get(&self, fight_id: FightId) -> Result<FightHandle> {
        self.fights
            .read()
            .await
            .get(&fight_id)
            .cloned()
            .ok_or(RuntimeError::UnknownFight(fight_id))
    }

    /// Synchronous query surface for non-real-time consumers.
    pub async fn get_fight(&self, fight_id: FightId) -> Result<LiveFight> {
        self.get(fight_id).await?.snapshot().await
    }

    /// Places a wager through the admission gate.
    pub async fn place_bet(
        &self,
        fight_id: FightId,
        user_id: UserId,
        fighter_id: FighterId,
        amount: u64,
    ) -> Result<Wager> {
        let handle = self.get(fight_id).await?;
        let wager = self.gate.place(&handle, user_id, fighter_id, amount).await?;
        Ok(wager)
    }

    /// Routes a client-to-server intent to the right operation.
    pub async fn handle_intent(
        &self,
        fight_id: FightId,
        user_id: UserId,
        intent: ClientIntent,
    ) -> Result<()> {
        match intent {
            ClientIntent::PlaceBet { fighter_id, amount } => {
                self.place_bet(fight_id, user_id, fighter_id, amount)
                    .await?;
                Ok(())
            }
            ClientIntent::Reaction { reaction } => {
                self.get(fight_id).await?.react(user_id, reaction).await
            }
            ClientIntent::StartFight => self.get(fight_id).await?.start(user_id).await,
        }
    }

    /// Archives a terminal fight, dropping the registry's handle so the
    /// worker can wind down once its remaining subscribers drain.
    pub async fn remove_completed(&self, fight_id: FightId) -> Result<()> {
        let handle = self.get(fight_id).await?;
        let snapshot = handle.snapshot().await?;
        if !snapshot.phase.is_terminal() {
            return Err(RuntimeError::StillRunning {
                phase: snapshot.phase,
            });
        }
        self.fights.write().await.remove(&fight_id);
        info!(target: "runtime::registry", %fight_id, "fight archived");
        Ok(())
    }
}
