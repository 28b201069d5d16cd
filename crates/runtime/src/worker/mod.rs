//! Per-fight background task that owns the authoritative simulation.
//!
//! Exactly one [`FightWorker`] exists per live fight id. It is the sole
//! caller of mutating engine methods; every other component sees read-only
//! projections. Commands arrive over an mpsc channel from [`FightHandle`]s,
//! the round loop runs on a ticker, and everything observable leaves through
//! one broadcast channel, so each subscriber sees events in the exact order
//! the worker produced them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, trace, warn};

use combat_core::{CombatEngine, Side};

use crate::api::errors::{BetError, Result, RuntimeError};
use crate::betting::Wager;
use crate::config::CoordinatorConfig;
use crate::events::{FightEnvelope, FightEvent, FightStats};
use crate::fight::{FightId, FightPhase, LiveFight, UserId};
use crate::services::{BetOutcome, LedgerService, NotificationService};

/// Commands accepted by a fight worker.
pub(crate) enum Command {
    /// Begin the countdown. Honored only for the operator, only from
    /// `upcoming`.
    Start {
        by: UserId,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Subscribe: the snapshot and the receiver are produced atomically, so
    /// the subscriber misses nothing that follows its snapshot.
    Join {
        reply: oneshot::Sender<(LiveFight, broadcast::Receiver<FightEnvelope>)>,
    },
    Leave,
    /// Spectator reaction; never touches the simulation.
    Reaction { user: UserId, reaction: String },
    /// Final phase re-check and bookkeeping for an admitted wager.
    ApplyBet {
        wager: Wager,
        reply: oneshot::Sender<std::result::Result<(), BetError>>,
    },
    Snapshot { reply: oneshot::Sender<LiveFight> },
}

/// Background task driving one fight from countdown to settlement.
pub(crate) struct FightWorker {
    fight_id: FightId,
    engine: CombatEngine,
    phase: FightPhase,
    operator: UserId,
    spectators: u32,
    bet_total: u64,
    wagers: Vec<Wager>,
    countdown_remaining: u32,
    ticks_until_round: u32,
    started_at: Option<DateTime<Utc>>,
    stats_emitted: bool,
    command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<FightEnvelope>,
    config: CoordinatorConfig,
    ledger: Arc<dyn LedgerService>,
    notifier: Arc<dyn NotificationService>,
}

impl FightWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        fight_id: FightId,
        engine: CombatEngine,
        operator: UserId,
        command_rx: mpsc::Receiver<Command>,
        event_tx: broadcast::Sender<FightEnvelope>,
        config: CoordinatorConfig,
        ledger: Arc<dyn LedgerService>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        let ticks_until_round = config.round_every_ticks;
        Self {
            fight_id,
            engine,
            phase: FightPhase::Upcoming,
            operator,
            spectators: 0,
            bet_total: 0,
            wagers: Vec::new(),
            countdown_remaining: 0,
            ticks_until_round,
            started_at: None,
            stats_emitted: false,
            command_rx,
            event_tx,
            config,
            ledger,
            notifier,
        }
    }

    /// Main worker loop. Exits when every handle to this fight is dropped.
    pub(crate) async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = ticker.tick(),
                    if matches!(self.phase, FightPhase::Countdown | FightPhase::Live) =>
                {
                    self.on_tick().await;
                }
            }
        }

        debug!(target: "runtime::worker", fight_id = %self.fight_id, "fight worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { by, reply } => {
                let result = self.start(by);
                let _ = reply.send(result);
            }
            Command::Join { reply } => {
                self.spectators += 1;
                // Subscribe before replying: the snapshot plus this receiver
                // reconstruct the fight with no gap and no replay.
                let rx = self.event_tx.subscribe();
                let _ = reply.send((self.live_fight(), rx));
                let count = self.spectators;
                self.broadcast(FightEvent::SpectatorUpdate { count });
            }
            Command::Leave => {
                self.spectators = self.spectators.saturating_sub(1);
                let count = self.spectators;
                self.broadcast(FightEvent::SpectatorUpdate { count });
            }
            Command::Reaction { user, reaction } => {
                debug!(
                    target: "runtime::worker",
                    fight_id = %self.fight_id,
                    %user,
                    reaction,
                    "spectator reaction"
                );
            }
            Command::ApplyBet { wager, reply } => {
                let result = self.apply_bet(wager);
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.live_fight());
            }
        }
    }

    fn start(&mut self, by: UserId) -> Result<()> {
        if by != self.operator {
            return Err(RuntimeError::NotOperator);
        }
        if self.phase != FightPhase::Upcoming {
            return Err(RuntimeError::AlreadyStarted { phase: self.phase });
        }

        info!(target: "runtime::worker", fight_id = %self.fight_id, "countdown started");
        self.phase = FightPhase::Countdown;
        self.countdown_remaining = self.config.countdown_ticks;
        if self.countdown_remaining == 0 {
            self.begin_fight();
        } else {
            let seconds_remaining = self.countdown_remaining;
            self.broadcast(FightEvent::FightCountdown { seconds_remaining });
        }
        Ok(())
    }

    async fn on_tick(&mut self) {
        match self.phase {
            FightPhase::Countdown => {
                self.countdown_remaining = self.countdown_remaining.saturating_sub(1);
                let seconds_remaining = self.countdown_remaining;
                self.broadcast(FightEvent::FightCountdown { seconds_remaining });
                if self.countdown_remaining == 0 {
                    self.begin_fight();
                }
            }
            FightPhase::Live => {
                self.ticks_until_round = self.ticks_until_round.saturating_sub(1);
                if self.ticks_until_round == 0 {
                    self.ticks_until_round = self.config.round_every_ticks;
                    self.advance_round().await;
                }
            }
            _ => {}
        }
    }

    fn begin_fight(&mut self) {
        self.phase = FightPhase::Live;
        self.started_at = Some(Utc::now());
        self.ticks_until_round = self.config.round_every_ticks;
        info!(target: "runtime::worker", fight_id = %self.fight_id, "fight started");
        self.broadcast(FightEvent::FightStarted);
    }

    /// Executes one round and publishes its actions plus a fresh snapshot.
    ///
    /// An engine error here is a programmer error (the worker is the only
    /// caller and guards completion); it fails this fight, not the process.
    async fn advance_round(&mut self) {
        match self.engine.execute_round() {
            Ok(report) => {
                for action in report.actions {
                    self.broadcast(FightEvent::Action(action));
                }
                self.broadcast(FightEvent::StateUpdate(Box::new(self.live_fight())));
                if self.engine.is_complete() {
                    self.complete().await;
                }
            }
            Err(violation) => {
                error!(
                    target: "runtime::worker",
                    fight_id = %self.fight_id,
                    %violation,
                    "simulation invariant violated; abandoning fight"
                );
                self.phase = FightPhase::Failed;
                self.broadcast(FightEvent::FightFailed {
                    reason: violation.to_string(),
                });
            }
        }
    }

    async fn complete(&mut self) {
        self.phase = FightPhase::Completed;
        let winner = self.engine.winner_profile().cloned();
        info!(
            target: "runtime::worker",
            fight_id = %self.fight_id,
            winner = winner.as_ref().map(|w| w.name.as_str()),
            rounds = self.engine.state().round.saturating_sub(1),
            "fight completed"
        );

        self.broadcast(FightEvent::FightComplete {
            winner: winner.clone(),
        });

        self.settle(winner.as_ref().map(|w| w.id)).await;
        self.notifier
            .fight_completed(self.fight_id, winner.as_ref())
            .await;

        // Settlement signal for downstream consumers; at most once per fight.
        if !self.stats_emitted {
            self.stats_emitted = true;
            let stats = self.stats();
            self.broadcast(FightEvent::FightCompleteWithStats { winner, stats });
        }
    }

    /// Resolves every admitted wager through the ledger. Draws refund the
    /// stake. Ledger or notification hiccups are logged and never touch the
    /// simulation.
    async fn settle(&mut self, winner_id: Option<combat_core::FighterId>) {
        let wagers = std::mem::take(&mut self.wagers);
        for wager in &wagers {
            let outcome = match winner_id {
                None => BetOutcome::Refunded,
                Some(id) if id == wager.fighter_id => BetOutcome::Won,
                Some(_) => BetOutcome::Lost,
            };
            if let Err(error) = self.ledger.resolve_bet(wager.bet_id, outcome).await {
                warn!(
                    target: "runtime::worker",
                    bet_id = %wager.bet_id,
                    %error,
                    "bet resolution did not reach the ledger"
                );
            }
            let payout = match outcome {
                BetOutcome::Won => wager.potential_payout,
                BetOutcome::Refunded => wager.amount,
                BetOutcome::Lost => 0,
            };
            if payout > 0 {
                if let Err(error) = self.ledger.credit(wager.user_id, payout).await {
                    warn!(
                        target: "runtime::worker",
                        bet_id = %wager.bet_id,
                        payout,
                        %error,
                        "payout credit did not reach the ledger"
                    );
                }
            }
            self.notifier.bet_resolved(wager, outcome).await;
        }
    }

    fn apply_bet(&mut self, wager: Wager) -> std::result::Result<(), BetError> {
        if !self.phase.accepts_bets() {
            return Err(BetError::PhaseClosed { phase: self.phase });
        }
        self.bet_total += wager.amount;
        self.wagers.push(wager);
        let total = self.bet_total;
        self.broadcast(FightEvent::BetUpdate { total });
        Ok(())
    }

    fn stats(&self) -> FightStats {
        FightStats {
            rounds: self.engine.state().round.saturating_sub(1),
            actions: self.engine.log().len() as u32,
            final_health: [
                self.engine.state().meter(Side::One).health,
                self.engine.state().meter(Side::Two).health,
            ],
            bet_total: self.bet_total,
        }
    }

    fn live_fight(&self) -> LiveFight {
        LiveFight {
            id: self.fight_id,
            fighters: [
                self.engine.profile(Side::One).clone(),
                self.engine.profile(Side::Two).clone(),
            ],
            phase: self.phase,
            spectators: self.spectators,
            bet_total: self.bet_total,
            winner: if self.phase == FightPhase::Completed {
                self.engine.winner_profile().cloned()
            } else {
                None
            },
            state: self.engine.state().clone(),
            log: self.engine.log().to_vec(),
            started_at: self.started_at,
        }
    }

    fn broadcast(&self, event: FightEvent) {
        if self
            .event_tx
            .send(FightEnvelope::now(self.fight_id, event))
            .is_err()
        {
            // No subscribers right now; events are fan-out only.
            trace!(target: "runtime::worker", fight_id = %self.fight_id, "no subscribers");
        }
    }
}
