//! Cloneable façade for one fight's worker.
//!
//! [`FightHandle`] hides the channel plumbing: commands travel over mpsc
//! with oneshot replies, and subscriptions hand back a broadcast receiver
//! paired with the snapshot taken at the same instant.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::api::errors::{BetError, Result, RuntimeError};
use crate::betting::Wager;
use crate::events::FightEnvelope;
use crate::fight::{FightId, FightPhase, LiveFight, UserId};
use crate::worker::Command;

/// Client-facing handle to one live fight.
#[derive(Clone)]
pub struct FightHandle {
    fight_id: FightId,
    command_tx: mpsc::Sender<Command>,
}

impl FightHandle {
    pub(crate) fn new(fight_id: FightId, command_tx: mpsc::Sender<Command>) -> Self {
        Self {
            fight_id,
            command_tx,
        }
    }

    pub fn fight_id(&self) -> FightId {
        self.fight_id
    }

    /// Signals the worker to begin the countdown.
    ///
    /// Honored only for the fight's operator and only from `upcoming`.
    pub async fn start(&self, by: UserId) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Start { by, reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?
    }

    /// Joins as a spectator: returns the current snapshot and a receiver
    /// that picks up exactly where the snapshot leaves off.
    pub async fn join(&self) -> Result<(LiveFight, broadcast::Receiver<FightEnvelope>)> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Join { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Drops out of the spectator count. Disconnects never affect the
    /// simulation.
    pub async fn leave(&self) -> Result<()> {
        self.send(Command::Leave).await
    }

    /// Spectator reaction; accepted in any phase, no simulation effect.
    pub async fn react(&self, user: UserId, reaction: impl Into<String>) -> Result<()> {
        self.send(Command::Reaction {
            user,
            reaction: reaction.into(),
        })
        .await
    }

    /// Read-only snapshot for the synchronous query surface.
    pub async fn snapshot(&self) -> Result<LiveFight> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Final phase re-check and bookkeeping for an admitted wager. Only the
    /// bet admission gate calls this.
    pub(crate) async fn apply_bet(&self, wager: Wager) -> std::result::Result<(), BetError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let closed = BetError::PhaseClosed {
            phase: FightPhase::Completed,
        };
        self.command_tx
            .send(Command::ApplyBet {
                wager,
                reply: reply_tx,
            })
            .await
            .map_err(|_| closed.clone())?;
        reply_rx.await.map_err(|_| closed)?
    }

    async fn send(&self, cmd: Command) -> Result<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
