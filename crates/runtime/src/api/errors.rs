//! Unified error types surfaced by the coordinator API.
//!
//! Bet validation failures get their own taxonomy so callers can show a
//! specific rejection reason; everything else rolls up into
//! [`RuntimeError`]. None of these ever crash a fight worker.

use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::FighterId;

use crate::fight::{FightId, FightPhase};
use crate::services::ServiceError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no fight registered under {0}")]
    UnknownFight(FightId),

    #[error("fight cannot start from the {phase} phase")]
    AlreadyStarted { phase: FightPhase },

    #[error("only the fight operator may start the fight")]
    NotOperator,

    #[error("fight is still {phase}; refusing to archive")]
    StillRunning { phase: FightPhase },

    #[error("fight worker command channel closed")]
    CommandChannelClosed,

    #[error("fight worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("roster lookup failed")]
    Roster(#[source] ServiceError),

    #[error(transparent)]
    Bet(#[from] BetError),
}

/// Typed rejection reasons from the bet admission gate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BetError {
    #[error("bets are closed: fight is {phase}")]
    PhaseClosed { phase: FightPhase },

    #[error("{0} is not part of this fight")]
    InvalidFighter(FighterId),

    #[error("bet amount must be positive")]
    NonPositiveAmount,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("ledger failure: {0}")]
    Ledger(String),
}
