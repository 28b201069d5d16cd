//! Wire-level event contract of the live event channel.
//!
//! Every message is a tagged `{type, data}` union wrapped in an envelope
//! carrying the fight id and a timestamp. Delivery is causally ordered per
//! fight; no ordering is guaranteed (or required) across fights.

use chrono::{DateTime, Utc};
use combat_core::{CombatAction, FighterId, FighterProfile};
use serde::{Deserialize, Serialize};

use crate::fight::{FightId, LiveFight};

/// Aggregate figures attached to the one-shot settlement event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FightStats {
    /// Rounds fully executed.
    pub rounds: u32,
    /// Actions in the final log.
    pub actions: u32,
    /// Remaining health per side at the final bell.
    pub final_health: [u32; 2],
    pub bet_total: u64,
}

/// Server-to-client events broadcast over a fight's channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum FightEvent {
    /// Full snapshot; also the first message every subscriber receives.
    StateUpdate(Box<LiveFight>),
    /// One appended combat action.
    Action(CombatAction),
    /// Approximate spectator count, advisory only.
    SpectatorUpdate { count: u32 },
    /// New aggregate bet total after an admitted wager.
    BetUpdate { total: u64 },
    FightCountdown { seconds_remaining: u32 },
    FightStarted,
    FightComplete { winner: Option<FighterProfile> },
    /// Settlement signal for downstream consumers (ledgers, leaderboards,
    /// notifications). Delivered at most once per fight.
    FightCompleteWithStats {
        winner: Option<FighterProfile>,
        stats: FightStats,
    },
    /// The fight's simulation violated an invariant and was abandoned.
    FightFailed { reason: String },
}

/// Broadcast envelope: one event, stamped and scoped to a fight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FightEnvelope {
    pub fight_id: FightId,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: FightEvent,
}

impl FightEnvelope {
    pub fn now(fight_id: FightId, event: FightEvent) -> Self {
        Self {
            fight_id,
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Client-to-server intents carried back over the channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientIntent {
    /// Wager on a fighter; only meaningful pre-live and re-validated by the
    /// bet admission gate.
    PlaceBet { fighter_id: FighterId, amount: u64 },
    /// Spectator color; accepted in any phase, never touches the simulation.
    Reaction { reaction: String },
    /// Begin the countdown; honored only for the fight's operator while the
    /// fight is still upcoming.
    StartFight,
}
