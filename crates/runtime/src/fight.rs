//! Coordinator-facing projection of a live fight.
//!
//! [`LiveFight`] is the read-only snapshot handed to connecting clients and
//! to the synchronous query surface. Phase transitions are strictly forward;
//! only the fight's worker ever advances them.

use chrono::{DateTime, Utc};
use combat_core::{CombatAction, CombatState, FighterId, FighterProfile, Side};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type FightId = Uuid;
pub type UserId = Uuid;

/// Lifecycle phase of a fight.
///
/// `upcoming → countdown → live → completed`, with `failed` as the terminal
/// phase for a fight whose simulation violated an invariant. Other fights
/// are unaffected by one fight failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FightPhase {
    Upcoming,
    Countdown,
    Live,
    Completed,
    Failed,
}

impl FightPhase {
    /// Bets are admitted pre-fight only.
    pub fn accepts_bets(self) -> bool {
        matches!(self, FightPhase::Upcoming | FightPhase::Countdown)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FightPhase::Completed | FightPhase::Failed)
    }
}

/// Read-only snapshot of one fight as the coordinator sees it.
///
/// Sent whole on connect so late joiners reconstruct state without history
/// replay; thereafter clients apply incremental events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiveFight {
    pub id: FightId,
    pub fighters: [FighterProfile; 2],
    pub phase: FightPhase,
    /// Approximate; never used for correctness-relevant decisions.
    pub spectators: u32,
    pub bet_total: u64,
    pub winner: Option<FighterProfile>,
    pub state: CombatState,
    /// Ordered, append-only action log so far.
    pub log: Vec<CombatAction>,
    pub started_at: Option<DateTime<Utc>>,
}

impl LiveFight {
    /// Which side a fighter id occupies, if it belongs to this fight.
    pub fn fighter_side(&self, id: FighterId) -> Option<Side> {
        if self.fighters[Side::One.index()].id == id {
            Some(Side::One)
        } else if self.fighters[Side::Two.index()].id == id {
            Some(Side::Two)
        } else {
            None
        }
    }
}
