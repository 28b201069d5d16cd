//! Reconnecting event feed for one fight.
//!
//! The feed joins a fight's broadcast stream and forwards envelopes to the
//! consumer. Every (re)connection starts with a fresh snapshot, so the
//! consumer reconstructs state without history replay. Terminal phases are
//! a normal closure and are never retried; connection failures back off
//! with a fixed delay and, once attempts are exhausted, degrade to periodic
//! snapshot polling instead of blocking.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use runtime::{FightEnvelope, FightEvent, FightId, FightRegistry};

/// Reconnect and fallback pacing.
#[derive(Clone, Debug)]
pub struct FeedConfig {
    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,
    /// Attempts before degrading to polling.
    pub max_reconnect_attempts: u32,
    /// Snapshot cadence in the polling fallback.
    pub poll_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(2),
            max_reconnect_attempts: 5,
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// Why the feed stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The fight reached a terminal phase (or was archived); normal closure.
    Terminal,
    /// The consumer dropped its receiver.
    ConsumerGone,
}

enum Pump {
    Terminal,
    ConsumerGone,
    /// Fell behind the broadcast; resync with a fresh snapshot.
    Lagged,
    /// Stream closed without a terminal event; treat as a connection drop.
    Dropped,
}

/// One fight's spectator feed.
pub struct FightFeed {
    registry: Arc<FightRegistry>,
    fight_id: FightId,
    config: FeedConfig,
}

impl FightFeed {
    pub fn new(registry: Arc<FightRegistry>, fight_id: FightId, config: FeedConfig) -> Self {
        Self {
            registry,
            fight_id,
            config,
        }
    }

    /// Runs until the fight is over or the consumer hangs up, forwarding
    /// every envelope to `out` in order.
    pub async fn run(self, out: mpsc::Sender<FightEnvelope>) -> FeedOutcome {
        let mut attempts = 0u32;

        loop {
            let joined = match self.registry.get(self.fight_id).await {
                Ok(handle) => handle.join().await,
                Err(error) => Err(error),
            };

            match joined {
                Ok((snapshot, rx)) => {
                    attempts = 0;
                    let terminal = snapshot.phase.is_terminal();
                    let opening = FightEnvelope::now(
                        self.fight_id,
                        FightEvent::StateUpdate(Box::new(snapshot)),
                    );
                    if out.send(opening).await.is_err() {
                        return FeedOutcome::ConsumerGone;
                    }
                    if terminal {
                        return FeedOutcome::Terminal;
                    }
                    match self.pump(rx, &out).await {
                        Pump::Terminal => return FeedOutcome::Terminal,
                        Pump::ConsumerGone => return FeedOutcome::ConsumerGone,
                        Pump::Lagged => continue,
                        Pump::Dropped => {}
                    }
                }
                Err(error) => {
                    debug!(
                        target: "live_client::feed",
                        fight_id = %self.fight_id,
                        %error,
                        "live subscription unavailable"
                    );
                }
            }

            attempts += 1;
            if attempts > self.config.max_reconnect_attempts {
                warn!(
                    target: "live_client::feed",
                    fight_id = %self.fight_id,
                    attempts,
                    "reconnect attempts exhausted; degrading to snapshot polling"
                );
                return self.poll(&out).await;
            }
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    /// Forwards live events until the stream ends one way or another.
    async fn pump(
        &self,
        mut rx: broadcast::Receiver<FightEnvelope>,
        out: &mpsc::Sender<FightEnvelope>,
    ) -> Pump {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    let terminal = matches!(
                        envelope.event,
                        FightEvent::FightCompleteWithStats { .. } | FightEvent::FightFailed { .. }
                    );
                    if out.send(envelope).await.is_err() {
                        return Pump::ConsumerGone;
                    }
                    if terminal {
                        return Pump::Terminal;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        target: "live_client::feed",
                        fight_id = %self.fight_id,
                        skipped,
                        "fell behind the live stream; resyncing from snapshot"
                    );
                    return Pump::Lagged;
                }
                Err(broadcast::error::RecvError::Closed) => return Pump::Dropped,
            }
        }
    }

    /// Best-effort non-live view: periodic snapshots until the fight is
    /// terminal or gone.
    async fn poll(&self, out: &mpsc::Sender<FightEnvelope>) -> FeedOutcome {
        loop {
            match self.registry.get_fight(self.fight_id).await {
                Ok(snapshot) => {
                    let terminal = snapshot.phase.is_terminal();
                    let envelope = FightEnvelope::now(
                        self.fight_id,
                        FightEvent::StateUpdate(Box::new(snapshot)),
                    );
                    if out.send(envelope).await.is_err() {
                        return FeedOutcome::ConsumerGone;
                    }
                    if terminal {
                        return FeedOutcome::Terminal;
                    }
                }
                // Archived or never existed: nothing more will arrive.
                Err(_) => return FeedOutcome::Terminal,
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
