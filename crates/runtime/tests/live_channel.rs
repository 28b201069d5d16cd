//! Live event channel fan-out: many subscribers, one writer, one order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};
use uuid::Uuid;

use combat_core::{CombatAction, FighterId, FighterProfile, WorldTag};
use runtime::{
    CoordinatorConfig, FightEnvelope, FightEvent, FightHandle, FightRegistry, InMemoryLedger,
    InMemoryRoster, NullNotifier, StatOdds,
};

const ASHA: FighterId = FighterId(1);
const BRICK: FighterId = FighterId(2);

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn roster() -> Arc<InMemoryRoster> {
    Arc::new(InMemoryRoster::new([
        FighterProfile::new(
            ASHA,
            "Asha",
            WorldTag::MythicCourt,
            80,
            40,
            60,
            100,
            "Crown Splitter",
        ),
        FighterProfile::new(
            BRICK,
            "Brick",
            WorldTag::Outlands,
            60,
            50,
            40,
            100,
            "Scrap Hammer",
        ),
    ]))
}

fn registry() -> Arc<FightRegistry> {
    init_tracing();
    Arc::new(FightRegistry::new(
        roster(),
        InMemoryLedger::new(),
        Arc::new(NullNotifier),
        Arc::new(StatOdds),
        CoordinatorConfig::fast(),
    ))
}

async fn next_event(rx: &mut broadcast::Receiver<FightEnvelope>) -> FightEvent {
    timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("event within deadline")
        .expect("stream open")
        .event
}

/// Joins a fight and reconstructs its full action log: the snapshot's log
/// plus every action event that follows it, up to the terminal event.
async fn follow_actions(handle: FightHandle) -> Vec<CombatAction> {
    let (snapshot, mut rx) = handle.join().await.expect("join");
    let mut log = snapshot.log;
    if snapshot.phase.is_terminal() {
        return log;
    }
    loop {
        match timeout(Duration::from_secs(10), rx.recv()).await {
            Ok(Ok(envelope)) => match envelope.event {
                FightEvent::Action(action) => log.push(action),
                FightEvent::FightCompleteWithStats { .. } => return log,
                FightEvent::FightFailed { reason } => panic!("fight failed: {reason}"),
                _ => {}
            },
            Ok(Err(broadcast::error::RecvError::Closed)) => return log,
            Ok(Err(error)) => panic!("subscriber fell behind: {error}"),
            Err(_) => panic!("stream stalled before the terminal event"),
        }
    }
}

#[tokio::test]
async fn every_spectator_reconstructs_the_same_action_log() {
    let registry = registry();
    let operator = Uuid::new_v4();
    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, operator, 11)
        .await
        .expect("schedule fight");

    let mut followers = Vec::new();
    for _ in 0..30 {
        followers.push(tokio::spawn(follow_actions(handle.clone())));
    }

    handle.start(operator).await.expect("start");

    // Stagger the rest through the live phase; some will land mid-fight and
    // some after the final bell.
    for _ in 0..20 {
        sleep(Duration::from_millis(3)).await;
        followers.push(tokio::spawn(follow_actions(handle.clone())));
    }

    let mut logs = Vec::new();
    for follower in followers {
        logs.push(follower.await.expect("follower task"));
    }

    let reference = &logs[0];
    assert!(!reference.is_empty());
    for log in &logs {
        assert_eq!(log, reference, "all spectators derive one canonical log");
    }

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(&snapshot.log, reference);
}

#[tokio::test]
async fn join_snapshot_and_stream_have_no_gap_or_overlap() {
    let registry = registry();
    let operator = Uuid::new_v4();
    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, operator, 13)
        .await
        .expect("schedule fight");

    handle.start(operator).await.expect("start");
    sleep(Duration::from_millis(8)).await;

    let (snapshot, mut rx) = handle.join().await.expect("join");
    if snapshot.phase.is_terminal() {
        return;
    }

    // Actions received after the snapshot must be exactly the suffix the
    // next full state update appends to the snapshot's log.
    let mut incremental = snapshot.log.clone();
    loop {
        match next_event(&mut rx).await {
            FightEvent::Action(action) => incremental.push(action),
            FightEvent::StateUpdate(fight) => {
                assert_eq!(fight.log, incremental);
                break;
            }
            FightEvent::FightFailed { reason } => panic!("fight failed: {reason}"),
            _ => {}
        }
    }
}

#[tokio::test]
async fn spectator_counts_track_joins_and_leaves() {
    let registry = registry();
    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, Uuid::new_v4(), 17)
        .await
        .expect("schedule fight");

    let (first, mut rx) = handle.join().await.expect("first join");
    assert_eq!(first.spectators, 1);

    let (second, _rx2) = handle.join().await.expect("second join");
    assert_eq!(second.spectators, 2);

    handle.leave().await.expect("leave");

    let mut counts = Vec::new();
    while counts.len() < 3 {
        if let FightEvent::SpectatorUpdate { count } = next_event(&mut rx).await {
            counts.push(count);
        }
    }
    assert_eq!(counts, vec![1, 2, 1]);
}

#[tokio::test]
async fn envelopes_round_trip_through_json() {
    let registry = registry();
    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, Uuid::new_v4(), 19)
        .await
        .expect("schedule fight");

    let (snapshot, _rx) = handle.join().await.expect("join");
    let envelope = FightEnvelope::now(
        handle.fight_id(),
        FightEvent::StateUpdate(Box::new(snapshot)),
    );

    let wire = serde_json::to_string(&envelope).expect("serialize");
    let parsed: FightEnvelope = serde_json::from_str(&wire).expect("deserialize");
    assert_eq!(parsed, envelope);
}
