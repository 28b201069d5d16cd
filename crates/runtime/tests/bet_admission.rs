//! Bet admission gate rejections and pricing guarantees.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Notify};
use tokio::time::timeout;
use uuid::Uuid;

use combat_core::{FighterId, FighterProfile, WorldTag};
use runtime::{
    BetError, CoordinatorConfig, FightEnvelope, FightEvent, FightPhase, FightRegistry,
    InMemoryLedger, InMemoryRoster, LiveFight, NullNotifier, OddsProvider, RuntimeError, StatOdds,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const ASHA: FighterId = FighterId(1);
const BRICK: FighterId = FighterId(2);

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

fn registry_with(ledger: Arc<InMemoryLedger>, config: CoordinatorConfig) -> Arc<FightRegistry> {
    init_tracing();
    Arc::new(FightRegistry::new(
        roster(),
        ledger,
        Arc::new(NullNotifier),
        Arc::new(StatOdds),
        config,
    ))
}

fn registry(ledger: Arc<InMemoryLedger>) -> Arc<FightRegistry> {
    registry_with(ledger, CoordinatorConfig::fast())
}

async fn next_event(rx: &mut broadcast::Receiver<FightEnvelope>) -> FightEvent {
    timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("event within deadline")
        .expect("stream open")
        .event
}

fn bet_error(result: runtime::Result<runtime::Wager>) -> BetError {
    match result {
        Err(RuntimeError::Bet(error)) => error,
        Err(other) => panic!("expected a bet rejection, got {other}"),
        Ok(wager) => panic!("wager {} should have been rejected", wager.bet_id),
    }
}

#[tokio::test]
async fn zero_amount_wagers_are_rejected() {
    let ledger = InMemoryLedger::new();
    let registry = registry(ledger.clone());
    let bettor = Uuid::new_v4();
    ledger.deposit(bettor, 100).await;

    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, Uuid::new_v4(), 2)
        .await
        .expect("schedule fight");

    let rejection = bet_error(registry.place_bet(handle.fight_id(), bettor, ASHA, 0).await);
    assert_eq!(rejection, BetError::NonPositiveAmount);
    assert_eq!(ledger.balance_of(bettor).await, 100);
}

#[tokio::test]
async fn wagers_on_outside_fighters_are_rejected() {
    let ledger = InMemoryLedger::new();
    let registry = registry(ledger.clone());
    let bettor = Uuid::new_v4();
    ledger.deposit(bettor, 100).await;

    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, Uuid::new_v4(), 2)
        .await
        .expect("schedule fight");

    let rejection = bet_error(
        registry
            .place_bet(handle.fight_id(), bettor, FighterId(42), 50)
            .await,
    );
    assert_eq!(rejection, BetError::InvalidFighter(FighterId(42)));
    assert_eq!(ledger.balance_of(bettor).await, 100);
}

#[tokio::test]
async fn insufficient_balance_leaves_no_bet_behind() {
    let ledger = InMemoryLedger::new();
    let registry = registry(ledger.clone());
    let bettor = Uuid::new_v4();
    ledger.deposit(bettor, 30).await;

    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, Uuid::new_v4(), 2)
        .await
        .expect("schedule fight");

    let rejection = bet_error(
        registry
            .place_bet(handle.fight_id(), bettor, ASHA, 100)
            .await,
    );
    assert_eq!(rejection, BetError::InsufficientBalance);
    assert_eq!(ledger.balance_of(bettor).await, 30);

    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.bet_total, 0);
}

#[tokio::test]
async fn bets_close_once_the_fight_leaves_the_pre_fight_phases() {
    let ledger = InMemoryLedger::new();
    let registry = registry(ledger.clone());
    let operator = Uuid::new_v4();
    let bettor = Uuid::new_v4();
    ledger.deposit(bettor, 10_000).await;

    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, operator, 4)
        .await
        .expect("schedule fight");
    let fight_id = handle.fight_id();

    let (_, mut rx) = handle.join().await.expect("join");
    handle.start(operator).await.expect("start");
    loop {
        if matches!(next_event(&mut rx).await, FightEvent::FightStarted) {
            break;
        }
    }

    // Live: every amount and fighter is refused for the same reason.
    for fighter in [ASHA, BRICK] {
        for amount in [1u64, 50, 1_000] {
            let rejection = bet_error(registry.place_bet(fight_id, bettor, fighter, amount).await);
            assert!(matches!(rejection, BetError::PhaseClosed { .. }));
        }
    }

    loop {
        if matches!(
            next_event(&mut rx).await,
            FightEvent::FightCompleteWithStats { .. }
        ) {
            break;
        }
    }

    let rejection = bet_error(registry.place_bet(fight_id, bettor, ASHA, 50).await);
    assert_eq!(
        rejection,
        BetError::PhaseClosed {
            phase: FightPhase::Completed
        }
    );

    // No rejected wager ever moved money.
    assert_eq!(ledger.balance_of(bettor).await, 10_000);
    let snapshot = handle.snapshot().await.expect("snapshot");
    assert_eq!(snapshot.bet_total, 0);
}

#[tokio::test]
async fn quoted_payout_is_locked_in_at_admission() {
    let ledger = InMemoryLedger::new();
    let registry = registry(ledger.clone());
    let bettor = Uuid::new_v4();
    ledger.deposit(bettor, 1_000).await;

    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, Uuid::new_v4(), 2)
        .await
        .expect("schedule fight");
    let snapshot = handle.snapshot().await.expect("snapshot");

    let wager = registry
        .place_bet(handle.fight_id(), bettor, BRICK, 200)
        .await
        .expect("wager admitted");
    assert!((1.01..=10.0).contains(&wager.odds));
    assert_eq!(
        wager.potential_payout,
        (200.0 * wager.odds).round() as u64,
        "recorded payout matches the quote taken at admission"
    );

    // The stat-favored fighter pays out less per unit staked.
    let favorite = StatOdds.quote(&snapshot, ASHA).await;
    let underdog = StatOdds.quote(&snapshot, BRICK).await;
    assert!(favorite < underdog);
    assert_eq!(wager.odds, underdog);
}

/// Odds provider that parks mid-quote until the test releases it, opening a
/// window for the fight to leave the betting phases under an in-flight
/// admission.
struct StallingOdds {
    entered: mpsc::Sender<()>,
    release: Arc<Notify>,
}

#[async_trait]
impl OddsProvider for StallingOdds {
    async fn quote(&self, _fight: &LiveFight, _fighter_id: FighterId) -> f64 {
        let _ = self.entered.send(()).await;
        self.release.notified().await;
        2.0
    }
}

#[tokio::test]
async fn window_closing_mid_admission_refunds_and_resolves_the_bet() {
    init_tracing();
    let ledger = InMemoryLedger::new();
    let (entered_tx, mut entered_rx) = mpsc::channel(1);
    let release = Arc::new(Notify::new());
    let registry = Arc::new(FightRegistry::new(
        roster(),
        ledger.clone(),
        Arc::new(NullNotifier),
        Arc::new(StallingOdds {
            entered: entered_tx,
            release: release.clone(),
        }),
        CoordinatorConfig::fast(),
    ));
    let operator = Uuid::new_v4();
    let bettor = Uuid::new_v4();
    ledger.deposit(bettor, 100).await;

    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, operator, 8)
        .await
        .expect("schedule fight");
    let fight_id = handle.fight_id();
    let (_, mut rx) = handle.join().await.expect("join");

    let placing = tokio::spawn({
        let registry = registry.clone();
        async move { registry.place_bet(fight_id, bettor, ASHA, 100).await }
    });

    // The wager passed validation and is parked at the quote.
    timeout(Duration::from_secs(10), entered_rx.recv())
        .await
        .expect("quote entered")
        .expect("provider alive");

    handle.start(operator).await.expect("start");
    loop {
        if matches!(next_event(&mut rx).await, FightEvent::FightStarted) {
            break;
        }
    }
    release.notify_one();

    let rejection = bet_error(placing.await.expect("placing task"));
    assert!(matches!(rejection, BetError::PhaseClosed { .. }));

    // The compensating path undid both ledger writes: the stake is back and
    // the recorded bet is resolved, not dangling.
    assert_eq!(ledger.balance_of(bettor).await, 100);
    assert_eq!(ledger.recorded_bets().await, 1);
    assert_eq!(ledger.unresolved_bets().await, 0);
}

#[tokio::test]
async fn countdown_still_accepts_bets() {
    let ledger = InMemoryLedger::new();
    let config = CoordinatorConfig {
        countdown_ticks: 100,
        tick_interval: Duration::from_millis(20),
        round_every_ticks: 1,
        ..CoordinatorConfig::default()
    };
    let registry = registry_with(ledger.clone(), config);
    let operator = Uuid::new_v4();
    let bettor = Uuid::new_v4();
    ledger.deposit(bettor, 100).await;

    let handle = registry
        .create_fight_with_seed(ASHA, BRICK, operator, 6)
        .await
        .expect("schedule fight");
    let (_, mut rx) = handle.join().await.expect("join");
    handle.start(operator).await.expect("start");

    let wager = registry
        .place_bet(handle.fight_id(), bettor, ASHA, 100)
        .await
        .expect("countdown wagers are admitted");
    assert_eq!(ledger.balance_of(bettor).await, 0);

    loop {
        if let FightEvent::BetUpdate { total } = next_event(&mut rx).await {
            assert_eq!(total, wager.amount);
            break;
        }
    }
}
