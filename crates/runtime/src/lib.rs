//! Fight session coordination for the live arena.
//!
//! This crate wires the pure [`combat_core`] engine into a live service:
//! one background worker per fight owns the authoritative simulation, drives
//! it on a timer, and fans its events out to any number of spectators over a
//! broadcast channel. Consumers hold a [`FightHandle`] to join the stream,
//! place bets through the admission gate, and query snapshots.
//!
//! Modules are organized by responsibility:
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] defines the wire-level event and intent contract
//! - [`fight`] holds the coordinator-facing fight projection
//! - [`betting`] validates and records wagers before the ledger sees them
//! - [`services`] declares the external collaborator seams
//! - `worker` keeps the per-fight background task internal to the crate
pub mod api;
pub mod betting;
pub mod config;
pub mod events;
pub mod fight;
pub mod services;

mod worker;

pub use api::{BetError, FightHandle, FightRegistry, Result, RuntimeError};
pub use betting::{BetAdmissionGate, BetId, OddsProvider, StatOdds, Wager};
pub use config::CoordinatorConfig;
pub use events::{ClientIntent, FightEnvelope, FightEvent, FightStats};
pub use fight::{FightId, FightPhase, LiveFight, UserId};
pub use services::{
    BetOutcome, InMemoryLedger, InMemoryRoster, LedgerService, NotificationService, NullNotifier,
    RosterService, ServiceError,
};
