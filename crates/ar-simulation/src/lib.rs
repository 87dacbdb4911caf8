//! Real-time simulation driver for AutoRealm.
//!
//! A [`Simulation`] advances an [`ar_core::World`] one tick at a time by
//! running its registered systems in order: player combat, player movement,
//! monster AI, respawns. Each tick yields a list of [`ServerMessage`]s with
//! every entity delta folded into one `batch_update`. [`GameLoop`] runs the
//! ticks on a tokio interval against a [`SharedWorld`] and hands the
//! messages to a [`Broadcaster`]; [`commands`] holds the out-of-tick
//! mutations the API boundary performs.

/// Monster behaviour state machine.
pub mod ai;
/// Per-observer fan-out of outbound messages.
pub mod broadcast;
/// Wall-clock tick counter with a dt clamp.
pub mod clock;
/// Player auto-attack system.
pub mod combat;
/// Boundary commands and their async handler.
pub mod commands;
/// Tuning for the loop and the AI.
pub mod config;
/// Mutable context passed to systems each tick.
pub mod context;
/// Entity deltas and the per-tick outbox.
pub mod delta;
/// Error types for the simulation crate.
pub mod error;
/// Async tick driver.
pub mod game_loop;
/// Outbound wire messages.
pub mod message;
/// Player movement system.
pub mod movement;
/// Monster respawn system.
pub mod respawn;
/// Top-level tick orchestrator.
pub mod simulation;
/// The trait that all simulation systems implement.
pub mod system;

pub use ai::MonsterAiSystem;
pub use broadcast::{BroadcastHub, Broadcaster, Subscription, spawn_sender};
pub use clock::TickClock;
pub use combat::PlayerCombatSystem;
pub use commands::{CommandHandler, MoveOutcome, MoveRequest};
pub use config::SimConfig;
pub use context::TickContext;
pub use delta::{EntityDelta, Outbox};
pub use error::{SimError, SimResult};
pub use game_loop::{GameLoop, LoopState, SharedWorld, shared};
pub use message::ServerMessage;
pub use movement::MovementSystem;
pub use respawn::RespawnSystem;
pub use simulation::Simulation;
pub use system::System;
