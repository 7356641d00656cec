//! Core engine types: players, RNG, setup, and the activity log.
//!
//! This module contains the building blocks the rest of the engine shares.

pub mod config;
pub mod log;
pub mod player;
pub mod rng;

pub use config::GameSetup;
pub use log::{ActivityLog, LOG_CAPACITY};
pub use player::{Player, PlayerMap};
pub use rng::{GameRng, GameRngState};
