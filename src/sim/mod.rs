//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable frame delta, clamped to a maximum step
//! - Seeded RNG only
//! - Stable iteration order (walls oldest first, spikes by wall id)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod generator;
pub mod player;
pub mod rect;
pub mod spike;
pub mod state;
pub mod tick;
pub mod wall;

pub use autopilot::Autopilot;
pub use generator::{NoSpawnObserver, WallManager, WallSpawnObserver};
pub use player::{Player, PlayerState};
pub use rect::Rect;
pub use spike::SpikeTrap;
pub use state::{Coin, CoinKind, DeathCause, GameEvent, GamePhase, GameWorld, PlayerChunk};
pub use tick::{TickInput, tick};
pub use wall::{Approach, VerticalEffect, Wall, WallId, WallSide};
