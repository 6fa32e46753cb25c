//! Wall Jumper - A vertically scrolling wall-jump arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, wall generation, frame update)
//! - `tuning`: Data-driven game balance shared by the player and the generator
//! - `profile`: Per-user high score and coin totals
//! - `persistence`: Profile storage backends

pub mod persistence;
pub mod profile;
pub mod sim;
pub mod tuning;

pub use profile::{Profile, RunReport};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation will integrate in one step
    pub const MAX_DT: f32 = 1.0 / 60.0;

    /// Default viewport dimensions (world units)
    pub const VIEW_WIDTH: f32 = 480.0;
    pub const VIEW_HEIGHT: f32 = 800.0;

    /// Default x of the inward faces of the two wall columns
    pub const WALL_LEFT_X: f32 = 40.0;
    pub const WALL_RIGHT_X: f32 = VIEW_WIDTH - 40.0;

    /// Player body (square)
    pub const PLAYER_SIZE: f32 = 24.0;
}

/// Fraction of the way from `a` to `b`, clamped to [0, 1]
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
