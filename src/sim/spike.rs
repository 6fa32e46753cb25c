//! Spike traps
//!
//! Each hazardous wall owns one trap. The trap cycles through
//! out / hold / in / rest and is lethal only while its protrusion is past
//! the danger threshold, which is a narrower window than the visible motion.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::wall::{Wall, WallId, WallSide};
use crate::inverse_lerp;
use crate::tuning::SpikeTuning;

/// End of the extend ramp (fraction of the period)
pub const EXTEND_END: f32 = 0.20;
/// End of the fully extended hold
pub const HOLD_END: f32 = 0.55;
/// End of the retract ramp; retracted for the rest of the cycle
pub const RETRACT_END: f32 = 0.80;

/// Protrusion (0..=1) at a given fraction of the cycle
pub fn protrusion_at(phase: f32) -> f32 {
    let extend = if phase < EXTEND_END {
        inverse_lerp(0.0, EXTEND_END, phase)
    } else if phase < HOLD_END {
        1.0
    } else if phase < RETRACT_END {
        1.0 - inverse_lerp(HOLD_END, RETRACT_END, phase)
    } else {
        0.0
    };
    extend.clamp(0.0, 1.0)
}

/// Periodic spike hazard attached to a wall
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeTrap {
    /// Wall this trap belongs to
    pub wall: WallId,
    /// Lethal region, flush with the wall's inward face
    pub hitbox: Rect,
    timer: f32,
    extend: f32,
    dangerous: bool,
    tuning: SpikeTuning,
}

impl SpikeTrap {
    pub fn new(wall: &Wall, tuning: SpikeTuning) -> Self {
        let mut trap = Self {
            wall: wall.id,
            hitbox: Rect::default(),
            timer: 0.0,
            extend: 0.0,
            dangerous: false,
            tuning,
        };
        trap.refresh_hitbox(wall);
        trap
    }

    /// Advance the cycle and rebuild the hitbox from the wall's current position
    pub fn update(&mut self, dt: f32, wall: &Wall) {
        let period = self.tuning.period;
        self.timer += dt;
        while self.timer > period {
            self.timer -= period;
        }

        self.extend = protrusion_at(self.timer / period);
        self.dangerous = self.extend > self.tuning.danger_threshold;
        self.refresh_hitbox(wall);
    }

    /// Rebuild the hitbox without advancing time (after the wall scrolled)
    pub fn refresh_hitbox(&mut self, wall: &Wall) {
        let depth = self.tuning.depth * self.extend;
        let face = wall.inner_face_x();
        let x = match wall.side {
            WallSide::Left => face,
            WallSide::Right => face - depth,
        };
        self.hitbox = Rect::new(x, wall.rect.y, depth, wall.rect.h);
    }

    /// Seconds into the current cycle
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Current protrusion in [0, 1]
    pub fn extend(&self) -> f32 {
        self.extend
    }

    pub fn is_dangerous(&self) -> bool {
        self.dangerous
    }
}
