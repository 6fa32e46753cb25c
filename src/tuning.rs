//! Game tuning and balance
//!
//! One value object holds every physical constant. The player controller and
//! the wall generator are both built from the same `Tuning`, so the arcs the
//! generator plans for are the arcs the player actually flies.
//!
//! Loaded from JSON; any missing field falls back to its default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors produced while loading or validating tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Player body and jump physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Horizontal launch speed for every jump kind
    pub jump_vx: f32,
    /// Vertical launch impulse (the un-held, minimum jump)
    pub jump_vy_min: f32,
    /// Extra upward acceleration while the jump is held
    pub jump_hold_accel: f32,
    /// How long holding can keep boosting (seconds)
    pub jump_hold_max: f32,
    /// Holding stops boosting once vy reaches this
    pub jump_hold_vy_cap: f32,
    /// Releasing the hold clamps vy down to this
    pub jump_cut_vy: f32,
    /// Downward slide speed while attached to a wall
    pub slide_speed: f32,
    /// Grace window for a wall jump after leaving the wall (seconds)
    pub wall_coyote: f32,
    /// No re-attaching to walls for this long after a jump or flip (seconds)
    pub regrab_lockout: f32,
    /// Push away from the wall on a wall jump
    pub wall_jump_epsilon: f32,
    /// Near-miss distance that still counts as touching a wall
    pub contact_tolerance: f32,
    /// Player body edge length
    pub player_size: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 900.0,
            jump_vx: 420.0,
            jump_vy_min: 620.0,
            jump_hold_accel: 1500.0,
            jump_hold_max: 0.16,
            jump_hold_vy_cap: 760.0,
            jump_cut_vy: 620.0,
            slide_speed: 120.0,
            wall_coyote: 0.10,
            regrab_lockout: 0.12,
            wall_jump_epsilon: 0.6,
            contact_tolerance: 2.0,
            player_size: PLAYER_SIZE,
        }
    }
}

/// Fixed screen geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    /// Inward face of the left wall column
    pub wall_left_x: f32,
    /// Inward face of the right wall column
    pub wall_right_x: f32,
    pub wall_width: f32,
    pub floor_height: f32,
    /// Camera keeps the rising player at or below this fraction of the height
    pub anchor_ratio: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: VIEW_WIDTH,
            height: VIEW_HEIGHT,
            wall_left_x: WALL_LEFT_X,
            wall_right_x: WALL_RIGHT_X,
            wall_width: 10.0,
            floor_height: 18.0,
            anchor_ratio: 0.42,
        }
    }
}

impl ArenaTuning {
    /// Screen y the camera anchors the rising player to
    #[inline]
    pub fn anchor_y(&self) -> f32 {
        self.height * self.anchor_ratio
    }
}

/// A sampling band expressed as fractions of a theoretical maximum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Procedural wall generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorTuning {
    /// Height of an ordinary wall segment
    pub segment_height: f32,
    /// Where on a wall (fraction of its height) the expected contact lands
    pub contact_fraction: f32,
    /// The first wall is lowered by this much below the exact arc
    pub first_wall_bias: f32,
    /// Rise band for a lateral jump, as fractions of its reach
    pub lateral_band: Band,
    /// Rise band for a same-side double jump, as fractions of its reach
    pub same_side_band: Band,
    pub same_side_chance: f32,
    pub same_side_min_walls: u32,
    /// Minimum clear space between a wall and the next wall on its side
    pub min_same_side_gap: f32,
    /// Keep walls spawned this far above the top of the screen
    pub look_ahead: f32,
    /// Walls whose top falls below this y are retired
    pub retire_y: f32,
    pub spike_chance: f32,
    pub spike_min_walls: u32,
    pub bounce_chance: f32,
    pub bounce_min_walls: u32,
    /// Combined chance of LIFT_UP or FAST_DOWN (split evenly)
    pub effect_chance: f32,
    pub effect_min_walls: u32,
    /// Bounce and vertical-effect walls are this many times taller
    pub special_height_factor: f32,
}

impl Default for GeneratorTuning {
    fn default() -> Self {
        Self {
            segment_height: 160.0,
            contact_fraction: 0.70,
            first_wall_bias: 8.0,
            lateral_band: Band::new(0.70, 0.85),
            same_side_band: Band::new(0.60, 0.85),
            same_side_chance: 0.22,
            same_side_min_walls: 3,
            min_same_side_gap: 40.0,
            look_ahead: 260.0,
            retire_y: -200.0,
            spike_chance: 0.18,
            spike_min_walls: 5,
            bounce_chance: 0.08,
            bounce_min_walls: 8,
            effect_chance: 0.10,
            effect_min_walls: 12,
            special_height_factor: 2.0,
        }
    }
}

/// Spike trap timing and reach
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeTuning {
    /// Protrusion at full extension
    pub depth: f32,
    /// Length of one out/hold/in/rest cycle (seconds)
    pub period: f32,
    /// Lethal only while protrusion exceeds this
    pub danger_threshold: f32,
}

impl Default for SpikeTuning {
    fn default() -> Self {
        Self {
            depth: 26.0,
            period: 3.6,
            danger_threshold: 0.45,
        }
    }
}

/// Per-run bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunTuning {
    pub coin_size: f32,
    pub coin_chance: f32,
    /// No coins on walls starting closer than this above the floor
    pub coin_floor_clearance: f32,
    pub coin_retire_y: f32,
    pub floor_retire_y: f32,
    /// Seconds between death and game over
    pub death_delay: f32,
    /// Input ignored for this long after a run starts
    pub input_lock: f32,
    pub max_dt: f32,
    pub chunk_cols: u32,
    pub chunk_rows: u32,
    pub chunk_gravity: f32,
    pub chunk_retire_y: f32,
}

impl Default for RunTuning {
    fn default() -> Self {
        Self {
            coin_size: 18.0,
            coin_chance: 0.18,
            coin_floor_clearance: 60.0,
            coin_retire_y: -200.0,
            floor_retire_y: -200.0,
            death_delay: 1.0,
            input_lock: 0.25,
            max_dt: MAX_DT,
            chunk_cols: 2,
            chunk_rows: 3,
            chunk_gravity: 900.0,
            chunk_retire_y: -150.0,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub arena: ArenaTuning,
    pub generator: GeneratorTuning,
    pub spikes: SpikeTuning,
    pub run: RunTuning,
}

impl Tuning {
    /// Parse and validate tuning from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    ///
    /// Inverted generation bands are allowed here; the generator clamps them.
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.physics;
        positive("physics.gravity", p.gravity)?;
        positive("physics.jump_vx", p.jump_vx)?;
        positive("physics.jump_vy_min", p.jump_vy_min)?;
        positive("physics.player_size", p.player_size)?;
        non_negative("physics.slide_speed", p.slide_speed)?;
        non_negative("physics.jump_hold_accel", p.jump_hold_accel)?;
        non_negative("physics.jump_hold_max", p.jump_hold_max)?;
        non_negative("physics.wall_coyote", p.wall_coyote)?;
        non_negative("physics.regrab_lockout", p.regrab_lockout)?;
        non_negative("physics.contact_tolerance", p.contact_tolerance)?;

        let a = &self.arena;
        positive("arena.width", a.width)?;
        positive("arena.height", a.height)?;
        positive("arena.wall_width", a.wall_width)?;
        if a.wall_right_x - a.wall_left_x <= p.player_size {
            return Err(TuningError::Invalid {
                field: "arena.wall_right_x",
                reason: "walls are too close for the player to fit between them",
            });
        }
        if !(0.0..=1.0).contains(&a.anchor_ratio) {
            return Err(TuningError::Invalid {
                field: "arena.anchor_ratio",
                reason: "must be within [0, 1]",
            });
        }

        let g = &self.generator;
        positive("generator.segment_height", g.segment_height)?;
        if !(0.0..=1.0).contains(&g.contact_fraction) {
            return Err(TuningError::Invalid {
                field: "generator.contact_fraction",
                reason: "must be within [0, 1]",
            });
        }
        if g.special_height_factor < 1.0 {
            return Err(TuningError::Invalid {
                field: "generator.special_height_factor",
                reason: "must be at least 1",
            });
        }

        positive("spikes.period", self.spikes.period)?;
        non_negative("spikes.depth", self.spikes.depth)?;
        positive("run.max_dt", self.run.max_dt)?;
        positive("run.coin_size", self.run.coin_size)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: "must be a finite positive number",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::Invalid {
            field,
            reason: "must be a finite non-negative number",
        })
    }
}
