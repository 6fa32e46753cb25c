//! Procedural wall generation
//!
//! Walls form a ladder: each new wall is placed so the point where the
//! player is expected to touch it (the contact point) sits a sampled rise
//! above the previous contact point. The rise is always sampled strictly
//! inside a band below the largest gain the jump physics can deliver, so
//! every wall is reachable with some timing slack.
//!
//! Reach formulas (y-up, launch at `(jump_vx, jump_vy_min)`, gravity `g`):
//! - lateral: `t = dx / jump_vx`, `rise = vy·t - ½·g·t²`
//! - same side (jump out, flip back): `2 · vy² / (2g)`

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::rect::Rect;
use super::wall::{Approach, VerticalEffect, Wall, WallId, WallSide};
use crate::tuning::{ArenaTuning, Band, GeneratorTuning, PhysicsTuning, Tuning};

/// Safety valve for `ensure_ahead` under degenerate tuning
const MAX_SPAWNS_PER_CALL: usize = 256;

/// Gap corrections smaller than this are float noise, not worth a warning
const GAP_EPSILON: f32 = 1e-3;

/// Notified once for every wall the generator creates
pub trait WallSpawnObserver {
    fn on_wall_spawned(&mut self, wall: &Wall);
}

/// Observer that ignores spawns
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpawnObserver;

impl WallSpawnObserver for NoSpawnObserver {
    fn on_wall_spawned(&mut self, _wall: &Wall) {}
}

/// Height reached `dx` units sideways into a jump launched at the minimum impulse
pub fn arc_height_at(physics: &PhysicsTuning, dx: f32) -> f32 {
    let t = dx.max(0.0) / physics.jump_vx;
    physics.jump_vy_min * t - 0.5 * physics.gravity * t * t
}

/// Largest rise a single jump across the gap can deliver
pub fn lateral_reach(physics: &PhysicsTuning, arena: &ArenaTuning) -> f32 {
    arc_height_at(physics, cross_distance(physics, arena))
}

/// Largest rise a jump plus a double-jump flip can deliver
pub fn same_side_reach(physics: &PhysicsTuning) -> f32 {
    2.0 * physics.jump_vy_min * physics.jump_vy_min / (2.0 * physics.gravity)
}

/// Horizontal distance the body travels between the two wall faces
pub fn cross_distance(physics: &PhysicsTuning, arena: &ArenaTuning) -> f32 {
    (arena.wall_right_x - arena.wall_left_x - physics.player_size).max(0.0)
}

/// Generator and owner of the active walls
#[derive(Debug, Clone)]
pub struct WallManager {
    walls: Vec<Wall>,
    physics: PhysicsTuning,
    arena: ArenaTuning,
    tuning: GeneratorTuning,
    rng: Pcg32,
    last_side: Option<WallSide>,
    /// Previous wall was a same-side repeat
    last_was_repeat: bool,
    /// Where the player is expected to touch the previous wall
    last_contact_y: f32,
    /// Walls generated this run (not reduced by retirement)
    spawned: u32,
    next_id: u32,
}

impl WallManager {
    pub fn new(tuning: &Tuning, seed: u64) -> Self {
        Self {
            walls: Vec::new(),
            physics: tuning.physics,
            arena: tuning.arena,
            tuning: tuning.generator,
            rng: Pcg32::seed_from_u64(seed),
            last_side: None,
            last_was_repeat: false,
            last_contact_y: 0.0,
            spawned: 0,
            next_id: 1,
        }
    }

    /// Active walls, oldest (lowest) first
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall(&self, id: WallId) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id == id)
    }

    pub fn last_contact_y(&self) -> f32 {
        self.last_contact_y
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Top edge of the highest wall
    pub fn top_y(&self) -> Option<f32> {
        self.walls.iter().map(|w| w.rect.top()).reduce(f32::max)
    }

    /// Theoretical maximum rise for an approach
    pub fn reach(&self, approach: Approach) -> f32 {
        match approach {
            Approach::SameSide => same_side_reach(&self.physics),
            Approach::Lateral | Approach::Ground => lateral_reach(&self.physics, &self.arena),
        }
    }

    /// Rise band `(min, max)` for an approach.
    ///
    /// An inverted band collapses to its ceiling rather than being sampled.
    pub fn rise_band(&self, approach: Approach) -> (f32, f32) {
        let band = match approach {
            Approach::SameSide => self.tuning.same_side_band,
            Approach::Lateral | Approach::Ground => self.tuning.lateral_band,
        };
        let reach = self.reach(approach);
        clamp_band(band, reach)
    }

    /// Place the first wall where a jump off the floor toward `towards_right` lands.
    ///
    /// No randomness: the same inputs always give the same wall.
    pub fn spawn_first_from_ground(
        &mut self,
        player: &Rect,
        floor_top: f32,
        towards_right: bool,
        observer: &mut dyn WallSpawnObserver,
    ) -> WallId {
        let (side, dx) = if towards_right {
            (WallSide::Right, self.arena.wall_right_x - player.right())
        } else {
            (WallSide::Left, player.x - self.arena.wall_left_x)
        };
        let contact_y = floor_top + arc_height_at(&self.physics, dx);
        let h = self.tuning.segment_height;
        // Sit the wall a little low: the stepped arc falls slightly short of the exact one
        let contact_height = self.tuning.contact_fraction * h + self.tuning.first_wall_bias;
        let rect = Rect::new(self.column_x(side), contact_y - contact_height, self.arena.wall_width, h);

        let wall = Wall {
            id: self.allocate_id(),
            side,
            rect,
            has_spikes: false,
            is_bounce: false,
            vertical_effect: VerticalEffect::Normal,
            approach: Approach::Ground,
            contact_height,
            rise: 0.0,
        };
        log::debug!(
            "First wall {:?} on {:?}: contact y={:.1}, dx={:.1}",
            wall.id,
            side,
            contact_y,
            dx
        );
        self.commit(wall, observer)
    }

    /// Generate the next wall above the current ladder
    pub fn spawn_next(&mut self, observer: &mut dyn WallSpawnObserver) -> WallId {
        let index = self.spawned;
        let prev_side = self.last_side.unwrap_or(WallSide::Left);

        // Never three on one side; otherwise occasionally repeat
        let approach = if self.last_side.is_some()
            && !self.last_was_repeat
            && index >= self.tuning.same_side_min_walls
            && self.rng.random::<f32>() < self.tuning.same_side_chance
        {
            Approach::SameSide
        } else {
            Approach::Lateral
        };
        let side = match approach {
            Approach::SameSide => prev_side,
            _ => prev_side.opposite(),
        };

        // Decorations are mutually exclusive
        let (has_spikes, mut is_bounce, mut effect) = self.roll_decorations(index);
        let base_h = self.tuning.segment_height;
        let special_h = base_h * self.tuning.special_height_factor;
        let f = self.tuning.contact_fraction;
        let (min_rise, max_rise) = self.rise_band(approach);

        // Clear space above the previous wall on this side
        let floor_for_bottom = self
            .walls
            .iter()
            .rev()
            .find(|w| w.side == side)
            .map(|w| w.rect.top() + self.tuning.min_same_side_gap);
        let needed_rise = |h: f32| match floor_for_bottom {
            Some(bottom) => bottom + f * h - self.last_contact_y,
            None => f32::NEG_INFINITY,
        };

        let mut h = if is_bounce || effect != VerticalEffect::Normal {
            special_h
        } else {
            base_h
        };
        if h > base_h && needed_rise(h) > max_rise {
            // A tall wall does not fit above its neighbour; fall back to a plain one
            is_bounce = false;
            effect = VerticalEffect::Normal;
            h = base_h;
        }

        // Sample strictly inside the band, raised to respect the gap
        let lo = min_rise.max(needed_rise(h));
        let mut rise = if lo <= max_rise {
            sample(&mut self.rng, lo, max_rise)
        } else {
            sample(&mut self.rng, min_rise, max_rise)
        };

        // Contact lands at the configured fraction of the wall
        let mut contact_y = self.last_contact_y + rise;
        let mut bottom = contact_y - f * h;
        if let Some(required) = floor_for_bottom
            && bottom < required
        {
            if required - bottom > GAP_EPSILON {
                log::warn!(
                    "Wall #{} pushed up {:.1} to keep clear of the wall below",
                    index,
                    required - bottom
                );
            }
            bottom = required;
            contact_y = bottom + f * h;
            rise = contact_y - self.last_contact_y;
        }

        let wall = Wall {
            id: self.allocate_id(),
            side,
            rect: Rect::new(self.column_x(side), bottom, self.arena.wall_width, h),
            has_spikes,
            is_bounce,
            vertical_effect: effect,
            approach,
            contact_height: f * h,
            rise,
        };
        log::debug!(
            "Wall {:?} #{} {:?} {:?}: rise={:.1} in [{:.1}, {:.1}] spikes={} bounce={} effect={:?}",
            wall.id,
            index,
            side,
            approach,
            rise,
            min_rise,
            max_rise,
            has_spikes,
            is_bounce,
            effect
        );
        self.commit(wall, observer)
    }

    /// Move every wall down by `dy` and retire walls that fell out of range
    pub fn apply_scroll(&mut self, dy: f32) {
        if dy <= 0.0 {
            return;
        }
        for wall in &mut self.walls {
            wall.rect.scroll(dy);
        }
        self.last_contact_y -= dy;
        let retire_y = self.tuning.retire_y;
        self.walls.retain(|w| w.rect.top() >= retire_y);
    }

    /// Spawn until the highest wall clears the look-ahead margin above the screen
    pub fn ensure_ahead(&mut self, observer: &mut dyn WallSpawnObserver) {
        let target = self.arena.height + self.tuning.look_ahead;
        for _ in 0..MAX_SPAWNS_PER_CALL {
            if self.top_y().is_some_and(|top| top >= target) {
                return;
            }
            self.spawn_next(observer);
        }
        log::warn!("ensure_ahead hit its spawn limit; check generator tuning");
    }

    fn roll_decorations(&mut self, index: u32) -> (bool, bool, VerticalEffect) {
        let t = &self.tuning;
        let roll: f32 = self.rng.random();
        let spikes_until = t.spike_chance;
        let bounce_until = spikes_until + t.bounce_chance;
        let effect_until = bounce_until + t.effect_chance;

        if roll < spikes_until {
            return (index >= t.spike_min_walls, false, VerticalEffect::Normal);
        }
        if roll < bounce_until {
            return (false, index >= t.bounce_min_walls, VerticalEffect::Normal);
        }
        if roll < effect_until && index >= t.effect_min_walls {
            let effect = if roll < bounce_until + t.effect_chance * 0.5 {
                VerticalEffect::LiftUp
            } else {
                VerticalEffect::FastDown
            };
            return (false, false, effect);
        }
        (false, false, VerticalEffect::Normal)
    }

    fn column_x(&self, side: WallSide) -> f32 {
        match side {
            WallSide::Left => self.arena.wall_left_x - self.arena.wall_width,
            WallSide::Right => self.arena.wall_right_x,
        }
    }

    fn allocate_id(&mut self) -> WallId {
        let id = WallId(self.next_id);
        self.next_id += 1;
        id
    }

    fn commit(&mut self, wall: Wall, observer: &mut dyn WallSpawnObserver) -> WallId {
        let id = wall.id;
        self.last_side = Some(wall.side);
        self.last_was_repeat = wall.approach == Approach::SameSide;
        self.last_contact_y = wall.contact_y();
        self.spawned += 1;
        observer.on_wall_spawned(&wall);
        self.walls.push(wall);
        id
    }
}

/// Band bounds scaled by `reach`; collapses to the ceiling if inverted
fn clamp_band(band: Band, reach: f32) -> (f32, f32) {
    let min = band.min * reach;
    let max = band.max * reach;
    if min > max {
        log::warn!(
            "Rise band inverted ({:.1} > {:.1}); using {:.1}",
            min,
            max,
            max
        );
        (max, max)
    } else {
        (min, max)
    }
}

/// Uniform in `[lo, hi)`, or `lo` when the range is empty
fn sample(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    lo + rng.random::<f32>() * (hi - lo)
}
