//! Demo player
//!
//! Produces the same input a person would: one press per decision plus an
//! optional hold. Used by the headless runner and attract mode.
//!
//! The bot climbs rung by rung. Wall ids grow with height, so the next
//! rung is the lowest-id wall above the last one touched. Lateral jumps
//! wait on the wall until the arc lands inside the target; same-side
//! climbs leave at once and flip back when the return arc would land
//! just under the target's contact point.

use super::collision::{flush_x, touches_wall};
use super::generator::{arc_height_at, cross_distance};
use super::player::PlayerState;
use super::state::{GamePhase, GameWorld};
use super::tick::TickInput;
use super::wall::{Wall, WallId, WallSide};

/// Flip so the return arc lands this far below the target's contact point
const FLIP_AIM_BELOW_CONTACT: f32 = 24.0;

/// Simple rule-based player
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Hold the button this long after each press (0 taps)
    pub hold_duration: f32,
    /// Keep predicted landings this far under the target's top
    pub margin: f32,
    /// Last wall hung on or bounced off
    from: Option<WallId>,
    hold_left: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            hold_duration: 0.0,
            margin: 10.0,
            from: None,
            hold_left: 0.0,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide this frame's input from a read-only view of the world
    pub fn decide(&mut self, world: &GameWorld, dt: f32) -> TickInput {
        // The lock outlasting this frame swallows input anyway
        if world.phase != GamePhase::Playing || world.input_lock() > dt {
            self.from = None;
            self.hold_left = 0.0;
            return TickInput::default();
        }

        self.track_contact(world);
        let player = &world.player;
        let target = self.next_rung(world);
        let press = match player.state {
            PlayerState::OnGround => true,
            PlayerState::OnWall => {
                // Leave before the spikes finish coming out
                let spikes_out = world.attached_spike().is_some_and(|s| s.extend() > 0.0);
                spikes_out || target.is_some_and(|t| self.ready_to_leave(world, t))
            }
            PlayerState::Jumping => {
                player.has_double_jump() && target.is_some_and(|t| should_flip(world, t))
            }
            PlayerState::Dead => false,
        };

        let mut input = TickInput::default();
        if press {
            self.hold_left = self.hold_duration;
            input.just_pressed = true;
        }
        if self.hold_left > 0.0 {
            self.hold_left -= dt;
            input.held = true;
        }
        input
    }

    /// Play until the run ends or `max_frames` pass; returns frames played.
    ///
    /// `high_score` goes to every update unchanged, so the world can tell
    /// whether the finished run beat it.
    pub fn play_run(&mut self, world: &mut GameWorld, high_score: f32, max_frames: u32) -> u32 {
        let dt = world.tuning.run.max_dt;
        let mut frames = 0;
        while world.phase == GamePhase::Playing && frames < max_frames {
            let input = self.decide(world, dt);
            world.update(dt, input.just_pressed, input.held, high_score);
            frames += 1;
        }
        frames
    }

    fn track_contact(&mut self, world: &GameWorld) {
        let player = &world.player;
        let touched = match player.state {
            PlayerState::OnWall => world.attached_wall(),
            PlayerState::Jumping => {
                let tolerance = world.tuning.physics.contact_tolerance;
                world
                    .walls()
                    .iter()
                    .find(|w| w.is_bounce && touches_wall(&player.rect, w, tolerance))
            }
            _ => None,
        };
        if let Some(wall) = touched
            && self.from.is_none_or(|from| wall.id > from)
        {
            self.from = Some(wall.id);
        }
    }

    fn next_rung<'a>(&self, world: &'a GameWorld) -> Option<&'a Wall> {
        world
            .walls()
            .iter()
            .filter(|w| self.from.is_none_or(|from| w.id > from))
            .min_by_key(|w| w.id)
    }

    fn ready_to_leave(&self, world: &GameWorld, target: &Wall) -> bool {
        let player = &world.player;
        let side = if player.on_wall_left {
            WallSide::Left
        } else {
            WallSide::Right
        };
        if target.side == side {
            return true;
        }
        let t = &world.tuning;
        let landing = player.rect.y + arc_height_at(&t.physics, cross_distance(&t.physics, &t.arena));
        landing <= target.rect.top() - self.margin
    }
}

/// Whether to spend the double jump now to swing back onto `target`
fn should_flip(world: &GameWorld, target: &Wall) -> bool {
    let player = &world.player;
    let heading = if player.vel.x < 0.0 {
        WallSide::Left
    } else if player.vel.x > 0.0 {
        WallSide::Right
    } else {
        return false;
    };
    if target.side == heading {
        return false;
    }
    let dx = (player.rect.x - flush_x(&player.rect, target)).abs();
    let landing = player.rect.y + arc_height_at(&world.tuning.physics, dx);
    // Past the apex the return arc only gets lower
    landing >= target.contact_y() - FLIP_AIM_BELOW_CONTACT || player.vertical_speed() <= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_DT;
    use crate::sim::state::{DeathCause, GameEvent};
    use crate::sim::tick::tick;
    use crate::tuning::Tuning;

    fn run_world(tuning: Tuning, seed: u64) -> GameWorld {
        let mut world = GameWorld::new(tuning, seed);
        world.init_run();
        world.drain_events();
        world
    }

    /// Play up to `frames` frames and return the distinct walls hung on, in order
    fn walls_visited(world: &mut GameWorld, frames: u32) -> Vec<WallId> {
        let mut pilot = Autopilot::new();
        let mut visited = Vec::new();
        for _ in 0..frames {
            let input = pilot.decide(world, MAX_DT);
            tick(world, &input, MAX_DT, 0.0);
            if let Some(wall) = world.attached_wall()
                && !visited.contains(&wall.id)
            {
                visited.push(wall.id);
            }
            if world.phase != GamePhase::Playing {
                break;
            }
        }
        visited
    }

    #[test]
    fn test_idle_while_locked() {
        let world = run_world(Tuning::default(), 1);
        let mut pilot = Autopilot::new();
        assert_eq!(pilot.decide(&world, MAX_DT), TickInput::default());
    }

    #[test]
    fn test_presses_on_ground() {
        let mut world = run_world(Tuning::default(), 1);
        while world.input_lock() > MAX_DT {
            tick(&mut world, &TickInput::default(), MAX_DT, 0.0);
        }
        let mut pilot = Autopilot::new();
        let input = pilot.decide(&world, MAX_DT);
        assert!(input.just_pressed);
        assert!(!input.held);
        tick(&mut world, &input, MAX_DT, 0.0);
        assert!(world.player.is_jumping());
        assert!(!pilot.decide(&world, MAX_DT).just_pressed);
    }

    #[test]
    fn test_hold_lasts_configured_time() {
        let mut world = run_world(Tuning::default(), 1);
        world.input_lock = 0.0;
        let mut pilot = Autopilot {
            hold_duration: 0.04,
            ..Autopilot::default()
        };
        let first = pilot.decide(&world, MAX_DT);
        assert!(first.just_pressed && first.held);
        tick(&mut world, &first, MAX_DT, 0.0);
        let held: Vec<bool> = (0..5)
            .map(|_| {
                let input = pilot.decide(&world, MAX_DT);
                tick(&mut world, &input, MAX_DT, 0.0);
                input.held
            })
            .collect();
        assert_eq!(held, vec![true, true, false, false, false]);
    }

    #[test]
    fn test_nothing_after_game_over() {
        let mut world = run_world(Tuning::default(), 1);
        world.phase = GamePhase::GameOver;
        let mut pilot = Autopilot::new();
        assert_eq!(pilot.decide(&world, MAX_DT), TickInput::default());
    }

    #[test]
    fn test_climbs_several_walls() {
        let mut world = run_world(Tuning::default(), 2024);
        let visited = walls_visited(&mut world, 60 * 30);
        assert!(visited.len() >= 3, "only reached {visited:?}");
        // Rungs are taken in order
        assert!(visited.windows(2).all(|w| w[0] < w[1]));
        assert!(world.best_height > 0.0);
    }

    #[test]
    fn test_flips_back_onto_same_side_wall() {
        let mut tuning = Tuning::default();
        tuning.generator.same_side_chance = 1.0;
        tuning.generator.same_side_min_walls = 1;
        let mut world = run_world(tuning, 77);
        let first = world.walls()[0].clone();
        let second = world.walls()[1].clone();
        assert_eq!(first.side, second.side);

        let visited = walls_visited(&mut world, 60 * 10);
        assert!(visited.len() >= 2, "only reached {visited:?}");
        assert_eq!(&visited[..2], &[first.id, second.id]);
    }

    #[test]
    fn test_play_run_reports_new_high_score() {
        let mut world = run_world(Tuning::default(), 2024);
        let mut pilot = Autopilot::new();
        // Climb a little, then make sure the run ends
        pilot.play_run(&mut world, 0.0, 60 * 8);
        assert!(world.best_height > 0.0);
        if world.phase == GamePhase::Playing {
            world.kill_player(DeathCause::Fall);
        }
        pilot.play_run(&mut world, 0.0, 600);
        assert_eq!(world.phase, GamePhase::GameOver);

        let best = world.best_height;
        let events = world.drain_events();
        assert!(events.contains(&GameEvent::NewHighScore { value: best }));
    }

    #[test]
    fn test_play_run_respects_higher_record() {
        let mut world = run_world(Tuning::default(), 2024);
        let mut pilot = Autopilot::new();
        world.kill_player(DeathCause::Fall);
        let frames = pilot.play_run(&mut world, 1.0e6, 600);
        assert!(frames < 600);
        assert_eq!(world.phase, GamePhase::GameOver);
        let events = world.drain_events();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::NewHighScore { .. })));
    }
}
