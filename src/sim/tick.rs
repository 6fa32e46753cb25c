//! Per-frame simulation step
//!
//! The order of the steps below matters: each one reads what the
//! previous step left behind.

use super::collision::bounce_off;
use super::state::{DeathCause, GameEvent, GamePhase, GameWorld};

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Jump/confirm pressed this frame
    pub just_pressed: bool,
    /// Jump currently held (variable jump height)
    pub held: bool,
}

impl GameWorld {
    /// Advance one frame; returns the best height of the run so far
    pub fn update(&mut self, dt: f32, just_pressed: bool, is_held: bool, high_score: f32) -> f32 {
        let input = TickInput {
            just_pressed,
            held: is_held,
        };
        tick(self, &input, dt, high_score)
    }
}

/// Advance the world by one frame.
///
/// `dt` is clamped to the configured maximum step. `high_score` is the
/// best known score from outside the run and only decides whether a
/// `NewHighScore` event fires when the run ends.
pub fn tick(world: &mut GameWorld, input: &TickInput, dt: f32, high_score: f32) -> f32 {
    if world.phase != GamePhase::Playing {
        return world.best_height;
    }
    let dt = dt.clamp(0.0, world.tuning.run.max_dt);

    // Input lock
    let mut input = *input;
    if world.input_lock > 0.0 {
        world.input_lock = (world.input_lock - dt).max(0.0);
        if world.input_lock > 0.0 {
            input = TickInput::default();
        }
    }

    world.player.set_jump_held(input.held);
    if input.just_pressed && !world.player.is_dead() {
        world.started = true;
    }

    advance_bodies(world, dt);

    if !world.player.is_dead() {
        resolve_contacts(world, input.just_pressed);
    }

    let dy = scroll_delta(world);
    if dy > 0.0 {
        apply_scroll(world, dy);
    }

    if !world.player.is_dead() {
        check_hazards(world);
    }
    if !world.player.is_dead() {
        collect_coins(world);
    }

    if !world.player.is_dead() && world.player.rect.top() < 0.0 {
        world.kill_player(DeathCause::Fall);
    }

    if world.player.is_dead() {
        world.death_timer -= dt;
        if world.death_timer <= 0.0 {
            finish_run(world, high_score);
        }
    }

    world.best_height
}

fn advance_bodies(world: &mut GameWorld, dt: f32) {
    if world.death_cause == Some(DeathCause::Spikes) {
        world.update_chunks(dt);
    } else {
        world.player.update(dt);
    }

    for (id, trap) in world.spikes.iter_mut() {
        if let Some(wall) = world.wall_manager.wall(*id) {
            trap.update(dt, wall);
        }
    }
}

fn resolve_contacts(world: &mut GameWorld, just_pressed: bool) {
    let walls = world.wall_manager.walls();
    let player = &mut world.player;
    let floor_top = world.floor.top();

    player.detach_from_wall_if_not_overlapping(walls);

    if world.floor_visible && player.vertical_speed() <= 0.0 && player.rect.y <= floor_top {
        player.land_on_ground(floor_top);
    }

    player.try_stick_to_wall(walls);

    // One bounce per frame at most
    if let Some(push) = walls.iter().find_map(|w| bounce_off(&player.rect, w)) {
        player.bounce(push);
    }

    if !just_pressed {
        return;
    }
    if player.can_wall_jump() {
        player.jump_from_wall();
    } else if player.is_on_ground() {
        player.jump_from_ground(world.initial_jump_to_right);
    } else if player.is_jumping() && player.has_double_jump() {
        player.double_jump_flip();
    }
}

/// Amount the camera should move up this frame (never negative)
fn scroll_delta(world: &GameWorld) -> f32 {
    let player = &world.player;
    if !world.started || !player.is_jumping() || player.vertical_speed() <= 0.0 {
        return 0.0;
    }
    (player.rect.y - world.tuning.arena.anchor_y()).max(0.0)
}

fn apply_scroll(world: &mut GameWorld, dy: f32) {
    world.current_height += dy;
    world.best_height = world.best_height.max(world.current_height);

    world.wall_manager.apply_scroll(dy);

    world.floor.scroll(dy);
    if world.floor_visible && world.floor.top() < world.tuning.run.floor_retire_y {
        world.floor_visible = false;
        log::debug!("Floor scrolled out at height {:.0}", world.current_height);
    }

    world.player.rect.scroll(dy);
    world.coin_field.scroll(dy);
    world.coin_field.set_floor_top(world.floor.top());

    world.wall_manager.ensure_ahead(&mut world.coin_field);
    world.sync_spikes();
}

fn check_hazards(world: &mut GameWorld) {
    let body = world.player.rect;
    let hit = world
        .spikes
        .values()
        .any(|trap| trap.is_dangerous() && trap.hitbox.overlaps(&body));
    if hit {
        world.kill_player(DeathCause::Spikes);
    }
}

fn collect_coins(world: &mut GameWorld) {
    let body = world.player.rect;
    let gained = world.coin_field.collect_overlapping(&body);
    if gained > 0 {
        log::debug!("Collected {} coin(s)", gained);
    }
    for _ in 0..gained {
        world.coins_collected += 1;
        let total = world.coins_collected;
        world.push_event(GameEvent::CoinCollected { total });
    }
}

fn finish_run(world: &mut GameWorld, high_score: f32) {
    world.phase = GamePhase::GameOver;
    if world.best_height > high_score {
        world.push_event(GameEvent::NewHighScore {
            value: world.best_height,
        });
    }
    let report = world.report();
    log::info!(
        "Run {:#x} over: best height {:.0}, {} coins",
        report.run_id,
        report.best_height,
        report.coins
    );
    world.push_event(GameEvent::RunEnded(report));
}
