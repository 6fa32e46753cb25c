//! Player controller
//!
//! A small state machine over one rectangular body:
//!
//! ```text
//! OnGround --jump_from_ground--> Jumping
//! OnWall   --jump_from_wall----> Jumping   (also within coyote time after leaving)
//! OnWall   --lost contact------> Jumping   (free fall, no impulse)
//! Jumping  --try_stick_to_wall-> OnWall    (after the re-grab lockout)
//! Jumping  --land_on_ground----> OnGround
//! Jumping  --double_jump_flip--> Jumping   (once per airborne period)
//! any      --kill--------------> Dead
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{BounceResult, flush_x, touches_wall};
use super::rect::Rect;
use super::wall::{Wall, WallSide};
use crate::tuning::PhysicsTuning;

/// Discrete controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    OnGround,
    OnWall,
    Jumping,
    Dead,
}

/// The player body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    pub vel: Vec2,
    pub state: PlayerState,
    /// Side of the wall last attached to
    pub on_wall_left: bool,
    /// Wall jump still accepted while this is positive
    wall_coyote: f32,
    /// Wall attachment refused while this is positive
    regrab_lock: f32,
    /// Seconds the current jump has been held
    hold_time: f32,
    jump_held: bool,
    held_last_frame: bool,
    can_double_jump: bool,
    physics: PhysicsTuning,
}

impl Player {
    /// Create a player standing on the ground, centered on `center_x`
    pub fn new(center_x: f32, ground_y: f32, physics: PhysicsTuning) -> Self {
        let size = physics.player_size;
        Self {
            rect: Rect::new(center_x - size * 0.5, ground_y, size, size),
            vel: Vec2::ZERO,
            state: PlayerState::OnGround,
            on_wall_left: true,
            wall_coyote: 0.0,
            regrab_lock: 0.0,
            hold_time: 0.0,
            jump_held: false,
            held_last_frame: false,
            can_double_jump: true,
            physics,
        }
    }

    /// Latch the continuous hold input for this frame
    pub fn set_jump_held(&mut self, held: bool) {
        self.jump_held = held;
    }

    /// Advance timers and integrate motion for one frame
    pub fn update(&mut self, dt: f32) {
        let p = self.physics;
        self.regrab_lock = (self.regrab_lock - dt).max(0.0);

        match self.state {
            PlayerState::OnGround => {
                self.vel = Vec2::ZERO;
                self.wall_coyote = 0.0;
            }
            PlayerState::OnWall => {
                self.vel = Vec2::ZERO;
                self.rect.y -= p.slide_speed * dt;
                self.wall_coyote = p.wall_coyote;
                self.can_double_jump = true;
            }
            PlayerState::Jumping => {
                self.wall_coyote = (self.wall_coyote - dt).max(0.0);
                self.vel.y -= p.gravity * dt;

                if self.jump_held {
                    if self.hold_time < p.jump_hold_max && self.vel.y < p.jump_hold_vy_cap {
                        self.vel.y = (self.vel.y + p.jump_hold_accel * dt).min(p.jump_hold_vy_cap);
                    }
                    self.hold_time += dt;
                } else if self.held_last_frame && self.vel.y > p.jump_cut_vy {
                    self.vel.y = p.jump_cut_vy;
                }

                self.rect.translate(self.vel * dt);
            }
            PlayerState::Dead => {
                self.vel.x = 0.0;
                self.vel.y -= p.gravity * dt;
                self.rect.y += self.vel.y * dt;
            }
        }

        self.held_last_frame = self.jump_held;
    }

    /// Attach to the first wall the body is moving into. Returns true on attach.
    pub fn try_stick_to_wall(&mut self, walls: &[Wall]) -> bool {
        if self.state != PlayerState::Jumping || self.regrab_lock > 0.0 || self.vel.x == 0.0 {
            return false;
        }
        let side = if self.vel.x > 0.0 {
            WallSide::Right
        } else {
            WallSide::Left
        };
        let tolerance = self.physics.contact_tolerance;
        let Some(wall) = walls
            .iter()
            .find(|w| w.side == side && w.is_sticky() && touches_wall(&self.rect, w, tolerance))
        else {
            return false;
        };

        self.rect.x = flush_x(&self.rect, wall);
        self.on_wall_left = side == WallSide::Left;
        self.vel = Vec2::ZERO;
        self.state = PlayerState::OnWall;
        self.wall_coyote = self.physics.wall_coyote;
        self.can_double_jump = true;
        self.hold_time = 0.0;
        true
    }

    /// Drop off the wall (keeping vertical velocity) once contact is lost
    pub fn detach_from_wall_if_not_overlapping(&mut self, walls: &[Wall]) {
        if self.state != PlayerState::OnWall {
            return;
        }
        let side = if self.on_wall_left {
            WallSide::Left
        } else {
            WallSide::Right
        };
        let tolerance = self.physics.contact_tolerance;
        let touching = walls
            .iter()
            .any(|w| w.side == side && w.is_sticky() && touches_wall(&self.rect, w, tolerance));
        if !touching {
            self.state = PlayerState::Jumping;
            self.hold_time = self.physics.jump_hold_max;
        }
    }

    /// Whether a wall jump would be accepted right now
    pub fn can_wall_jump(&self) -> bool {
        match self.state {
            PlayerState::OnWall => true,
            PlayerState::Jumping => self.wall_coyote > 0.0,
            _ => false,
        }
    }

    /// Jump away from the current (or just-left) wall
    pub fn jump_from_wall(&mut self) -> bool {
        if !self.can_wall_jump() {
            return false;
        }
        let dir = if self.on_wall_left { 1.0 } else { -1.0 };
        self.launch(dir);
        self.rect.x += dir * self.physics.wall_jump_epsilon;
        self.regrab_lock = self.physics.regrab_lockout;
        self.wall_coyote = 0.0;
        true
    }

    /// First jump off the floor
    pub fn jump_from_ground(&mut self, towards_right: bool) -> bool {
        if self.state != PlayerState::OnGround {
            return false;
        }
        self.launch(if towards_right { 1.0 } else { -1.0 });
        true
    }

    /// Mid-air reversal, consumed until the next wall or ground contact
    pub fn double_jump_flip(&mut self) -> bool {
        if self.state != PlayerState::Jumping || !self.can_double_jump {
            return false;
        }
        let dir = if self.vel.x != 0.0 {
            -self.vel.x.signum()
        } else if self.on_wall_left {
            1.0
        } else {
            -1.0
        };
        self.vel = Vec2::new(dir * self.physics.jump_vx, self.physics.jump_vy_min);
        self.can_double_jump = false;
        self.regrab_lock = self.physics.regrab_lockout;
        self.wall_coyote = 0.0;
        self.hold_time = 0.0;
        true
    }

    /// Stand on the floor whose top edge is `floor_top`
    pub fn land_on_ground(&mut self, floor_top: f32) {
        if self.state == PlayerState::Dead {
            return;
        }
        self.rect.y = floor_top;
        self.vel = Vec2::ZERO;
        self.state = PlayerState::OnGround;
        self.wall_coyote = 0.0;
        self.can_double_jump = true;
        self.hold_time = 0.0;
    }

    /// Apply a bounce-wall push: flush position plus a full wall-jump impulse
    pub fn bounce(&mut self, push: BounceResult) {
        if self.state == PlayerState::Dead {
            return;
        }
        self.rect.x = push.x;
        self.launch(push.dir);
        self.on_wall_left = push.dir > 0.0;
        self.can_double_jump = true;
        self.regrab_lock = self.physics.regrab_lockout;
    }

    pub fn kill(&mut self) {
        self.state = PlayerState::Dead;
        self.vel.x = 0.0;
    }

    pub fn is_dead(&self) -> bool {
        self.state == PlayerState::Dead
    }

    pub fn is_on_wall(&self) -> bool {
        self.state == PlayerState::OnWall
    }

    pub fn is_on_ground(&self) -> bool {
        self.state == PlayerState::OnGround
    }

    pub fn is_jumping(&self) -> bool {
        self.state == PlayerState::Jumping
    }

    pub fn has_double_jump(&self) -> bool {
        self.can_double_jump
    }

    pub fn vertical_speed(&self) -> f32 {
        self.vel.y
    }

    pub fn regrab_locked(&self) -> bool {
        self.regrab_lock > 0.0
    }

    fn launch(&mut self, dir: f32) {
        self.vel = Vec2::new(dir * self.physics.jump_vx, self.physics.jump_vy_min);
        self.state = PlayerState::Jumping;
        self.can_double_jump = true;
        self.hold_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::wall::{Approach, VerticalEffect, WallId};

    const DT: f32 = 1.0 / 60.0;

    fn physics() -> PhysicsTuning {
        PhysicsTuning::default()
    }

    fn wall(side: WallSide, bounce: bool) -> Wall {
        let x = match side {
            WallSide::Left => 30.0,
            WallSide::Right => 440.0,
        };
        Wall {
            id: WallId(1),
            side,
            rect: Rect::new(x, 0.0, 10.0, 400.0),
            has_spikes: false,
            is_bounce: bounce,
            vertical_effect: VerticalEffect::Normal,
            approach: Approach::Lateral,
            contact_height: 280.0,
            rise: 150.0,
        }
    }

    /// Player attached to the left wall at y=200
    fn on_left_wall() -> (Player, Vec<Wall>) {
        let walls = vec![wall(WallSide::Left, false)];
        let mut player = Player::new(60.0, 200.0, physics());
        player.state = PlayerState::Jumping;
        player.vel = Vec2::new(-physics().jump_vx, 0.0);
        player.rect.x = 39.0;
        assert!(player.try_stick_to_wall(&walls));
        (player, walls)
    }

    #[test]
    fn test_ground_is_stationary() {
        let mut player = Player::new(240.0, 18.0, physics());
        for _ in 0..600 {
            player.update(DT);
        }
        assert_eq!(player.state, PlayerState::OnGround);
        assert_eq!(player.rect.y, 18.0);
        assert_eq!(player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_jump_from_ground() {
        let mut player = Player::new(240.0, 18.0, physics());
        assert!(player.jump_from_ground(true));
        assert_eq!(player.state, PlayerState::Jumping);
        assert_eq!(player.vel, Vec2::new(420.0, 620.0));
        // Only from the ground
        assert!(!player.jump_from_ground(false));
        assert_eq!(player.vel.x, 420.0);
    }

    #[test]
    fn test_gravity_integration() {
        let mut player = Player::new(240.0, 18.0, physics());
        player.jump_from_ground(true);
        let start = player.rect.origin();
        player.update(DT);
        let vy = 620.0 - 900.0 * DT;
        assert!((player.vel.y - vy).abs() < 1e-3);
        assert!((player.rect.y - (start.y + vy * DT)).abs() < 1e-3);
        assert!((player.rect.x - (start.x + 420.0 * DT)).abs() < 1e-3);
    }

    #[test]
    fn test_stick_snaps_flush_and_zeroes_velocity() {
        let (player, _) = on_left_wall();
        assert_eq!(player.state, PlayerState::OnWall);
        assert_eq!(player.rect.x, 40.0);
        assert!(player.on_wall_left);
        assert_eq!(player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_wall_slide_and_pinned_velocity() {
        let (mut player, _) = on_left_wall();
        player.update(0.5);
        assert_eq!(player.vel, Vec2::ZERO);
        assert!((player.rect.y - (200.0 - 60.0)).abs() < 1e-3);
    }

    #[test]
    fn test_stick_ignores_wrong_direction() {
        let walls = vec![wall(WallSide::Left, false)];
        let mut player = Player::new(60.0, 200.0, physics());
        player.state = PlayerState::Jumping;
        player.vel = Vec2::new(420.0, 0.0);
        player.rect.x = 39.0;
        assert!(!player.try_stick_to_wall(&walls));
        assert_eq!(player.state, PlayerState::Jumping);
    }

    #[test]
    fn test_stick_ignores_bounce_walls() {
        let walls = vec![wall(WallSide::Left, true)];
        let mut player = Player::new(60.0, 200.0, physics());
        player.state = PlayerState::Jumping;
        player.vel = Vec2::new(-420.0, 0.0);
        player.rect.x = 39.0;
        assert!(!player.try_stick_to_wall(&walls));
    }

    #[test]
    fn test_wall_jump_sets_lockout() {
        let (mut player, walls) = on_left_wall();
        assert!(player.jump_from_wall());
        assert_eq!(player.vel, Vec2::new(420.0, 620.0));
        assert!((player.rect.x - 40.6).abs() < 1e-4);
        assert!(player.regrab_locked());
        // Pull the body back into contact: still refused while locked
        player.vel.x = -420.0;
        player.rect.x = 39.0;
        assert!(!player.try_stick_to_wall(&walls));
        // Lockout expires
        player.update(0.2);
        player.rect.x = 39.0;
        player.vel.x = -420.0;
        assert!(player.try_stick_to_wall(&walls));
    }

    #[test]
    fn test_wall_jump_noop_without_wall_or_coyote() {
        let mut player = Player::new(240.0, 18.0, physics());
        player.state = PlayerState::Jumping;
        player.vel = Vec2::new(100.0, -50.0);
        let before = player.clone();
        assert!(!player.jump_from_wall());
        assert_eq!(player.state, before.state);
        assert_eq!(player.vel, before.vel);
        assert_eq!(player.rect, before.rect);
    }

    #[test]
    fn test_coyote_wall_jump_after_detach() {
        let (mut player, _) = on_left_wall();
        // Wall disappears: free fall, not a jump
        player.detach_from_wall_if_not_overlapping(&[]);
        assert_eq!(player.state, PlayerState::Jumping);
        assert_eq!(player.vel, Vec2::ZERO);
        player.update(0.05);
        assert!(player.can_wall_jump());
        assert!(player.jump_from_wall());
        assert_eq!(player.vel.x, 420.0);
    }

    #[test]
    fn test_coyote_expires() {
        let (mut player, _) = on_left_wall();
        player.detach_from_wall_if_not_overlapping(&[]);
        player.update(0.2);
        assert!(!player.can_wall_jump());
        assert!(!player.jump_from_wall());
    }

    #[test]
    fn test_detach_keeps_attachment_while_touching() {
        let (mut player, walls) = on_left_wall();
        player.detach_from_wall_if_not_overlapping(&walls);
        assert_eq!(player.state, PlayerState::OnWall);
    }

    #[test]
    fn test_double_jump_once_per_airborne_period() {
        let mut player = Player::new(240.0, 18.0, physics());
        player.jump_from_ground(true);
        player.update(DT);
        assert!(player.double_jump_flip());
        assert_eq!(player.vel, Vec2::new(-420.0, 620.0));
        assert!(player.regrab_locked());

        let before = player.clone();
        assert!(!player.double_jump_flip());
        assert_eq!(player.vel, before.vel);

        // Ground restores the charge
        player.land_on_ground(18.0);
        assert!(player.has_double_jump());
    }

    #[test]
    fn test_double_jump_requires_air() {
        let mut player = Player::new(240.0, 18.0, physics());
        assert!(!player.double_jump_flip());
        let (mut on_wall, _) = on_left_wall();
        assert!(!on_wall.double_jump_flip());
    }

    #[test]
    fn test_hold_raises_jump() {
        let mut held = Player::new(240.0, 18.0, physics());
        let mut tapped = held.clone();
        held.jump_from_ground(true);
        tapped.jump_from_ground(true);
        held.set_jump_held(true);
        for _ in 0..30 {
            held.update(DT);
            tapped.update(DT);
        }
        assert!(held.rect.y > tapped.rect.y);
        assert!(held.vel.y > tapped.vel.y);
    }

    #[test]
    fn test_hold_boost_is_capped() {
        let mut player = Player::new(240.0, 18.0, physics());
        player.jump_from_ground(true);
        player.set_jump_held(true);
        for _ in 0..120 {
            player.update(DT);
            assert!(player.vel.y <= physics().jump_hold_vy_cap);
        }
    }

    #[test]
    fn test_release_cuts_velocity() {
        let mut player = Player::new(240.0, 18.0, physics());
        player.jump_from_ground(true);
        player.set_jump_held(true);
        for _ in 0..6 {
            player.update(DT);
        }
        assert!(player.vel.y > physics().jump_cut_vy);
        player.set_jump_held(false);
        player.update(DT);
        assert!(player.vel.y <= physics().jump_cut_vy);
    }

    #[test]
    fn test_land_on_ground() {
        let mut player = Player::new(240.0, 18.0, physics());
        player.jump_from_ground(false);
        player.double_jump_flip();
        player.rect.y = 10.0;
        player.vel.y = -300.0;
        player.land_on_ground(18.0);
        assert_eq!(player.state, PlayerState::OnGround);
        assert_eq!(player.rect.y, 18.0);
        assert_eq!(player.vel, Vec2::ZERO);
        assert!(player.has_double_jump());
    }

    #[test]
    fn test_bounce_inverts_once() {
        let mut player = Player::new(240.0, 18.0, physics());
        player.jump_from_ground(false);
        player.bounce(BounceResult { x: 40.0, dir: 1.0 });
        assert_eq!(player.rect.x, 40.0);
        assert_eq!(player.vel.x, 420.0);
        assert!(player.on_wall_left);
    }

    #[test]
    fn test_dead_falls_without_horizontal_motion() {
        let mut player = Player::new(240.0, 300.0, physics());
        player.jump_from_ground(true);
        player.kill();
        let x = player.rect.x;
        for _ in 0..120 {
            player.update(DT);
        }
        assert_eq!(player.rect.x, x);
        assert!(player.rect.y < 300.0);
        assert!(!player.jump_from_wall());
        assert!(!player.double_jump_flip());
        player.land_on_ground(18.0);
        assert!(player.is_dead());
    }
}
