//! Game state and core simulation types
//!
//! `GameWorld` owns everything that lives for one run: the player, the
//! wall generator, spike traps, coins and debris. The per-frame update
//! lives in `tick`.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::generator::{WallManager, WallSpawnObserver};
use super::player::Player;
use super::rect::Rect;
use super::spike::SpikeTrap;
use super::wall::{Wall, WallId, WallSide};
use crate::profile::RunReport;
use crate::tuning::{RunTuning, Tuning};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run in progress
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended
    GameOver,
}

/// Where a coin was placed relative to its wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinKind {
    /// Hugging the wall's inward face
    Wall,
    /// Midway between the columns
    Center,
}

/// A collectible coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub rect: Rect,
    pub collected: bool,
    pub kind: CoinKind,
    /// Wall the coin was spawned next to (lookup only)
    pub wall: Option<WallId>,
}

/// Debris piece thrown out when the player is shredded by spikes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerChunk {
    pub rect: Rect,
    pub vel: Vec2,
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Spikes,
    Fall,
}

/// Things the host may want to react to (sound, persistence, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { run_id: u64 },
    CoinCollected { total: u32 },
    PlayerDied { cause: DeathCause },
    /// The finished run beat the high score the host supplied
    NewHighScore { value: f32 },
    RunEnded(RunReport),
}

/// Coins in play, plus the placement policy for newly spawned walls
#[derive(Debug, Clone)]
pub struct CoinField {
    pub coins: Vec<Coin>,
    rng: Pcg32,
    next_id: u32,
    tuning: RunTuning,
    arena_width: f32,
    /// Current top of the floor; walls close to it get no coins
    floor_top: f32,
}

impl CoinField {
    pub fn new(tuning: RunTuning, arena_width: f32, floor_top: f32, seed: u64) -> Self {
        Self {
            coins: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
            arena_width,
            floor_top,
        }
    }

    pub fn set_floor_top(&mut self, floor_top: f32) {
        self.floor_top = floor_top;
    }

    /// Shift down and drop coins that left the window or were collected
    pub fn scroll(&mut self, dy: f32) {
        for coin in &mut self.coins {
            coin.rect.scroll(dy);
        }
        let retire_y = self.tuning.coin_retire_y;
        self.coins
            .retain(|c| !c.collected && c.rect.top() >= retire_y);
    }

    /// Collect every coin overlapping `body`; returns how many
    pub fn collect_overlapping(&mut self, body: &Rect) -> u32 {
        let mut gained = 0;
        for coin in &mut self.coins {
            if !coin.collected && coin.rect.overlaps(body) {
                coin.collected = true;
                gained += 1;
            }
        }
        self.coins.retain(|c| !c.collected);
        gained
    }
}

impl WallSpawnObserver for CoinField {
    fn on_wall_spawned(&mut self, wall: &Wall) {
        if wall.rect.y < self.floor_top + self.tuning.coin_floor_clearance {
            return;
        }
        if self.rng.random::<f32>() > self.tuning.coin_chance {
            return;
        }

        let size = self.tuning.coin_size;
        let kind = if self.rng.random_bool(0.5) {
            CoinKind::Wall
        } else {
            CoinKind::Center
        };
        let rect = match kind {
            CoinKind::Wall => {
                let padding = 4.0;
                let x = match wall.side {
                    WallSide::Left => wall.rect.right() + padding,
                    WallSide::Right => wall.rect.x - size - padding,
                };
                Rect::new(x, wall.rect.y + wall.rect.h * 0.6, size, size)
            }
            CoinKind::Center => Rect::new(
                (self.arena_width - size) * 0.5,
                wall.rect.y + wall.rect.h * 0.5,
                size,
                size,
            ),
        };

        let id = self.next_id;
        self.next_id += 1;
        self.coins.push(Coin {
            id,
            rect,
            collected: false,
            kind,
            wall: Some(wall.id),
        });
    }
}

/// Complete state of one game session
#[derive(Debug, Clone)]
pub struct GameWorld {
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    pub wall_manager: WallManager,
    pub coin_field: CoinField,
    /// Spike traps keyed by the wall that owns them
    pub spikes: BTreeMap<WallId, SpikeTrap>,
    pub chunks: Vec<PlayerChunk>,
    pub floor: Rect,
    pub floor_visible: bool,
    /// Height climbed so far this run
    pub current_height: f32,
    /// Best height this run
    pub best_height: f32,
    pub coins_collected: u32,
    /// Latched on the first accepted press
    pub started: bool,
    pub death_cause: Option<DeathCause>,
    /// Direction of the opening jump off the floor
    pub initial_jump_to_right: bool,
    pub(crate) death_timer: f32,
    pub(crate) input_lock: f32,
    run_id: u64,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameWorld {
    /// Create a world in the menu phase; call `init_run` to play
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let floor = Rect::new(0.0, 0.0, tuning.arena.width, tuning.arena.floor_height);
        let player = Player::new(tuning.arena.width * 0.5, floor.top(), tuning.physics);
        Self {
            tuning,
            phase: GamePhase::Menu,
            player,
            wall_manager: WallManager::new(&tuning, seed),
            coin_field: CoinField::new(tuning.run, tuning.arena.width, floor.top(), seed),
            spikes: BTreeMap::new(),
            chunks: Vec::new(),
            floor,
            floor_visible: true,
            current_height: 0.0,
            best_height: 0.0,
            coins_collected: 0,
            started: false,
            death_cause: None,
            initial_jump_to_right: true,
            death_timer: 0.0,
            input_lock: 0.0,
            run_id: 0,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Reset all run state and start playing
    pub fn init_run(&mut self) {
        let t = self.tuning;
        self.run_id = self.rng.random();
        self.started = false;
        self.current_height = 0.0;
        self.best_height = 0.0;
        self.coins_collected = 0;
        self.death_timer = 0.0;
        self.death_cause = None;
        self.chunks.clear();

        self.floor = Rect::new(0.0, 0.0, t.arena.width, t.arena.floor_height);
        self.floor_visible = true;
        let floor_top = self.floor.top();

        self.player = Player::new(t.arena.width * 0.5, floor_top, t.physics);
        self.coin_field = CoinField::new(t.run, t.arena.width, floor_top, self.rng.random());
        self.wall_manager = WallManager::new(&t, self.rng.random());

        self.initial_jump_to_right = self.rng.random_bool(0.5);
        self.wall_manager.spawn_first_from_ground(
            &self.player.rect,
            floor_top,
            self.initial_jump_to_right,
            &mut self.coin_field,
        );
        self.wall_manager.ensure_ahead(&mut self.coin_field);

        self.spikes.clear();
        self.sync_spikes();

        // Swallow the press that started the run
        self.input_lock = t.run.input_lock;
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::RunStarted {
            run_id: self.run_id,
        });
        log::info!(
            "Run {:#x} started: {} walls, first jump {}",
            self.run_id,
            self.wall_manager.walls().len(),
            if self.initial_jump_to_right { "right" } else { "left" }
        );
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn floor_top(&self) -> f32 {
        self.floor.top()
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coin_field.coins
    }

    pub fn walls(&self) -> &[Wall] {
        self.wall_manager.walls()
    }

    /// Remaining post-start input lock (seconds)
    pub fn input_lock(&self) -> f32 {
        self.input_lock
    }

    /// Wall the player is currently hanging on
    pub fn attached_wall(&self) -> Option<&Wall> {
        if !self.player.is_on_wall() {
            return None;
        }
        let side = if self.player.on_wall_left {
            WallSide::Left
        } else {
            WallSide::Right
        };
        self.walls()
            .iter()
            .filter(|w| w.side == side && w.is_sticky())
            .find(|w| self.player.rect.overlaps_vertically(&w.rect))
    }

    /// Trap on the wall the player is currently on
    pub fn attached_spike(&self) -> Option<&SpikeTrap> {
        self.attached_wall()
            .filter(|w| w.has_spikes)
            .and_then(|w| self.spikes.get(&w.id))
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn report(&self) -> RunReport {
        RunReport {
            run_id: self.run_id,
            best_height: self.best_height,
            coins: self.coins_collected,
        }
    }

    /// Drop traps whose wall retired, add traps for new hazardous walls,
    /// and re-anchor every hitbox to its wall's current position
    pub(crate) fn sync_spikes(&mut self) {
        let walls = self.wall_manager.walls();
        self.spikes
            .retain(|id, _| walls.iter().any(|w| w.id == *id));
        for wall in walls.iter().filter(|w| w.has_spikes) {
            self.spikes
                .entry(wall.id)
                .or_insert_with(|| SpikeTrap::new(wall, self.tuning.spikes));
        }
        for (id, trap) in self.spikes.iter_mut() {
            if let Some(wall) = walls.iter().find(|w| w.id == *id) {
                trap.refresh_hitbox(wall);
            }
        }
    }

    /// Kill the player. Spikes shred the body into debris.
    pub(crate) fn kill_player(&mut self, cause: DeathCause) {
        self.player.kill();
        self.death_timer = self.tuning.run.death_delay;
        self.death_cause = Some(cause);
        match cause {
            DeathCause::Spikes => self.spawn_chunks(),
            DeathCause::Fall => self.chunks.clear(),
        }
        self.events.push(GameEvent::PlayerDied { cause });
        log::debug!(
            "Player died ({:?}) at height {:.0}",
            cause,
            self.current_height
        );
    }

    fn spawn_chunks(&mut self) {
        self.chunks.clear();
        let run = self.tuning.run;
        let base = self.player.rect;
        let cols = run.chunk_cols.max(1);
        let rows = run.chunk_rows.max(1);
        let piece_w = base.w / cols as f32;
        let piece_h = base.h / rows as f32;

        for i in 0..cols {
            for j in 0..rows {
                let rect = Rect::new(
                    base.x + i as f32 * piece_w,
                    base.y + j as f32 * piece_h,
                    piece_w,
                    piece_h,
                );
                let vel = Vec2::new(
                    self.rng.random_range(-110.0..110.0),
                    self.rng.random_range(80.0..300.0),
                );
                self.chunks.push(PlayerChunk { rect, vel });
            }
        }
    }

    pub(crate) fn update_chunks(&mut self, dt: f32) {
        let gravity = self.tuning.run.chunk_gravity;
        let retire_y = self.tuning.run.chunk_retire_y;
        for chunk in &mut self.chunks {
            chunk.vel.y -= gravity * dt;
            chunk.rect.translate(chunk.vel * dt);
        }
        self.chunks.retain(|c| c.rect.top() >= retire_y);
    }
}
