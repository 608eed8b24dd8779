use crate::config::SessionConfig;
use crate::constants::{score_at, CAUGHT_MESSAGE, ESCAPED_MESSAGE, MAX_STEP_SLICE_MS};
use crate::entities::{place_entities, EntitySet};
use crate::grid::{cell_of_point, Grid};
use crate::maze::generate_maze;
use crate::movement::resolve_move;
use crate::player::Player;
use crate::rng::Rng;
use crate::types::{
    Command, Direction, GameOutcome, GameSummary, InputState, MazeView, RuntimeEvent,
    SessionState, Snapshot,
};

mod collision_system;
mod spawn_system;

/// Owns everything a running game needs and advances it through `step`.
///
/// The session keeps its own clock: only time delivered through `step`
/// while playing and unpaused counts, so pausing freezes buff expiry,
/// score decay and the regeneration timer together.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub config: SessionConfig,
    pub seed: u32,

    rng: Rng,
    grid: Grid,
    player: Player,
    entities: EntitySet,
    input: InputState,
    events: Vec<RuntimeEvent>,

    state: SessionState,
    paused: bool,
    outcome: Option<GameOutcome>,
    elapsed_ms: u64,
    last_regen_ms: u64,
    notice_started_ms: Option<u64>,
    regenerations: u32,
    tick_counter: u64,
}

impl GameSession {
    pub fn new(config: SessionConfig, seed: u32) -> Self {
        let mut rng = Rng::new(seed);
        let mut grid = Grid::new(config.cols, config.rows);
        generate_maze(&mut grid, &mut rng);
        let player = Player::spawn(&config);
        let entities = place_entities(&config, &mut rng);

        Self {
            config,
            seed,
            rng,
            grid,
            player,
            entities,
            input: InputState::default(),
            events: Vec::new(),
            state: SessionState::Menu,
            paused: false,
            outcome: None,
            elapsed_ms: 0,
            last_regen_ms: 0,
            notice_started_ms: None,
            regenerations: 0,
            tick_counter: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Playing && !self.paused
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn score(&self) -> i64 {
        score_at(
            self.elapsed_ms,
            self.config.max_score,
            self.config.score_decrement,
            self.config.score_interval_ms,
        )
    }

    pub fn notice_active(&self) -> bool {
        self.notice_started_ms
            .map(|started| self.elapsed_ms.saturating_sub(started) < self.config.notice_duration_ms)
            .unwrap_or(false)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn input(&self) -> InputState {
        self.input
    }

    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    pub fn hold(&mut self, dir: Direction, held: bool) {
        self.input.set(dir, held);
    }

    pub fn apply(&mut self, command: Command) -> bool {
        match (self.state, command) {
            (SessionState::Menu, Command::Start) => {
                self.reset_game();
                true
            }
            (SessionState::Menu, Command::ShowInfo) => {
                self.state = SessionState::Info;
                true
            }
            (SessionState::Menu, Command::ShowCredits) => {
                self.state = SessionState::Credits;
                true
            }
            (SessionState::Info | SessionState::Credits, Command::Back) => {
                self.state = SessionState::Menu;
                true
            }
            (SessionState::Playing, Command::TogglePause) => {
                self.paused = !self.paused;
                self.events.push(if self.paused {
                    RuntimeEvent::Paused
                } else {
                    RuntimeEvent::Resumed
                });
                true
            }
            (SessionState::Won | SessionState::Lost, Command::Restart) => {
                self.reset_game();
                true
            }
            (SessionState::Won | SessionState::Lost, Command::Menu) => {
                self.state = SessionState::Menu;
                self.paused = false;
                self.outcome = None;
                true
            }
            _ => false,
        }
    }

    /// Advances the simulation by `dt_ms`. No-op unless playing and unpaused.
    /// Long frames are cut into slices so a single move never spans a cell.
    pub fn step(&mut self, dt_ms: u64) {
        if !self.is_running() {
            return;
        }
        self.tick_counter += 1;

        let mut remaining = dt_ms;
        while remaining > 0 && self.state == SessionState::Playing {
            let slice = remaining.min(MAX_STEP_SLICE_MS);
            remaining -= slice;
            self.advance(slice);
        }
    }

    fn advance(&mut self, slice_ms: u64) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(slice_ms);
        let now_ms = self.elapsed_ms;

        if now_ms.saturating_sub(self.last_regen_ms) > self.config.regen_interval_ms {
            self.regenerate_world(now_ms);
        }

        for enemy in &mut self.entities.enemies {
            enemy.advance(slice_ms);
        }

        self.update_player(slice_ms, now_ms);

        self.check_enemy_collision();
        if self.is_ended() {
            return;
        }
        self.check_trap_collision();
        self.check_power_up_collision(now_ms);
        self.check_exit();
    }

    fn update_player(&mut self, slice_ms: u64, now_ms: u64) {
        let (vx, vy) = self.player.velocity(&self.input, now_ms);
        if vx == 0.0 && vy == 0.0 {
            return;
        }
        let dt_sec = slice_ms as f32 / 1000.0;
        let outcome = resolve_move(
            &self.grid,
            self.config.cell_size,
            &mut self.player,
            vx * dt_sec,
            vy * dt_sec,
        );
        let remaining = self.player.jump_charges;
        for axis in outcome.jumps() {
            self.events
                .push(RuntimeEvent::JumpChargeUsed { axis, remaining });
        }
    }

    pub fn player_cell(&self) -> (i32, i32) {
        cell_of_point(self.player.x, self.player.y, self.config.cell_size)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let now_ms = self.elapsed_ms;
        Snapshot {
            tick: self.tick_counter,
            state: self.state,
            paused: self.paused,
            elapsed_ms: now_ms,
            score: self.score(),
            notice_active: self.notice_active(),
            torch_radius: self.config.torch_radius,
            maze: MazeView {
                cols: self.grid.cols(),
                rows: self.grid.rows(),
                cell_size: self.config.cell_size,
                walls: self.grid.wall_flags(),
                exit: self.config.exit_cell(),
            },
            player: self.player.view(now_ms),
            enemies: self.entities.enemies.iter().map(|e| e.view()).collect(),
            traps: self.entities.traps.iter().map(|t| t.view()).collect(),
            power_ups: self.entities.power_ups.iter().map(|p| p.view()).collect(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                self.events.clone()
            },
        }
    }

    pub fn build_summary(&self) -> Option<GameSummary> {
        let outcome = self.outcome?;
        let message = match outcome {
            GameOutcome::Escaped => ESCAPED_MESSAGE,
            GameOutcome::Caught => CAUGHT_MESSAGE,
        };
        Some(GameSummary {
            outcome,
            message: message.to_string(),
            elapsed_ms: self.elapsed_ms,
            seconds: self.elapsed_ms / 1000,
            score: self.score(),
            regenerations: self.regenerations,
        })
    }
}
