use crate::config::SessionConfig;
use crate::grid::{cell_center, Grid};
use crate::player::Player;
use crate::rng::Rng;
use crate::types::{EnemyView, Point, PowerUpKind, PowerUpView, TrapView};

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: usize,
    pub anchor: Point,
    pub radius: f32,
    pub angular_speed: f32,
    pub angle: f32,
}

impl Enemy {
    pub fn position(&self) -> Point {
        Point::new(
            self.anchor.x + self.angle.cos() * self.radius,
            self.anchor.y + self.angle.sin() * self.radius,
        )
    }

    pub fn advance(&mut self, dt_ms: u64) {
        self.angle += self.angular_speed * dt_ms as f32 / 1000.0;
        self.angle %= std::f32::consts::TAU;
    }

    pub fn view(&self) -> EnemyView {
        let pos = self.position();
        EnemyView {
            id: self.id,
            x: pos.x,
            y: pos.y,
            radius: self.radius,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trap {
    pub i: i32,
    pub j: i32,
    pub active: bool,
}

impl Trap {
    pub fn contains(&self, point: Point, cell_size: f32) -> bool {
        let left = self.i as f32 * cell_size;
        let top = self.j as f32 * cell_size;
        point.x > left && point.x < left + cell_size && point.y > top && point.y < top + cell_size
    }

    pub fn trigger(&mut self, grid: &mut Grid) {
        grid.toggle_walls(self.i, self.j);
        self.active = false;
    }

    pub fn view(&self) -> TrapView {
        TrapView {
            i: self.i,
            j: self.j,
            active: self.active,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub i: i32,
    pub j: i32,
    pub kind: PowerUpKind,
    pub active: bool,
}

impl PowerUp {
    pub fn center(&self, cell_size: f32) -> Point {
        let (x, y) = cell_center(self.i, self.j, cell_size);
        Point::new(x, y)
    }

    pub fn apply(&mut self, player: &mut Player, now_ms: u64, config: &SessionConfig) -> Option<u64> {
        self.active = false;
        match self.kind {
            PowerUpKind::Speed => {
                let until = now_ms + config.speed_duration_ms;
                player.grant_speed(config.speed_multiplier, until);
                Some(until)
            }
            PowerUpKind::Illumination => {
                let until = now_ms + config.illumination_duration_ms;
                player.grant_illumination(until);
                Some(until)
            }
            PowerUpKind::Jump => {
                player.grant_jumps(config.jump_charges_per_pickup);
                None
            }
        }
    }

    pub fn view(&self) -> PowerUpView {
        PowerUpView {
            i: self.i,
            j: self.j,
            kind: self.kind,
            active: self.active,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntitySet {
    pub enemies: Vec<Enemy>,
    pub traps: Vec<Trap>,
    pub power_ups: Vec<PowerUp>,
}

pub fn place_entities(config: &SessionConfig, rng: &mut Rng) -> EntitySet {
    let enemies = (0..config.enemy_count)
        .map(|id| {
            let (i, j) = rng.cell(config.cols, config.rows);
            let (x, y) = cell_center(i, j, config.cell_size);
            let cells = rng.int(config.enemy_patrol_cells_min, config.enemy_patrol_cells_max);
            Enemy {
                id,
                anchor: Point::new(x, y),
                radius: config.cell_size * cells as f32,
                angular_speed: config.enemy_angular_speed,
                angle: 0.0,
            }
        })
        .collect();

    let traps = (0..config.trap_count)
        .map(|_| {
            let (i, j) = rng.cell(config.cols, config.rows);
            Trap { i, j, active: true }
        })
        .collect();

    let power_ups = config
        .power_up_kinds
        .iter()
        .map(|kind| {
            let (i, j) = rng.cell(config.cols, config.rows);
            PowerUp {
                i,
                j,
                kind: *kind,
                active: true,
            }
        })
        .collect();

    EntitySet {
        enemies,
        traps,
        power_ups,
    }
}
