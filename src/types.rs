use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Speed,
    #[serde(alias = "illum")]
    Illumination,
    Jump,
}

impl PowerUpKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "speed" => Some(Self::Speed),
            "illum" | "illumination" => Some(Self::Illumination),
            "jump" => Some(Self::Jump),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Menu,
    Info,
    Credits,
    Playing,
    Won,
    Lost,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Escaped,
    Caught,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    ShowInfo,
    ShowCredits,
    Back,
    TogglePause,
    Restart,
    Menu,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn only(dir: Direction) -> Self {
        let mut input = Self::default();
        input.set(dir, true);
        input
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MazeView {
    pub cols: i32,
    pub rows: i32,
    #[serde(rename = "cellSize")]
    pub cell_size: f32,
    pub walls: Vec<[bool; 4]>,
    pub exit: (i32, i32),
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "speedMultiplier")]
    pub speed_multiplier: f32,
    #[serde(rename = "speedUntil")]
    pub speed_until: u64,
    #[serde(rename = "illuminatedUntil")]
    pub illuminated_until: u64,
    pub illuminated: bool,
    #[serde(rename = "jumpCharges")]
    pub jump_charges: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnemyView {
    pub id: usize,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct TrapView {
    pub i: i32,
    pub j: i32,
    pub active: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PowerUpView {
    pub i: i32,
    pub j: i32,
    pub kind: PowerUpKind,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    SessionStarted,
    Paused,
    Resumed,
    MazeRegenerated {
        #[serde(rename = "atMs")]
        at_ms: u64,
    },
    TrapTriggered {
        i: i32,
        j: i32,
    },
    PowerUpTaken {
        kind: PowerUpKind,
        #[serde(rename = "untilMs", skip_serializing_if = "Option::is_none")]
        until_ms: Option<u64>,
    },
    JumpChargeUsed {
        axis: Axis,
        remaining: u32,
    },
    PlayerCaught {
        #[serde(rename = "enemyId")]
        enemy_id: usize,
    },
    PlayerEscaped,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub state: SessionState,
    pub paused: bool,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub score: i64,
    #[serde(rename = "noticeActive")]
    pub notice_active: bool,
    #[serde(rename = "torchRadius")]
    pub torch_radius: f32,
    pub maze: MazeView,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub traps: Vec<TrapView>,
    #[serde(rename = "powerUps")]
    pub power_ups: Vec<PowerUpView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub outcome: GameOutcome,
    pub message: String,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub seconds: u64,
    pub score: i64,
    pub regenerations: u32,
}
