use glam::Vec2;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.x, self.y - 1),
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x + 1, self.y),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub fn to_vec(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::None => Vec2::ZERO,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Wanderer,
    CorridorFollower,
    PredictivePursuer,
    Charger,
}

impl EnemyKind {
    pub const ROTATION: [EnemyKind; 4] = [
        EnemyKind::Wanderer,
        EnemyKind::CorridorFollower,
        EnemyKind::PredictivePursuer,
        EnemyKind::Charger,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Dot,
    Steak,
    Bone,
    GoldSteak,
    SpeedBoost,
    SuperSnack,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Playing,
    LevelComplete,
    GameOver,
    Won,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Victory,
    OutOfLives,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerTint {
    Normal,
    Power,
    SpeedBoost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyVisual {
    Normal,
    Vulnerable,
    Warning,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    pub direction: Vec2,
}

impl TickInput {
    pub fn toward(direction: Vec2) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
        }
    }
}

impl From<Direction> for TickInput {
    fn from(direction: Direction) -> Self {
        Self {
            direction: direction.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "vx")]
    pub vel_x: f32,
    #[serde(rename = "vy")]
    pub vel_y: f32,
    pub tint: PlayerTint,
    pub flashing: bool,
    pub invulnerable: bool,
    pub alpha: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub active: bool,
    pub visual: EnemyVisual,
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemView {
    pub id: u32,
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct HudView {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    #[serde(rename = "bestScore")]
    pub best_score: u64,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    LevelStarted {
        level: u32,
        width: i32,
        height: i32,
    },
    ItemCollected {
        #[serde(rename = "itemId")]
        item_id: u32,
        kind: ItemKind,
        x: f32,
        y: f32,
        points: u64,
    },
    PowerModeChanged {
        active: bool,
    },
    SpeedBoostChanged {
        active: bool,
    },
    SuperSnackChanged {
        active: bool,
    },
    EnemyDefeated {
        #[serde(rename = "enemyId")]
        enemy_id: u32,
        x: f32,
        y: f32,
        points: u64,
        multiplier: u64,
    },
    EnemyRespawned {
        #[serde(rename = "enemyId")]
        enemy_id: u32,
        x: f32,
        y: f32,
    },
    ChargerWindUp {
        #[serde(rename = "enemyId")]
        enemy_id: u32,
    },
    ChargerCharge {
        #[serde(rename = "enemyId")]
        enemy_id: u32,
    },
    LifeLost {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    ExtraLife {
        lives: u32,
    },
    LevelCompleted {
        level: u32,
        bonus: u64,
    },
    GameOver {
        reason: GameOverReason,
        #[serde(rename = "finalScore")]
        final_score: u64,
    },
    Message {
        text: String,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub phase: GamePhase,
    pub hud: HudView,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub items: Vec<ItemView>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub reason: Option<GameOverReason>,
    #[serde(rename = "finalScore")]
    pub final_score: u64,
    #[serde(rename = "bestScore")]
    pub best_score: u64,
    pub level: u32,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}
