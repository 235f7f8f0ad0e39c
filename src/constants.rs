pub const TICK_RATE: u32 = 60;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;
pub const AI_INTERVAL_MS: u64 = 500;

pub const TILE_SIZE: f32 = 50.0;
pub const HUD_OFFSET_Y: f32 = 100.0;
pub const CHARACTER_RADIUS: f32 = 20.0;
pub const DOT_RADIUS: f32 = 7.5;
pub const ITEM_RADIUS: f32 = 15.0;

pub const PLAYER_ACCELERATION: f32 = 1200.0;
pub const PLAYER_MAX_SPEED: f32 = 250.0;
pub const PLAYER_DRAG: f32 = 800.0;
pub const STARTING_LIVES: u32 = 3;
pub const INVULNERABLE_MS: u64 = 1_500;

pub const ENEMY_BASE_SPEED: f32 = 100.0;
pub const ENEMY_SPEED_PER_LEVEL: f32 = 20.0;
pub const ENEMY_MAX_SPEED: f32 = 300.0;
pub const WANDERER_SPEED_FACTOR: f32 = 0.75;
pub const CHARGER_WINDUP_MS: u64 = 400;
pub const CHARGER_SPEED_MULTIPLIER: f32 = 1.6;
pub const CHARGER_RELEASE_FACTOR: f32 = 1.2;
pub const CHARGER_RANGE_BASE_TILES: u32 = 5;
pub const CHARGER_RANGE_LEVEL_INTERVAL: u32 = 5;
pub const LOOKAHEAD_BASE_SECS: f32 = 0.4;
pub const LOOKAHEAD_PER_LEVEL_SECS: f32 = 0.05;
pub const LOOKAHEAD_MAX_SECS: f32 = 1.2;
pub const RESPAWN_MIN_SEPARATION_TILES: f32 = 5.0;
pub const RESPAWN_MAX_ATTEMPTS: usize = 64;

pub const POWER_DURATION_MS: u64 = 6_000;
pub const SPEED_BOOST_DURATION_MS: u64 = 5_000;
pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
pub const SUPER_SNACK_DURATION_MS: u64 = 10_000;
pub const SUPER_SNACK_SPEED_MULTIPLIER: f32 = 1.25;

pub const DOT_SCORE: u64 = 10;
pub const DOT_CHAIN_BONUS: u64 = 5;
pub const DOT_CHAIN_RESET_MS: u64 = 2_000;
pub const STEAK_SCORE: u64 = 50;
pub const GOLD_STEAK_SCORE: u64 = 500;
pub const ENEMY_SCORE: u64 = 200;
pub const LEVEL_COMPLETE_BONUS: u64 = 1_000;

pub const MAZE_BASE_WIDTH: i32 = 15;
pub const MAZE_BASE_HEIGHT: i32 = 11;
pub const MAZE_SIZE_INTERVAL: u32 = 5;
pub const LOOP_DENSITY: f32 = 0.25;
pub const MAX_LEVEL: u32 = 10;
pub const LEVEL_TRANSITION_MS: u64 = 1_500;

/// Cumulative roll thresholds used when populating an open cell.
pub const SUPER_SNACK_ROLL: f32 = 0.015;
pub const STEAK_ROLL: f32 = 0.04;
pub const BONE_ROLL: f32 = 0.055;
pub const GOLD_STEAK_ROLL: f32 = 0.07;
pub const SPEED_BOOST_ROLL: f32 = 0.085;
