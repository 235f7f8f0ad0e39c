use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Tunables for one playthrough. Every field falls back to the value in
/// `constants` when absent from a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub tile_size: f32,
    pub hud_offset_y: f32,
    pub character_radius: f32,
    pub dot_radius: f32,
    pub item_radius: f32,

    pub player_acceleration: f32,
    pub player_max_speed: f32,
    pub player_drag: f32,
    pub starting_lives: u32,
    pub invulnerable_ms: u64,

    pub ai_interval_ms: u64,
    pub enemy_base_speed: f32,
    pub enemy_speed_per_level: f32,
    pub enemy_max_speed: f32,
    pub wanderer_speed_factor: f32,
    pub charger_windup_ms: u64,
    pub charger_speed_multiplier: f32,
    pub charger_release_factor: f32,
    pub charger_range_base_tiles: u32,
    pub charger_range_level_interval: u32,
    pub lookahead_base_secs: f32,
    pub lookahead_per_level_secs: f32,
    pub lookahead_max_secs: f32,
    pub respawn_min_separation_tiles: f32,
    pub respawn_max_attempts: usize,

    pub power_duration_ms: u64,
    pub speed_boost_duration_ms: u64,
    pub speed_boost_multiplier: f32,
    pub super_snack_duration_ms: u64,
    pub super_snack_speed_multiplier: f32,

    pub dot_score: u64,
    pub dot_chain_bonus: u64,
    pub dot_chain_reset_ms: u64,
    pub steak_score: u64,
    pub gold_steak_score: u64,
    pub enemy_score: u64,
    pub level_complete_bonus: u64,

    pub maze_base_width: i32,
    pub maze_base_height: i32,
    pub maze_size_interval: u32,
    pub loop_density: f32,
    pub max_level: u32,
    pub level_transition_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            hud_offset_y: HUD_OFFSET_Y,
            character_radius: CHARACTER_RADIUS,
            dot_radius: DOT_RADIUS,
            item_radius: ITEM_RADIUS,
            player_acceleration: PLAYER_ACCELERATION,
            player_max_speed: PLAYER_MAX_SPEED,
            player_drag: PLAYER_DRAG,
            starting_lives: STARTING_LIVES,
            invulnerable_ms: INVULNERABLE_MS,
            ai_interval_ms: AI_INTERVAL_MS,
            enemy_base_speed: ENEMY_BASE_SPEED,
            enemy_speed_per_level: ENEMY_SPEED_PER_LEVEL,
            enemy_max_speed: ENEMY_MAX_SPEED,
            wanderer_speed_factor: WANDERER_SPEED_FACTOR,
            charger_windup_ms: CHARGER_WINDUP_MS,
            charger_speed_multiplier: CHARGER_SPEED_MULTIPLIER,
            charger_release_factor: CHARGER_RELEASE_FACTOR,
            charger_range_base_tiles: CHARGER_RANGE_BASE_TILES,
            charger_range_level_interval: CHARGER_RANGE_LEVEL_INTERVAL,
            lookahead_base_secs: LOOKAHEAD_BASE_SECS,
            lookahead_per_level_secs: LOOKAHEAD_PER_LEVEL_SECS,
            lookahead_max_secs: LOOKAHEAD_MAX_SECS,
            respawn_min_separation_tiles: RESPAWN_MIN_SEPARATION_TILES,
            respawn_max_attempts: RESPAWN_MAX_ATTEMPTS,
            power_duration_ms: POWER_DURATION_MS,
            speed_boost_duration_ms: SPEED_BOOST_DURATION_MS,
            speed_boost_multiplier: SPEED_BOOST_MULTIPLIER,
            super_snack_duration_ms: SUPER_SNACK_DURATION_MS,
            super_snack_speed_multiplier: SUPER_SNACK_SPEED_MULTIPLIER,
            dot_score: DOT_SCORE,
            dot_chain_bonus: DOT_CHAIN_BONUS,
            dot_chain_reset_ms: DOT_CHAIN_RESET_MS,
            steak_score: STEAK_SCORE,
            gold_steak_score: GOLD_STEAK_SCORE,
            enemy_score: ENEMY_SCORE,
            level_complete_bonus: LEVEL_COMPLETE_BONUS,
            maze_base_width: MAZE_BASE_WIDTH,
            maze_base_height: MAZE_BASE_HEIGHT,
            maze_size_interval: MAZE_SIZE_INTERVAL,
            loop_density: LOOP_DENSITY,
            max_level: MAX_LEVEL,
            level_transition_ms: LEVEL_TRANSITION_MS,
        }
    }
}

impl GameConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size.is_nan() || self.tile_size <= 0.0 {
            return Err(ConfigError::Invalid("tileSize must be positive".to_string()));
        }
        if self.character_radius * 2.0 >= self.tile_size {
            return Err(ConfigError::Invalid(
                "characterRadius must fit inside one corridor".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.loop_density) {
            return Err(ConfigError::Invalid(
                "loopDensity must be within [0, 1]".to_string(),
            ));
        }
        if self.max_level == 0
            || self.maze_size_interval == 0
            || self.charger_range_level_interval == 0
        {
            return Err(ConfigError::Invalid(
                "maxLevel, mazeSizeInterval and chargerRangeLevelInterval must be at least 1"
                    .to_string(),
            ));
        }
        if self.ai_interval_ms == 0 {
            return Err(ConfigError::Invalid("aiIntervalMs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Maze dimensions grow by two cells in each axis every `maze_size_interval` levels.
    pub fn maze_size(&self, level: u32) -> (i32, i32) {
        let step = (level.max(1) - 1) / self.maze_size_interval;
        let grow = step as i32 * 2;
        (self.maze_base_width + grow, self.maze_base_height + grow)
    }

    pub fn enemy_count(&self, level: u32) -> usize {
        4 + (level / self.maze_size_interval) as usize
    }

    pub fn enemy_speed(&self, level: u32) -> f32 {
        let raw = self.enemy_base_speed + (level.max(1) - 1) as f32 * self.enemy_speed_per_level;
        raw.min(self.enemy_max_speed)
    }

    pub fn charger_activation_range(&self, level: u32) -> f32 {
        let tiles = self.charger_range_base_tiles + level / self.charger_range_level_interval;
        self.tile_size * tiles as f32
    }

    /// Seconds of player motion the predictive pursuer extrapolates.
    pub fn predictive_lookahead_secs(&self, level: u32) -> f32 {
        (self.lookahead_base_secs + level as f32 * self.lookahead_per_level_secs)
            .min(self.lookahead_max_secs)
    }

    pub fn respawn_min_separation(&self) -> f32 {
        self.tile_size * self.respawn_min_separation_tiles
    }

    pub fn enemy_respawn_delay_ms(&self) -> u64 {
        self.power_duration_ms + self.power_duration_ms / 2
    }

    /// World extent in pixels: the maze plus the HUD strip on top.
    pub fn world_bounds(&self, width: i32, height: i32) -> (f32, f32) {
        (
            width as f32 * self.tile_size,
            height as f32 * self.tile_size + self.hud_offset_y,
        )
    }
}
