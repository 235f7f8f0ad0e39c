use glam::Vec2;

use crate::config::GameConfig;
use crate::constants::{BONE_ROLL, GOLD_STEAK_ROLL, SPEED_BOOST_ROLL, STEAK_ROLL, SUPER_SNACK_ROLL};
use crate::power::PowerFlags;
use crate::types::{Cell, ItemKind, PlayerTint};

pub(super) fn cell_center(cell: Cell, config: &GameConfig) -> Vec2 {
    let half = config.tile_size / 2.0;
    Vec2::new(
        cell.x as f32 * config.tile_size + half,
        cell.y as f32 * config.tile_size + half + config.hud_offset_y,
    )
}

pub(super) fn cell_at(pos: Vec2, config: &GameConfig) -> Cell {
    Cell::new(
        (pos.x / config.tile_size).floor() as i32,
        ((pos.y - config.hud_offset_y) / config.tile_size).floor() as i32,
    )
}

pub(super) fn roll_item_kind(roll: f32) -> ItemKind {
    if roll < SUPER_SNACK_ROLL {
        ItemKind::SuperSnack
    } else if roll < STEAK_ROLL {
        ItemKind::Steak
    } else if roll < BONE_ROLL {
        ItemKind::Bone
    } else if roll < GOLD_STEAK_ROLL {
        ItemKind::GoldSteak
    } else if roll < SPEED_BOOST_ROLL {
        ItemKind::SpeedBoost
    } else {
        ItemKind::Dot
    }
}

pub(super) fn player_tint(flags: PowerFlags) -> PlayerTint {
    if flags.power_mode {
        PlayerTint::Power
    } else if flags.speed_boost {
        PlayerTint::SpeedBoost
    } else {
        PlayerTint::Normal
    }
}

pub(super) fn approach_zero(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else {
        (value + amount).min(0.0)
    }
}
