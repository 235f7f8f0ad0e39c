use std::collections::{HashMap, HashSet, VecDeque};

use glam::Vec2;

use crate::engine::GameEngine;
use crate::maze::MazeGrid;
use crate::types::{Cell, GamePhase, TickInput};

const STEER_GAIN: f32 = 6.0;
const STEER_DEADBAND: f32 = 5.0;

/// Supplies the intended movement direction once per physics tick.
pub trait InputSource {
    fn next_input(&mut self, engine: &GameEngine) -> TickInput;
}

/// A held direction.
impl InputSource for TickInput {
    fn next_input(&mut self, _engine: &GameEngine) -> TickInput {
        *self
    }
}

/// Plays by walking the maze graph: flee when an enemy is close, otherwise
/// head for the nearest item (or enemy, while they are vulnerable).
#[derive(Clone, Debug)]
pub struct Autopilot {
    pub danger_radius_tiles: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            danger_radius_tiles: 2.5,
        }
    }
}

impl InputSource for Autopilot {
    fn next_input(&mut self, engine: &GameEngine) -> TickInput {
        if engine.phase() != GamePhase::Playing {
            return TickInput::default();
        }
        let maze = engine.maze();
        let player = &engine.player().body;
        let here = engine.cell_at(player.pos);
        let power_mode = engine.power().power_mode();

        let active_enemies = engine.enemies().iter().filter(|enemy| enemy.body.active);
        let threats: Vec<Cell> = if power_mode {
            Vec::new()
        } else {
            active_enemies
                .clone()
                .map(|enemy| engine.cell_at(enemy.body.pos))
                .collect()
        };
        let danger = self.danger_radius_tiles * engine.config.tile_size;
        let in_danger = !power_mode
            && active_enemies
                .clone()
                .any(|enemy| enemy.body.pos.distance(player.pos) < danger);

        let next = if in_danger {
            escape_step(maze, here, &threats)
        } else {
            let mut targets: HashSet<Cell> = engine
                .items()
                .iter()
                .map(|item| engine.cell_at(item.body.pos))
                .collect();
            if power_mode {
                targets.extend(active_enemies.map(|enemy| engine.cell_at(enemy.body.pos)));
            }
            let avoid: HashSet<Cell> = threats.into_iter().collect();
            next_step(maze, here, &targets, &avoid)
        };

        let target = engine.cell_center(next.unwrap_or(here));
        steer(player.pos, player.vel, target, engine.config.player_max_speed)
    }
}

/// First cell on a shortest path from `from` to any cell in `targets`,
/// never passing through `avoid`. Returns `from` itself when it is a target.
pub fn next_step(
    maze: &MazeGrid,
    from: Cell,
    targets: &HashSet<Cell>,
    avoid: &HashSet<Cell>,
) -> Option<Cell> {
    if targets.contains(&from) {
        return Some(from);
    }
    let mut parent: HashMap<Cell, Cell> = HashMap::new();
    let mut queue = VecDeque::new();
    parent.insert(from, from);
    queue.push_back(from);

    while let Some(cell) = queue.pop_front() {
        for next in cell.neighbors() {
            if !maze.is_open(next) || avoid.contains(&next) || parent.contains_key(&next) {
                continue;
            }
            parent.insert(next, cell);
            if targets.contains(&next) {
                let mut step = next;
                while let Some(prev) = parent.get(&step).copied() {
                    if prev == from {
                        return Some(step);
                    }
                    step = prev;
                }
                return None;
            }
            queue.push_back(next);
        }
    }
    None
}

/// Open neighbour that keeps the greatest Manhattan distance to the closest threat.
pub fn escape_step(maze: &MazeGrid, from: Cell, threats: &[Cell]) -> Option<Cell> {
    let nearest = |cell: Cell| {
        threats
            .iter()
            .map(|threat| (threat.x - cell.x).abs() + (threat.y - cell.y).abs())
            .min()
            .unwrap_or(i32::MAX)
    };
    let mut best: Option<(i32, Cell)> = None;
    for next in from.neighbors() {
        if !maze.is_open(next) {
            continue;
        }
        let dist = nearest(next);
        if best.map(|(d, _)| dist > d).unwrap_or(true) {
            best = Some((dist, next));
        }
    }
    best.map(|(_, cell)| cell)
}

/// Accelerates toward the velocity that would bring the player to `target`,
/// slowing as it gets close so corners are taken from the cell centre.
fn steer(pos: Vec2, vel: Vec2, target: Vec2, max_speed: f32) -> TickInput {
    let offset = target - pos;
    let desired = offset.normalize_or_zero() * (offset.length() * STEER_GAIN).min(max_speed);
    let correction = desired - vel;
    if correction.length() < STEER_DEADBAND {
        return TickInput::default();
    }
    TickInput::toward(correction)
}
