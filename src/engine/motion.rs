use super::*;

use crate::entity::{Blocked, Body};

const EDGE_EPSILON: f32 = 1e-3;

impl GameEngine {
    pub(super) fn move_player(&mut self, input: &TickInput, dt: f32) {
        let accel = input.direction.normalize_or_zero() * self.config.player_acceleration;
        self.player.accel = accel;

        let mut vel = self.player.body.vel + accel * dt;
        let drag = self.config.player_drag * dt;
        if accel.x == 0.0 {
            vel.x = approach_zero(vel.x, drag);
        }
        if accel.y == 0.0 {
            vel.y = approach_zero(vel.y, drag);
        }
        let max_speed = self.config.player_max_speed * self.power.speed_multiplier(&self.config);
        self.player.body.vel = vel.clamp_length_max(max_speed);

        let bounds = self.world_bounds();
        let hit = move_body(&self.maze, &self.config, bounds, &mut self.player.body, dt);
        self.player.body.blocked = hit;
    }

    pub(super) fn move_enemies(&mut self, dt: f32) {
        let bounds = self.world_bounds();
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.body.active) {
            let hit = move_body(&self.maze, &self.config, bounds, &mut enemy.body, dt);
            enemy.body.blocked.merge(hit);
        }
    }

    pub(super) fn world_bounds(&self) -> Vec2 {
        let (width, height) = self
            .config
            .world_bounds(self.maze.width(), self.maze.height());
        Vec2::new(width, height)
    }
}

pub(super) fn move_body(
    maze: &MazeGrid,
    config: &GameConfig,
    bounds: Vec2,
    body: &mut Body,
    dt: f32,
) -> Blocked {
    let mut blocked = Blocked::default();
    let step = body.vel * dt;

    if step.x != 0.0 {
        body.pos.x += step.x;
        if let Some(snapped) = wall_snap_x(maze, config, body, step.x) {
            body.pos.x = snapped;
            body.vel.x = 0.0;
            if step.x > 0.0 {
                blocked.right = true;
            } else {
                blocked.left = true;
            }
        }
    }
    if step.y != 0.0 {
        body.pos.y += step.y;
        if let Some(snapped) = wall_snap_y(maze, config, body, step.y) {
            body.pos.y = snapped;
            body.vel.y = 0.0;
            if step.y > 0.0 {
                blocked.down = true;
            } else {
                blocked.up = true;
            }
        }
    }

    let r = body.radius;
    if body.pos.x < r {
        body.pos.x = r;
        body.vel.x = body.vel.x.max(0.0);
        blocked.left = true;
    } else if body.pos.x > bounds.x - r {
        body.pos.x = bounds.x - r;
        body.vel.x = body.vel.x.min(0.0);
        blocked.right = true;
    }
    if body.pos.y < r {
        body.pos.y = r;
        body.vel.y = body.vel.y.max(0.0);
        blocked.up = true;
    } else if body.pos.y > bounds.y - r {
        body.pos.y = bounds.y - r;
        body.vel.y = body.vel.y.min(0.0);
        blocked.down = true;
    }
    blocked
}

fn covered(lo: f32, hi: f32, tile: f32, offset: f32) -> (i32, i32) {
    (
        ((lo - offset) / tile).floor() as i32,
        ((hi - offset - EDGE_EPSILON) / tile).floor() as i32,
    )
}

fn wall_snap_x(maze: &MazeGrid, config: &GameConfig, body: &Body, dx: f32) -> Option<f32> {
    let tile = config.tile_size;
    let r = body.radius;
    let (x0, x1) = covered(body.pos.x - r, body.pos.x + r, tile, 0.0);
    let (y0, y1) = covered(body.pos.y - r, body.pos.y + r, tile, config.hud_offset_y);
    let col = if dx > 0.0 { x1 } else { x0 };
    let hit = (y0..=y1).any(|row| maze.is_wall(Cell::new(col, row)));
    if !hit {
        return None;
    }
    Some(if dx > 0.0 {
        col as f32 * tile - r
    } else {
        (col + 1) as f32 * tile + r
    })
}

fn wall_snap_y(maze: &MazeGrid, config: &GameConfig, body: &Body, dy: f32) -> Option<f32> {
    let tile = config.tile_size;
    let hud = config.hud_offset_y;
    let r = body.radius;
    let (x0, x1) = covered(body.pos.x - r, body.pos.x + r, tile, 0.0);
    let (y0, y1) = covered(body.pos.y - r, body.pos.y + r, tile, hud);
    let row = if dy > 0.0 { y1 } else { y0 };
    let hit = (x0..=x1).any(|col| maze.is_wall(Cell::new(col, row)));
    if !hit {
        return None;
    }
    Some(if dy > 0.0 {
        row as f32 * tile + hud - r
    } else {
        (row + 1) as f32 * tile + hud + r
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::move_body;
    use crate::config::GameConfig;
    use crate::entity::Body;
    use crate::maze::MazeGrid;

    fn corridor() -> MazeGrid {
        MazeGrid::from_rows(&["#####", "#...#", "#####"])
    }

    #[test]
    fn wall_stops_the_blocked_axis_only() {
        let config = GameConfig::default();
        let maze = corridor();
        let bounds = Vec2::new(250.0, 250.0);
        // Centre of (1, 1).
        let mut body = Body::new(Vec2::new(75.0, 175.0), 20.0);
        let mut last = Default::default();
        for _ in 0..30 {
            body.vel = Vec2::new(-300.0, 0.0);
            last = move_body(&maze, &config, bounds, &mut body, 0.016);
        }
        assert!(last.left);
        assert_eq!(body.vel.x, 0.0);
        assert!((body.pos.x - 70.0).abs() < 1e-3);

        body.vel = Vec2::new(200.0, 0.0);
        let hit = move_body(&maze, &config, bounds, &mut body, 0.016);
        assert!(!hit.any());
        assert!(body.pos.x > 70.0);
    }

    #[test]
    fn vertical_wall_contact_keeps_horizontal_motion() {
        let config = GameConfig::default();
        let maze = corridor();
        let bounds = Vec2::new(250.0, 250.0);
        let mut body = Body::new(Vec2::new(125.0, 175.0), 20.0);
        body.vel = Vec2::new(100.0, -100.0);
        let hit = move_body(&maze, &config, bounds, &mut body, 0.1);
        assert!(hit.up);
        assert_eq!(body.vel, Vec2::new(100.0, 0.0));
        assert!((body.pos.y - 170.0).abs() < 1e-3);
        assert!((body.pos.x - 135.0).abs() < 1e-3);
    }
}
