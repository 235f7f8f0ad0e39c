use super::*;

impl GameEngine {
    pub(super) fn start_level(&mut self, level: u32) {
        let cancelled = self.timers.cancel_all();
        if cancelled > 0 {
            log::debug!("level {level}: cancelled {cancelled} pending timers");
        }
        let before = self.power.flags();
        self.power.reset_for_level();
        self.emit_power_changes(before);

        self.session.set_level(level);
        let (width, height) = self.config.maze_size(level);
        self.maze = generate_maze(width, height, self.config.loop_density, &mut self.rng);
        let start = self.maze.start().unwrap_or(Cell::new(1, 1));
        self.start_pos = cell_center(start, &self.config);
        self.player.respawn_at(self.start_pos);
        self.player.invulnerable = false;
        self.invulnerable_timer = None;
        self.enemy_speed = self.config.enemy_speed(level);
        self.contacts.clear();
        self.ai_elapsed_ms = 0;

        self.place_items();
        self.spawn_enemies(level);
        self.phase = GamePhase::Playing;

        log::info!(
            "level {level} started: {width}x{height}, {} items, {} enemies",
            self.items.len(),
            self.enemies.len()
        );
        self.events.push(RuntimeEvent::LevelStarted {
            level,
            width,
            height,
        });
        self.events.push(RuntimeEvent::Message {
            text: format!("Level {level}"),
        });
    }

    fn place_items(&mut self) {
        self.items.clear();
        for cell in self.maze.open_cells() {
            let kind = roll_item_kind(self.rng.next_f32());
            let radius = match kind {
                ItemKind::Dot => self.config.dot_radius,
                _ => self.config.item_radius,
            };
            let id = self.make_id();
            let pos = cell_center(cell, &self.config);
            self.items.push(Item::new(id, kind, pos, radius));
        }
    }

    fn spawn_enemies(&mut self, level: u32) {
        self.enemies.clear();
        let anchors = self.enemy_anchors();
        if anchors.is_empty() {
            return;
        }
        let count = self.config.enemy_count(level);
        for index in 0..count {
            let kind = EnemyKind::ROTATION[index % EnemyKind::ROTATION.len()];
            let pos = cell_center(anchors[index % anchors.len()], &self.config);
            let id = self.make_id();
            self.enemies.push(Enemy::new(
                id,
                kind,
                pos,
                self.config.character_radius,
                self.enemy_speed,
            ));
        }
    }

    fn enemy_anchors(&self) -> Vec<Cell> {
        let w = self.maze.width();
        let h = self.maze.height();
        [
            Cell::new(w - 2, 1),
            Cell::new(1, h - 2),
            Cell::new(w - 2, h - 2),
            Cell::new(w / 2, h / 2),
        ]
        .into_iter()
        .filter_map(|anchor| self.maze.nearest_open(anchor))
        .collect()
    }

    pub(super) fn respawn_enemy(&mut self, enemy_id: u32) {
        let Some(idx) = self.enemy_index(enemy_id) else {
            return;
        };
        if self.enemies[idx].body.active {
            return;
        }
        let Some(cell) = self.pick_respawn_cell() else {
            log::warn!("enemy {enemy_id}: maze has no open cell to respawn into");
            return;
        };
        let pos = cell_center(cell, &self.config);
        let kind = self.enemies[idx].kind();
        let mut enemy = Enemy::new(
            enemy_id,
            kind,
            pos,
            self.config.character_radius,
            self.enemy_speed,
        );
        if self.power.power_mode() {
            ai::flee(&mut enemy, self.player.body.pos);
        }
        self.enemies[idx] = enemy;
        log::debug!("enemy {enemy_id} respawned at ({}, {})", cell.x, cell.y);
        self.events.push(RuntimeEvent::EnemyRespawned {
            enemy_id,
            x: pos.x,
            y: pos.y,
        });
    }

    pub(super) fn pick_respawn_cell(&mut self) -> Option<Cell> {
        let player = self.player.body.pos;
        let min_separation = self.config.respawn_min_separation();
        let max_x = self.maze.width() - 2;
        let max_y = self.maze.height() - 2;
        for _ in 0..self.config.respawn_max_attempts {
            let cell = Cell::new(self.rng.int(1, max_x), self.rng.int(1, max_y));
            if self.maze.is_open(cell)
                && cell_center(cell, &self.config).distance(player) > min_separation
            {
                return Some(cell);
            }
        }
        let fallback = self
            .maze
            .open_cells()
            .into_iter()
            .map(|cell| (cell, cell_center(cell, &self.config).distance(player)))
            .max_by(|a, b| a.1.total_cmp(&b.1))?;
        log::warn!(
            "respawn sampling exhausted after {} attempts; using farthest cell ({}, {}) at {:.0}px",
            self.config.respawn_max_attempts,
            fallback.0.x,
            fallback.0.y,
            fallback.1
        );
        Some(fallback.0)
    }

    pub(super) fn enemy_index(&self, enemy_id: u32) -> Option<usize> {
        self.enemies.iter().position(|enemy| enemy.id == enemy_id)
    }

    pub(super) fn make_id(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }
}
