use super::*;

impl GameEngine {
    pub(super) fn resolve_contacts(&mut self) {
        // Items before enemies.
        self.collect_items();
        if self.phase != GamePhase::Playing {
            return;
        }
        self.resolve_enemy_contacts();
        if self.phase == GamePhase::Playing {
            self.check_level_clear();
        }
    }

    fn collect_items(&mut self) {
        let player = &self.player.body;
        let mut collected = Vec::new();
        self.items.retain(|item| {
            if item.body.active && item.body.overlaps(player) {
                collected.push(item.clone());
                false
            } else {
                true
            }
        });
        for item in collected {
            self.apply_item(&item);
        }
    }

    fn apply_item(&mut self, item: &Item) {
        let before = self.power.flags();
        let now_ms = self.now_ms;
        let points = match item.kind {
            ItemKind::Dot => self.power.eat_dot(&mut self.timers, now_ms, &self.config),
            ItemKind::Steak => self.power.eat_steak(&mut self.timers, now_ms, &self.config),
            ItemKind::GoldSteak => self.config.gold_steak_score,
            ItemKind::Bone | ItemKind::SpeedBoost | ItemKind::SuperSnack => 0,
        };
        self.award(points);
        self.events.push(RuntimeEvent::ItemCollected {
            item_id: item.id,
            kind: item.kind,
            x: item.body.pos.x,
            y: item.body.pos.y,
            points,
        });

        match item.kind {
            ItemKind::Bone => {
                let lives = self.session.gain_life();
                self.events.push(RuntimeEvent::ExtraLife { lives });
                self.message("Extra Life!");
            }
            ItemKind::GoldSteak => self.message("Gold Steak!"),
            ItemKind::SpeedBoost => {
                self.power
                    .eat_speed_boost(&mut self.timers, now_ms, &self.config);
                self.message("Speed Boost!");
            }
            ItemKind::SuperSnack => {
                self.power
                    .eat_super_snack(&mut self.timers, now_ms, &self.config);
                self.message("SUPER SNACK!");
            }
            ItemKind::Dot | ItemKind::Steak => {}
        }

        self.emit_power_changes(before);
        if matches!(item.kind, ItemKind::Steak | ItemKind::SuperSnack) {
            self.apply_flee_override();
        }
    }

    fn resolve_enemy_contacts(&mut self) {
        let touching: BTreeSet<u32> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.body.active && enemy.body.overlaps(&self.player.body))
            .map(|enemy| enemy.id)
            .collect();
        self.contacts.retain(|enemy_id| touching.contains(enemy_id));

        // A contact is only remembered once it took effect; one swallowed by
        // invulnerability is retried on later ticks.
        for enemy_id in touching {
            if self.phase != GamePhase::Playing {
                break;
            }
            if self.contacts.contains(&enemy_id) {
                continue;
            }
            if self.power.power_mode() {
                self.defeat_enemy(enemy_id);
            } else if self.player.invulnerable {
                continue;
            } else {
                self.hit_player();
            }
            self.contacts.insert(enemy_id);
        }
    }

    fn defeat_enemy(&mut self, enemy_id: u32) {
        let Some(idx) = self.enemy_index(enemy_id) else {
            return;
        };
        if !self.enemies[idx].body.active {
            return;
        }
        let Some(reward) = self.power.defeat_enemy(&self.config) else {
            return;
        };
        let enemy = &mut self.enemies[idx];
        enemy.body.active = false;
        enemy.body.vel = Vec2::ZERO;
        let pos = enemy.body.pos;
        if let Some(token) = ai::calm_charger(enemy) {
            self.timers.cancel(token);
        }

        self.award(reward.points);
        self.timers.schedule(
            self.now_ms,
            self.config.enemy_respawn_delay_ms(),
            TimerAction::RespawnEnemy { enemy_id },
        );
        log::debug!(
            "enemy {enemy_id} defeated for {} (x{})",
            reward.points,
            reward.multiplier
        );
        self.events.push(RuntimeEvent::EnemyDefeated {
            enemy_id,
            x: pos.x,
            y: pos.y,
            points: reward.points,
            multiplier: reward.multiplier,
        });
    }

    fn hit_player(&mut self) {
        let lives_left = self.session.lose_life();
        self.events.push(RuntimeEvent::LifeLost { lives_left });
        if lives_left == 0 {
            self.finish(GameOverReason::OutOfLives);
            return;
        }

        self.message("Ouch! -1 Life");
        self.player.respawn_at(self.start_pos);
        self.player.invulnerable = true;
        if let Some(previous) = self.invulnerable_timer.take() {
            self.timers.cancel(previous);
        }
        self.invulnerable_timer = Some(self.timers.schedule(
            self.now_ms,
            self.config.invulnerable_ms,
            TimerAction::EndInvulnerability,
        ));
    }

    fn check_level_clear(&mut self) {
        if !self.items.is_empty() {
            return;
        }
        let level = self.session.level();
        let bonus = self.config.level_complete_bonus;
        self.award(bonus);
        self.events.push(RuntimeEvent::LevelCompleted { level, bonus });
        log::info!("level {level} cleared, score {}", self.session.score());

        if level >= self.config.max_level {
            self.finish(GameOverReason::Victory);
            return;
        }
        self.timers.cancel_all();
        self.phase = GamePhase::LevelComplete;
        self.message(&format!("Level {level} Complete!"));
        self.timers.schedule(
            self.now_ms,
            self.config.level_transition_ms,
            TimerAction::StartLevel { level: level + 1 },
        );
    }

    pub(super) fn finish(&mut self, reason: GameOverReason) {
        self.timers.cancel_all();
        self.phase = match reason {
            GameOverReason::Victory => GamePhase::Won,
            GameOverReason::OutOfLives => GamePhase::GameOver,
        };
        self.end_reason = Some(reason);
        let final_score = self.session.score();
        log::info!("game over ({reason:?}) at level {} with {final_score}", self.session.level());
        self.events.push(RuntimeEvent::GameOver {
            reason,
            final_score,
        });
    }

    pub(super) fn award(&mut self, points: u64) {
        if points > 0 {
            self.session.add_points(points, &mut *self.store);
        }
    }

    pub(super) fn message(&mut self, text: &str) {
        self.events.push(RuntimeEvent::Message {
            text: text.to_string(),
        });
    }
}
