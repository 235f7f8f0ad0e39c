use super::*;

use crate::ai::{AiContext, ChargerSignal};
use crate::entity::EnemyBrain;

impl GameEngine {
    pub(super) fn run_enemy_ai(&mut self) {
        let ctx = AiContext {
            now_ms: self.now_ms,
            level: self.session.level(),
            player_pos: self.player.body.pos,
            player_vel: self.player.body.vel,
            power_mode: self.power.power_mode(),
            config: &self.config,
        };
        let mut signals = Vec::new();
        for enemy in self.enemies.iter_mut() {
            if let Some(signal) = ai::steer(enemy, &ctx, &mut self.rng) {
                signals.push((enemy.id, signal));
            }
        }
        for (enemy_id, signal) in signals {
            self.apply_charger_signal(enemy_id, signal);
        }
    }

    fn apply_charger_signal(&mut self, enemy_id: u32, signal: ChargerSignal) {
        match signal {
            ChargerSignal::WindUp => {
                let Some(idx) = self.enemy_index(enemy_id) else {
                    return;
                };
                let token = self.timers.schedule(
                    self.now_ms,
                    self.config.charger_windup_ms,
                    TimerAction::ChargerCommit { enemy_id },
                );
                if let EnemyBrain::Charger { commit, .. } = &mut self.enemies[idx].brain {
                    *commit = Some(token);
                }
                self.events.push(RuntimeEvent::ChargerWindUp { enemy_id });
            }
            ChargerSignal::Release(token) => {
                if let Some(token) = token {
                    self.timers.cancel(token);
                }
            }
        }
    }

    pub(super) fn commit_charger(&mut self, enemy_id: u32) {
        if self.power.power_mode() {
            return;
        }
        let Some(idx) = self.enemy_index(enemy_id) else {
            return;
        };
        let player_pos = self.player.body.pos;
        if ai::commit_charge(&mut self.enemies[idx], player_pos, &self.config) {
            self.events.push(RuntimeEvent::ChargerCharge { enemy_id });
        }
    }

    pub(super) fn apply_flee_override(&mut self) {
        if !self.power.power_mode() {
            return;
        }
        let player_pos = self.player.body.pos;
        for enemy in self.enemies.iter_mut().filter(|enemy| enemy.body.active) {
            if let Some(token) = ai::calm_charger(enemy) {
                self.timers.cancel(token);
            }
            ai::flee(enemy, player_pos);
        }
    }
}
