use std::collections::BTreeSet;

use glam::Vec2;

use crate::ai;
use crate::config::GameConfig;
use crate::entity::{Enemy, Item, Player};
use crate::maze::{generate_maze, MazeGrid};
use crate::power::{PowerFlags, PowerState};
use crate::render::{forward_events, Renderer};
use crate::rng::Rng;
use crate::score::{BestScoreStore, ScoreSession};
use crate::timers::{TimerAction, TimerRegistry, TimerToken};
use crate::types::{
    Cell, EnemyKind, EnemyView, EnemyVisual, GameOverReason, GamePhase, GameSummary, HudView,
    ItemKind, ItemView, PlayerView, RuntimeEvent, Snapshot, TickInput,
};

mod collision;
mod enemy_ai;
mod motion;
mod spawn_system;
mod utils;

use self::utils::{approach_zero, cell_at, cell_center, player_tint, roll_item_kind};

pub struct GameEngine {
    pub config: GameConfig,

    rng: Rng,
    maze: MazeGrid,
    player: Player,
    enemies: Vec<Enemy>,
    items: Vec<Item>,
    power: PowerState,
    session: ScoreSession,
    timers: TimerRegistry,
    store: Box<dyn BestScoreStore>,
    events: Vec<RuntimeEvent>,

    phase: GamePhase,
    now_ms: u64,
    tick_counter: u64,
    ai_elapsed_ms: u64,
    enemy_speed: f32,
    start_pos: Vec2,
    // enemies whose current contact already took effect
    contacts: BTreeSet<u32>,
    invulnerable_timer: Option<TimerToken>,
    end_reason: Option<GameOverReason>,
    next_id: u32,
}

impl GameEngine {
    pub fn new(config: GameConfig, seed: u64, store: Box<dyn BestScoreStore>) -> Self {
        let session = ScoreSession::new(config.starting_lives, store.get_best_score());
        let player = Player::new(Vec2::ZERO, config.character_radius);
        let mut engine = Self {
            config,
            rng: Rng::new(seed),
            maze: MazeGrid::from_rows(&[]),
            player,
            enemies: Vec::new(),
            items: Vec::new(),
            power: PowerState::new(),
            session,
            timers: TimerRegistry::new(),
            store,
            events: Vec::new(),
            phase: GamePhase::Playing,
            now_ms: 0,
            tick_counter: 0,
            ai_elapsed_ms: 0,
            enemy_speed: 0.0,
            start_pos: Vec2::ZERO,
            contacts: BTreeSet::new(),
            invulnerable_timer: None,
            end_reason: None,
            next_id: 0,
        };
        engine.start_level(1);
        engine
    }

    pub fn new_game(&mut self) {
        self.timers.cancel_all();
        self.session = ScoreSession::new(self.config.starting_lives, self.store.get_best_score());
        self.end_reason = None;
        self.now_ms = 0;
        self.tick_counter = 0;
        self.start_level(1);
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver | GamePhase::Won)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn maze(&self) -> &MazeGrid {
        &self.maze
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn power(&self) -> &PowerState {
        &self.power
    }

    pub fn session(&self) -> &ScoreSession {
        &self.session
    }

    pub fn cell_at(&self, pos: Vec2) -> Cell {
        cell_at(pos, &self.config)
    }

    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        cell_center(cell, &self.config)
    }

    pub fn step(&mut self, dt_ms: u64, input: &TickInput) {
        if self.is_ended() {
            return;
        }
        self.tick_counter += 1;
        self.now_ms = self.now_ms.saturating_add(dt_ms);
        self.fire_due_timers();
        if self.phase != GamePhase::Playing {
            return;
        }

        let dt = dt_ms as f32 / 1000.0;
        self.move_player(input, dt);
        self.move_enemies(dt);
        self.resolve_contacts();
        if self.phase != GamePhase::Playing {
            return;
        }

        self.ai_elapsed_ms += dt_ms;
        if self.ai_elapsed_ms >= self.config.ai_interval_ms {
            self.ai_elapsed_ms %= self.config.ai_interval_ms;
            self.run_enemy_ai();
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let flags = self.power.flags();
        let invulnerable = self.player.invulnerable;
        Snapshot {
            tick: self.tick_counter,
            now_ms: self.now_ms,
            phase: self.phase,
            hud: HudView {
                score: self.session.score(),
                lives: self.session.lives(),
                level: self.session.level(),
                best_score: self.session.best_score(),
            },
            player: PlayerView {
                x: self.player.body.pos.x,
                y: self.player.body.pos.y,
                vel_x: self.player.body.vel.x,
                vel_y: self.player.body.vel.y,
                tint: player_tint(flags),
                flashing: flags.super_snack,
                invulnerable,
                alpha: if invulnerable { 0.5 } else { 1.0 },
            },
            enemies: self
                .enemies
                .iter()
                .map(|enemy| EnemyView {
                    id: enemy.id,
                    kind: enemy.kind(),
                    x: enemy.body.pos.x,
                    y: enemy.body.pos.y,
                    active: enemy.body.active,
                    visual: enemy_visual(enemy, flags),
                })
                .collect(),
            items: self
                .items
                .iter()
                .map(|item| ItemView {
                    id: item.id,
                    kind: item.kind,
                    x: item.body.pos.x,
                    y: item.body.pos.y,
                })
                .collect(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    pub fn present(&mut self, renderer: &mut dyn Renderer) -> Snapshot {
        let snapshot = self.build_snapshot(true);
        forward_events(renderer, &snapshot.events);
        renderer.draw_frame(&snapshot);
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            reason: self.end_reason,
            final_score: self.session.score(),
            best_score: self.session.best_score(),
            level: self.session.level(),
            duration_ms: self.now_ms,
        }
    }

    fn fire_due_timers(&mut self) {
        for token in self.timers.due(self.now_ms) {
            // An earlier action this tick may have cancelled it.
            let Some(action) = self.timers.take(token) else {
                continue;
            };
            self.apply_timer(token, action);
        }
    }

    fn apply_timer(&mut self, token: TimerToken, action: TimerAction) {
        match action {
            TimerAction::ClearPowerMode
            | TimerAction::ClearSuperSnack
            | TimerAction::ClearSpeedBoost
            | TimerAction::ResetDotChain => {
                let before = self.power.flags();
                if self.power.on_timer(token, action) {
                    self.emit_power_changes(before);
                }
            }
            TimerAction::ChargerCommit { enemy_id } => self.commit_charger(enemy_id),
            TimerAction::RespawnEnemy { enemy_id } => self.respawn_enemy(enemy_id),
            TimerAction::EndInvulnerability => {
                if self.invulnerable_timer == Some(token) {
                    self.invulnerable_timer = None;
                    self.player.invulnerable = false;
                }
            }
            TimerAction::StartLevel { level } => self.start_level(level),
        }
    }

    fn emit_power_changes(&mut self, before: PowerFlags) {
        let after = self.power.flags();
        if before.power_mode != after.power_mode {
            log::debug!("power mode {} at {}ms", after.power_mode, self.now_ms);
            self.events.push(RuntimeEvent::PowerModeChanged {
                active: after.power_mode,
            });
        }
        if before.speed_boost != after.speed_boost {
            self.events.push(RuntimeEvent::SpeedBoostChanged {
                active: after.speed_boost,
            });
        }
        if before.super_snack != after.super_snack {
            self.events.push(RuntimeEvent::SuperSnackChanged {
                active: after.super_snack,
            });
        }
    }
}

fn enemy_visual(enemy: &Enemy, flags: PowerFlags) -> EnemyVisual {
    if flags.power_mode {
        EnemyVisual::Vulnerable
    } else if enemy.brain.charger_phase() == Some(crate::entity::ChargerPhase::WindingUp) {
        EnemyVisual::Warning
    } else {
        EnemyVisual::Normal
    }
}
