//! Timed power-up state: power mode, speed boost, super snack, the enemy
//! combo multiplier and the dot chain.
//!
//! The flags are independent rather than one exclusive state because a speed
//! boost and a super snack can overlap each other and power mode. Every timed
//! flag owns at most one pending timer; re-arming cancels the previous timer
//! and schedules a fresh one, so a flag stays set for the whole of its latest
//! window and an older expiry can never clear it early.

use crate::config::GameConfig;
use crate::timers::{TimerAction, TimerRegistry, TimerToken};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerFlags {
    pub power_mode: bool,
    pub speed_boost: bool,
    pub super_snack: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyReward {
    pub points: u64,
    pub multiplier: u64,
}

#[derive(Clone, Debug)]
pub struct PowerState {
    power_mode: bool,
    speed_boost: bool,
    super_snack: bool,
    combo_multiplier: u64,
    dot_chain: u32,
    power_timer: Option<TimerToken>,
    snack_timer: Option<TimerToken>,
    boost_timer: Option<TimerToken>,
    chain_timer: Option<TimerToken>,
}

impl Default for PowerState {
    fn default() -> Self {
        Self {
            power_mode: false,
            speed_boost: false,
            super_snack: false,
            combo_multiplier: 1,
            dot_chain: 0,
            power_timer: None,
            snack_timer: None,
            boost_timer: None,
            chain_timer: None,
        }
    }
}

impl PowerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> PowerFlags {
        PowerFlags {
            power_mode: self.power_mode,
            speed_boost: self.speed_boost,
            super_snack: self.super_snack,
        }
    }

    pub fn power_mode(&self) -> bool {
        self.power_mode
    }

    pub fn speed_boost(&self) -> bool {
        self.speed_boost
    }

    pub fn super_snack(&self) -> bool {
        self.super_snack
    }

    pub fn combo_multiplier(&self) -> u64 {
        self.combo_multiplier
    }

    pub fn dot_chain(&self) -> u32 {
        self.dot_chain
    }

    /// Multiplier on the player's speed clamp: the largest active boost, or
    /// 1.0 once none remains.
    pub fn speed_multiplier(&self, config: &GameConfig) -> f32 {
        let mut multiplier: f32 = 1.0;
        if self.speed_boost {
            multiplier = multiplier.max(config.speed_boost_multiplier);
        }
        if self.super_snack {
            multiplier = multiplier.max(config.super_snack_speed_multiplier);
        }
        multiplier
    }

    /// Drops every flag and forgets timer tokens. The caller cancels the
    /// registry itself when a level is torn down.
    pub fn reset_for_level(&mut self) {
        *self = Self::default();
    }

    pub fn eat_steak(
        &mut self,
        timers: &mut TimerRegistry,
        now_ms: u64,
        config: &GameConfig,
    ) -> u64 {
        self.power_mode = true;
        self.combo_multiplier = 1;
        rearm(
            timers,
            &mut self.power_timer,
            now_ms,
            config.power_duration_ms,
            TimerAction::ClearPowerMode,
        );
        config.steak_score
    }

    pub fn eat_super_snack(&mut self, timers: &mut TimerRegistry, now_ms: u64, config: &GameConfig) {
        self.super_snack = true;
        self.power_mode = true;
        self.combo_multiplier = 1;
        rearm(
            timers,
            &mut self.snack_timer,
            now_ms,
            config.super_snack_duration_ms,
            TimerAction::ClearSuperSnack,
        );
    }

    pub fn eat_speed_boost(&mut self, timers: &mut TimerRegistry, now_ms: u64, config: &GameConfig) {
        self.speed_boost = true;
        rearm(
            timers,
            &mut self.boost_timer,
            now_ms,
            config.speed_boost_duration_ms,
            TimerAction::ClearSpeedBoost,
        );
    }

    /// Extends the chain and returns the points for this dot.
    pub fn eat_dot(&mut self, timers: &mut TimerRegistry, now_ms: u64, config: &GameConfig) -> u64 {
        self.dot_chain = self.dot_chain.saturating_add(1);
        let bonus = if self.dot_chain > 1 {
            config.dot_chain_bonus * (self.dot_chain as u64 - 1)
        } else {
            0
        };
        rearm(
            timers,
            &mut self.chain_timer,
            now_ms,
            config.dot_chain_reset_ms,
            TimerAction::ResetDotChain,
        );
        config.dot_score + bonus
    }

    /// Scores a defeated enemy at the current multiplier, then doubles it.
    /// `None` outside power mode.
    pub fn defeat_enemy(&mut self, config: &GameConfig) -> Option<EnemyReward> {
        if !self.power_mode {
            return None;
        }
        let multiplier = self.combo_multiplier;
        self.combo_multiplier = self.combo_multiplier.saturating_mul(2);
        Some(EnemyReward {
            points: config.enemy_score.saturating_mul(multiplier),
            multiplier,
        })
    }

    /// Applies an expiry. Returns false when the token is not the one this
    /// state currently owns for that action.
    pub fn on_timer(&mut self, token: TimerToken, action: TimerAction) -> bool {
        match action {
            TimerAction::ClearPowerMode if self.power_timer == Some(token) => {
                self.power_timer = None;
                self.power_mode = self.super_snack;
            }
            TimerAction::ClearSuperSnack if self.snack_timer == Some(token) => {
                self.snack_timer = None;
                self.super_snack = false;
                self.power_mode = self.power_timer.is_some();
            }
            TimerAction::ClearSpeedBoost if self.boost_timer == Some(token) => {
                self.boost_timer = None;
                self.speed_boost = false;
            }
            TimerAction::ResetDotChain if self.chain_timer == Some(token) => {
                self.chain_timer = None;
                self.dot_chain = 0;
            }
            _ => return false,
        }
        true
    }
}

fn rearm(
    timers: &mut TimerRegistry,
    slot: &mut Option<TimerToken>,
    now_ms: u64,
    delay_ms: u64,
    action: TimerAction,
) {
    if let Some(previous) = slot.take() {
        timers.cancel(previous);
    }
    *slot = Some(timers.schedule(now_ms, delay_ms, action));
}
