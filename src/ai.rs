//! Enemy steering policies.
//!
//! [`steer`] applies the vulnerable-flee override first and only falls through
//! to the per-kind policy when power mode is off. Policies write the enemy's
//! velocity directly; anything needing a timer (the charger's wind-up) is
//! reported back as a [`ChargerSignal`] for the engine to schedule.

use glam::Vec2;

use crate::config::GameConfig;
use crate::entity::{Blocked, ChargerPhase, Enemy, EnemyBrain};
use crate::rng::Rng;
use crate::timers::TimerToken;

const STOPPED_EPSILON: f32 = 1.0;

pub struct AiContext<'a> {
    pub now_ms: u64,
    pub level: u32,
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    pub power_mode: bool,
    pub config: &'a GameConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargerSignal {
    /// Entered wind-up; the engine schedules the commit.
    WindUp,
    /// Dropped back to idle; the returned token (if any) must be cancelled.
    Release(Option<TimerToken>),
}

pub fn steer(enemy: &mut Enemy, ctx: &AiContext, rng: &mut Rng) -> Option<ChargerSignal> {
    if !enemy.body.active {
        return None;
    }
    // Wall contacts count from one decision to the next, whichever path runs.
    let blocked = std::mem::take(&mut enemy.body.blocked);
    if ctx.power_mode {
        let cancelled = calm_charger(enemy);
        flee(enemy, ctx.player_pos);
        return cancelled.map(|token| ChargerSignal::Release(Some(token)));
    }

    match enemy.brain {
        EnemyBrain::Wanderer { .. } => {
            wander(enemy, ctx, rng);
            None
        }
        EnemyBrain::CorridorFollower => {
            follow_corridor(enemy, ctx, blocked);
            None
        }
        EnemyBrain::PredictivePursuer => {
            pursue_predicted(enemy, ctx);
            None
        }
        EnemyBrain::Charger { .. } => charge_policy(enemy, ctx),
    }
}

/// Velocity straight away from the player at the enemy's speed.
pub fn flee(enemy: &mut Enemy, player_pos: Vec2) {
    let away = (enemy.body.pos - player_pos).normalize_or_zero();
    enemy.body.vel = away * enemy.base_speed;
}

/// Returns a charger to idle, handing back any pending commit token.
pub fn calm_charger(enemy: &mut Enemy) -> Option<TimerToken> {
    match &mut enemy.brain {
        EnemyBrain::Charger { phase, commit } => {
            *phase = ChargerPhase::Idle;
            commit.take()
        }
        _ => None,
    }
}

fn toward(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

fn wander(enemy: &mut Enemy, ctx: &AiContext, rng: &mut Rng) {
    let EnemyBrain::Wanderer { next_decision_at } = &mut enemy.brain else {
        return;
    };
    if ctx.now_ms < *next_decision_at {
        return;
    }
    if enemy.body.vel.length() > STOPPED_EPSILON {
        enemy.body.vel = Vec2::ZERO;
        *next_decision_at = ctx.now_ms + rng.ms(500, 2_000);
    } else {
        let angle = rng.angle();
        let speed = enemy.base_speed * ctx.config.wanderer_speed_factor;
        enemy.body.vel = Vec2::from_angle(angle) * speed;
        *next_decision_at = ctx.now_ms + rng.ms(1_000, 3_000);
    }
}

fn follow_corridor(enemy: &mut Enemy, ctx: &AiContext, blocked: Blocked) {
    let delta = ctx.player_pos - enemy.body.pos;
    let half_tile = ctx.config.tile_size / 2.0;
    if !blocked.any() {
        enemy.body.vel = toward(enemy.body.pos, ctx.player_pos, enemy.base_speed);
        return;
    }
    if blocked.horizontal() && delta.y.abs() > half_tile {
        enemy.body.vel.y = enemy.base_speed * delta.y.signum();
    } else if blocked.vertical() && delta.x.abs() > half_tile {
        enemy.body.vel.x = enemy.base_speed * delta.x.signum();
    }
}

fn pursue_predicted(enemy: &mut Enemy, ctx: &AiContext) {
    let lookahead = ctx.config.predictive_lookahead_secs(ctx.level);
    let target = ctx.player_pos + ctx.player_vel * lookahead;
    enemy.body.vel = toward(enemy.body.pos, target, enemy.base_speed);
}

/// Idle below the activation range winds up; wound-up or charging beyond
/// `charger_release_factor` times the range goes idle. Between the two
/// thresholds the current phase holds.
fn charge_policy(enemy: &mut Enemy, ctx: &AiContext) -> Option<ChargerSignal> {
    let distance = enemy.body.pos.distance(ctx.player_pos);
    let range = ctx.config.charger_activation_range(ctx.level);
    let release = range * ctx.config.charger_release_factor;
    let EnemyBrain::Charger { phase, commit } = &mut enemy.brain else {
        return None;
    };
    match *phase {
        ChargerPhase::Idle if distance < range => {
            *phase = ChargerPhase::WindingUp;
            enemy.body.vel = Vec2::ZERO;
            Some(ChargerSignal::WindUp)
        }
        ChargerPhase::WindingUp | ChargerPhase::Charging if distance > release => {
            *phase = ChargerPhase::Idle;
            enemy.body.vel = Vec2::ZERO;
            Some(ChargerSignal::Release(commit.take()))
        }
        _ => None,
    }
}

/// Wind-up finished: launch at the player's current position. Returns false
/// when the charger is no longer winding up (released, defeated, or fleeing).
pub fn commit_charge(enemy: &mut Enemy, player_pos: Vec2, config: &GameConfig) -> bool {
    if !enemy.body.active {
        return false;
    }
    let EnemyBrain::Charger { phase, commit } = &mut enemy.brain else {
        return false;
    };
    *commit = None;
    if *phase != ChargerPhase::WindingUp {
        return false;
    }
    *phase = ChargerPhase::Charging;
    let speed = enemy.base_speed * config.charger_speed_multiplier;
    enemy.body.vel = toward(enemy.body.pos, player_pos, speed);
    true
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{commit_charge, steer, AiContext, ChargerSignal};
    use crate::config::GameConfig;
    use crate::entity::{Blocked, ChargerPhase, Enemy, EnemyBrain};
    use crate::rng::Rng;
    use crate::types::EnemyKind;

    fn ctx(config: &GameConfig, now_ms: u64, player_pos: Vec2, power_mode: bool) -> AiContext<'_> {
        AiContext {
            now_ms,
            level: 1,
            player_pos,
            player_vel: Vec2::ZERO,
            power_mode,
            config,
        }
    }

    fn enemy(kind: EnemyKind, pos: Vec2) -> Enemy {
        Enemy::new(1, kind, pos, 20.0, 100.0)
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn power_mode_overrides_every_kind() {
        let config = GameConfig::default();
        let mut rng = Rng::new(1);
        for kind in EnemyKind::ROTATION {
            let mut e = enemy(kind, Vec2::new(100.0, 0.0));
            steer(&mut e, &ctx(&config, 0, Vec2::ZERO, true), &mut rng);
            assert!(approx(e.body.vel, Vec2::new(100.0, 0.0)), "{kind:?} did not flee");
        }
    }

    #[test]
    fn wanderer_alternates_between_moving_and_pausing() {
        let config = GameConfig::default();
        let mut rng = Rng::new(9);
        let mut e = enemy(EnemyKind::Wanderer, Vec2::ZERO);

        steer(&mut e, &ctx(&config, 0, Vec2::ZERO, false), &mut rng);
        assert!((e.body.vel.length() - 75.0).abs() < 1e-3);
        let EnemyBrain::Wanderer { next_decision_at } = e.brain else {
            panic!("wanderer brain");
        };
        assert!((1_000..=3_000).contains(&next_decision_at));

        // Before the decision time nothing changes.
        let vel = e.body.vel;
        steer(&mut e, &ctx(&config, next_decision_at - 1, Vec2::ZERO, false), &mut rng);
        assert_eq!(e.body.vel, vel);

        steer(&mut e, &ctx(&config, next_decision_at, Vec2::ZERO, false), &mut rng);
        assert_eq!(e.body.vel, Vec2::ZERO);
        let EnemyBrain::Wanderer { next_decision_at: pause_until } = e.brain else {
            panic!("wanderer brain");
        };
        assert!((next_decision_at + 500..=next_decision_at + 2_000).contains(&pause_until));
    }

    #[test]
    fn corridor_follower_chases_when_free() {
        let config = GameConfig::default();
        let mut rng = Rng::new(1);
        let mut e = enemy(EnemyKind::CorridorFollower, Vec2::ZERO);
        steer(&mut e, &ctx(&config, 0, Vec2::new(0.0, -300.0), false), &mut rng);
        assert!(approx(e.body.vel, Vec2::new(0.0, -100.0)));
    }

    #[test]
    fn corridor_follower_turns_toward_player_side_when_blocked() {
        let config = GameConfig::default();
        let mut rng = Rng::new(1);
        let mut e = enemy(EnemyKind::CorridorFollower, Vec2::ZERO);
        e.body.vel = Vec2::new(0.0, 0.0);
        e.body.blocked = Blocked {
            right: true,
            ..Blocked::default()
        };
        steer(&mut e, &ctx(&config, 0, Vec2::new(200.0, 120.0), false), &mut rng);
        assert!(approx(e.body.vel, Vec2::new(0.0, 100.0)));
        assert_eq!(e.body.blocked, Blocked::default());

        // Vertical offset within half a tile: no turn.
        e.body.vel = Vec2::ZERO;
        e.body.blocked = Blocked {
            left: true,
            ..Blocked::default()
        };
        steer(&mut e, &ctx(&config, 0, Vec2::new(-200.0, 20.0), false), &mut rng);
        assert_eq!(e.body.vel, Vec2::ZERO);

        e.body.blocked = Blocked {
            up: true,
            ..Blocked::default()
        };
        steer(&mut e, &ctx(&config, 0, Vec2::new(-200.0, -300.0), false), &mut rng);
        assert!(approx(e.body.vel, Vec2::new(-100.0, 0.0)));
    }

    #[test]
    fn wall_hits_while_fleeing_do_not_outlive_power_mode() {
        let config = GameConfig::default();
        let mut rng = Rng::new(1);
        let mut e = enemy(EnemyKind::CorridorFollower, Vec2::new(100.0, 0.0));
        e.body.blocked = Blocked {
            right: true,
            down: true,
            ..Blocked::default()
        };
        steer(&mut e, &ctx(&config, 0, Vec2::ZERO, true), &mut rng);
        assert_eq!(e.body.blocked, Blocked::default());

        // First decision after power mode: nothing blocks, so a straight chase.
        steer(&mut e, &ctx(&config, 500, Vec2::new(100.0, 300.0), false), &mut rng);
        assert!(approx(e.body.vel, Vec2::new(0.0, 100.0)));
    }

    #[test]
    fn predictive_pursuer_leads_the_player() {
        let config = GameConfig::default();
        let mut rng = Rng::new(1);
        let mut e = enemy(EnemyKind::PredictivePursuer, Vec2::ZERO);
        let mut context = ctx(&config, 0, Vec2::new(100.0, 0.0), false);
        // Lookahead at level 1 is 0.45 s: target = (100, 0) + (0, 200) * 0.45 = (100, 90).
        context.player_vel = Vec2::new(0.0, 200.0);
        steer(&mut e, &context, &mut rng);
        let expected = Vec2::new(100.0, 90.0).normalize() * 100.0;
        assert!(approx(e.body.vel, expected));
    }

    #[test]
    fn charger_hysteresis_thresholds() {
        let config = GameConfig::default();
        let mut rng = Rng::new(1);
        let range = config.charger_activation_range(1);
        let mut e = enemy(EnemyKind::Charger, Vec2::ZERO);

        // Exactly at the range stays idle.
        let signal = steer(&mut e, &ctx(&config, 0, Vec2::new(range, 0.0), false), &mut rng);
        assert_eq!(signal, None);
        assert_eq!(e.brain.charger_phase(), Some(ChargerPhase::Idle));

        let signal = steer(&mut e, &ctx(&config, 0, Vec2::new(range - 0.5, 0.0), false), &mut rng);
        assert_eq!(signal, Some(ChargerSignal::WindUp));
        assert_eq!(e.brain.charger_phase(), Some(ChargerPhase::WindingUp));
        assert_eq!(e.body.vel, Vec2::ZERO);

        // Inside the hysteresis band, including exactly at range and 1.2x range.
        for d in [range, range * 1.1, range * 1.2] {
            let signal = steer(&mut e, &ctx(&config, 0, Vec2::new(d, 0.0), false), &mut rng);
            assert_eq!(signal, None);
            assert_eq!(e.brain.charger_phase(), Some(ChargerPhase::WindingUp));
        }

        assert!(commit_charge(&mut e, Vec2::new(range, 0.0), &config));
        assert_eq!(e.brain.charger_phase(), Some(ChargerPhase::Charging));
        assert!(approx(e.body.vel, Vec2::new(160.0, 0.0)));

        let signal = steer(
            &mut e,
            &ctx(&config, 0, Vec2::new(range * 1.2 + 0.5, 0.0), false),
            &mut rng,
        );
        assert_eq!(signal, Some(ChargerSignal::Release(None)));
        assert_eq!(e.brain.charger_phase(), Some(ChargerPhase::Idle));
    }

    #[test]
    fn commit_after_release_does_nothing() {
        let config = GameConfig::default();
        let mut e = enemy(EnemyKind::Charger, Vec2::ZERO);
        assert!(!commit_charge(&mut e, Vec2::new(10.0, 0.0), &config));
        assert_eq!(e.body.vel, Vec2::ZERO);

        let mut wanderer = enemy(EnemyKind::Wanderer, Vec2::ZERO);
        assert!(!commit_charge(&mut wanderer, Vec2::ZERO, &config));
    }

    #[test]
    fn inactive_enemies_are_left_alone() {
        let config = GameConfig::default();
        let mut rng = Rng::new(1);
        let mut e = enemy(EnemyKind::PredictivePursuer, Vec2::ZERO);
        e.body.active = false;
        steer(&mut e, &ctx(&config, 0, Vec2::new(100.0, 0.0), true), &mut rng);
        assert_eq!(e.body.vel, Vec2::ZERO);
    }
}
