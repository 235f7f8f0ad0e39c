use glam::Vec2;

use crate::timers::TimerToken;
use crate::types::{EnemyKind, ItemKind};

/// Sides on which a body touched a wall or the world edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blocked {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Blocked {
    pub fn any(self) -> bool {
        self.left || self.right || self.up || self.down
    }

    pub fn horizontal(self) -> bool {
        self.left || self.right
    }

    pub fn vertical(self) -> bool {
        self.up || self.down
    }

    pub fn merge(&mut self, other: Blocked) {
        self.left |= other.left;
        self.right |= other.right;
        self.up |= other.up;
        self.down |= other.down;
    }
}

/// State every simulated entity carries.
#[derive(Clone, Debug)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Inactive bodies keep their slot but are skipped by motion and collision.
    pub active: bool,
    /// Wall contacts accumulated since the owner last consumed them.
    pub blocked: Blocked,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            active: true,
            blocked: Blocked::default(),
        }
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        let reach = self.radius + other.radius;
        self.pos.distance_squared(other.pos) < reach * reach
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    /// Acceleration requested by the current input, already scaled.
    pub accel: Vec2,
    pub invulnerable: bool,
}

impl Player {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            body: Body::new(pos, radius),
            accel: Vec2::ZERO,
            invulnerable: false,
        }
    }

    pub fn respawn_at(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.vel = Vec2::ZERO;
        self.body.blocked = Blocked::default();
        self.accel = Vec2::ZERO;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargerPhase {
    Idle,
    WindingUp,
    Charging,
}

/// Kind-specific scratch state, one variant per behavior.
#[derive(Clone, Debug, PartialEq)]
pub enum EnemyBrain {
    Wanderer { next_decision_at: u64 },
    CorridorFollower,
    PredictivePursuer,
    Charger {
        phase: ChargerPhase,
        commit: Option<TimerToken>,
    },
}

impl EnemyBrain {
    pub fn for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Wanderer => EnemyBrain::Wanderer { next_decision_at: 0 },
            EnemyKind::CorridorFollower => EnemyBrain::CorridorFollower,
            EnemyKind::PredictivePursuer => EnemyBrain::PredictivePursuer,
            EnemyKind::Charger => EnemyBrain::Charger {
                phase: ChargerPhase::Idle,
                commit: None,
            },
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self {
            EnemyBrain::Wanderer { .. } => EnemyKind::Wanderer,
            EnemyBrain::CorridorFollower => EnemyKind::CorridorFollower,
            EnemyBrain::PredictivePursuer => EnemyKind::PredictivePursuer,
            EnemyBrain::Charger { .. } => EnemyKind::Charger,
        }
    }

    pub fn charger_phase(&self) -> Option<ChargerPhase> {
        match self {
            EnemyBrain::Charger { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: u32,
    pub body: Body,
    pub base_speed: f32,
    pub brain: EnemyBrain,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, radius: f32, base_speed: f32) -> Self {
        Self {
            id,
            body: Body::new(pos, radius),
            base_speed,
            brain: EnemyBrain::for_kind(kind),
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.brain.kind()
    }
}

/// Collectible; removed for good once collected.
#[derive(Clone, Debug)]
pub struct Item {
    pub id: u32,
    pub kind: ItemKind,
    pub body: Body,
}

impl Item {
    pub fn new(id: u32, kind: ItemKind, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            body: Body::new(pos, radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{Blocked, Body, ChargerPhase, EnemyBrain};
    use crate::types::EnemyKind;

    #[test]
    fn overlap_is_strict() {
        let a = Body::new(Vec2::ZERO, 10.0);
        let touching = Body::new(Vec2::new(20.0, 0.0), 10.0);
        let inside = Body::new(Vec2::new(19.0, 0.0), 10.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
    }

    #[test]
    fn brain_matches_kind() {
        for kind in EnemyKind::ROTATION {
            assert_eq!(EnemyBrain::for_kind(kind).kind(), kind);
        }
        assert_eq!(
            EnemyBrain::for_kind(EnemyKind::Charger).charger_phase(),
            Some(ChargerPhase::Idle)
        );
    }

    #[test]
    fn blocked_merge_accumulates() {
        let mut blocked = Blocked::default();
        assert!(!blocked.any());
        blocked.merge(Blocked {
            left: true,
            ..Blocked::default()
        });
        blocked.merge(Blocked {
            down: true,
            ..Blocked::default()
        });
        assert!(blocked.horizontal() && blocked.vertical());
    }
}
