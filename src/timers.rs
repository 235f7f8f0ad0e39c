use std::collections::BTreeMap;

/// Handle for a scheduled one-shot action. Tokens are issued in increasing
/// order, which doubles as the tie-break between timers due at the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    ClearPowerMode,
    ClearSuperSnack,
    ClearSpeedBoost,
    ResetDotChain,
    ChargerCommit { enemy_id: u32 },
    RespawnEnemy { enemy_id: u32 },
    EndInvulnerability,
    StartLevel { level: u32 },
}

#[derive(Clone, Copy, Debug)]
struct ScheduledTimer {
    fire_at: u64,
    action: TimerAction,
}

/// Pending delayed actions for the active level. Cancelling removes the
/// entry; firing goes through [`TimerRegistry::take`], which yields nothing
/// for a token that was cancelled after it became due.
#[derive(Clone, Debug, Default)]
pub struct TimerRegistry {
    entries: BTreeMap<TimerToken, ScheduledTimer>,
    next_token: u64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, action: TimerAction) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.entries.insert(
            token,
            ScheduledTimer {
                fire_at: now_ms.saturating_add(delay_ms),
                action,
            },
        );
        token
    }

    /// Returns true when the token was still pending.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        self.entries.remove(&token).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn fire_at(&self, token: TimerToken) -> Option<u64> {
        self.entries.get(&token).map(|timer| timer.fire_at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tokens due at `now_ms`, ordered by fire time then scheduling order.
    pub fn due(&self, now_ms: u64) -> Vec<TimerToken> {
        let mut due: Vec<(u64, TimerToken)> = self
            .entries
            .iter()
            .filter(|(_, timer)| timer.fire_at <= now_ms)
            .map(|(token, timer)| (timer.fire_at, *token))
            .collect();
        due.sort_unstable();
        due.into_iter().map(|(_, token)| token).collect()
    }

    /// Removes and returns the action if the token is still scheduled.
    pub fn take(&mut self, token: TimerToken) -> Option<TimerAction> {
        self.entries.remove(&token).map(|timer| timer.action)
    }
}

#[cfg(test)]
mod tests {
    use super::{TimerAction, TimerRegistry};

    #[test]
    fn due_orders_by_time_then_schedule_order() {
        let mut timers = TimerRegistry::new();
        let late = timers.schedule(0, 300, TimerAction::ClearPowerMode);
        let first = timers.schedule(0, 100, TimerAction::ResetDotChain);
        let tie = timers.schedule(0, 100, TimerAction::ClearSpeedBoost);
        timers.schedule(0, 500, TimerAction::EndInvulnerability);

        assert!(timers.due(99).is_empty());
        assert_eq!(timers.due(300), vec![first, tie, late]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerRegistry::new();
        let token = timers.schedule(0, 10, TimerAction::ResetDotChain);
        let due = timers.due(10);
        assert!(timers.cancel(token));
        for token in due {
            assert!(timers.take(token).is_none());
        }
        assert!(!timers.cancel(token));
        assert!(timers.is_empty());
    }

    #[test]
    fn take_consumes_exactly_once() {
        let mut timers = TimerRegistry::new();
        let token = timers.schedule(1_000, 0, TimerAction::RespawnEnemy { enemy_id: 3 });
        assert_eq!(timers.fire_at(token), Some(1_000));
        assert_eq!(
            timers.take(token),
            Some(TimerAction::RespawnEnemy { enemy_id: 3 })
        );
        assert_eq!(timers.take(token), None);
    }

    #[test]
    fn cancel_all_clears_everything() {
        let mut timers = TimerRegistry::new();
        timers.schedule(0, 1, TimerAction::ClearPowerMode);
        timers.schedule(0, 2, TimerAction::ClearSuperSnack);
        assert_eq!(timers.cancel_all(), 2);
        assert_eq!(timers.len(), 0);
        assert!(timers.due(u64::MAX).is_empty());
    }
}
