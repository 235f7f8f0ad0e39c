/// Persistent best-score storage consumed by the core.
pub trait BestScoreStore {
    fn get_best_score(&self) -> u64;
    fn set_best_score(&mut self, score: u64);
}

/// Score, level and lives for one playthrough. Survives level transitions,
/// replaced on a new game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreSession {
    score: u64,
    level: u32,
    lives: u32,
    best_score: u64,
}

impl ScoreSession {
    pub fn new(starting_lives: u32, best_score: u64) -> Self {
        Self {
            score: 0,
            level: 1,
            lives: starting_lives,
            best_score,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn set_level(&mut self, level: u32) {
        self.level = level.max(1);
    }

    /// Adds points and pushes a new best score to the store when beaten.
    pub fn add_points(&mut self, points: u64, store: &mut dyn BestScoreStore) {
        self.score = self.score.saturating_add(points);
        if self.score > self.best_score {
            self.best_score = self.score;
            store.set_best_score(self.best_score);
        }
    }

    pub fn gain_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_add(1);
        self.lives
    }

    /// Returns the lives left after the loss.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreSession;
    use crate::store::MemoryBestScoreStore;
    use crate::score::BestScoreStore;

    #[test]
    fn best_score_follows_score_monotonically() {
        let mut store = MemoryBestScoreStore::new(25);
        let mut session = ScoreSession::new(3, store.get_best_score());
        session.add_points(10, &mut store);
        assert_eq!(store.get_best_score(), 25);
        assert_eq!(store.writes(), 0);

        session.add_points(20, &mut store);
        assert_eq!(session.score(), 30);
        assert_eq!(session.best_score(), 30);
        assert_eq!(store.get_best_score(), 30);

        session.add_points(0, &mut store);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn lives_never_underflow() {
        let mut store = MemoryBestScoreStore::default();
        let mut session = ScoreSession::new(1, store.get_best_score());
        assert_eq!(session.lose_life(), 0);
        assert_eq!(session.lose_life(), 0);
        assert_eq!(session.gain_life(), 1);
        session.add_points(5, &mut store);
        assert_eq!(session.level(), 1);
    }
}
