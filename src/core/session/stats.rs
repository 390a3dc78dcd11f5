/// Running counters for the whole session.
///
/// These survive new melodies and round restarts; only
/// [`SessionStats::reset`] clears them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub correct: u32,
    pub wrong: u32,
    pub streak: u32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.correct += 1;
        self.streak += 1;
    }

    pub fn record_miss(&mut self) {
        self.wrong += 1;
        self.streak = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_breaks_the_streak_only() {
        let mut stats = SessionStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats, SessionStats { correct: 2, wrong: 1, streak: 0 });
    }
}
