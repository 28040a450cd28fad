use serde::Serialize;

/// Feedback band for a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// Every question answered correctly.
    Perfect,
    /// At least 80%.
    Excellent,
    /// At least 60%.
    Good,
    /// At least 40%.
    Fair,
    /// Below 40%.
    KeepStudying,
}

impl ScoreBand {
    /// Message shown with the final score.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect score! You know this book by heart.",
            Self::Excellent => "Excellent work! You know this book well.",
            Self::Good => "Good job! A little more study and you'll master it.",
            Self::Fair => "Not bad! Keep reading and try again.",
            Self::KeepStudying => "Keep studying! Every attempt helps you learn.",
        }
    }
}

/// Final tally of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    correct: usize,
    total: usize,
}

impl Score {
    /// Creates a score, clamping `correct` to `total`.
    #[must_use]
    pub fn new(correct: usize, total: usize) -> Self {
        Self {
            correct: correct.min(total),
            total,
        }
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whole-number percentage, rounded down. An empty score is 0%.
    #[must_use]
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.correct.saturating_mul(100) / self.total
    }

    #[must_use]
    pub fn band(&self) -> ScoreBand {
        // Compare with cross-multiplication so 4/5 lands on 80% exactly.
        let at_least = |pct: usize| self.correct.saturating_mul(100) >= pct * self.total;
        if self.total > 0 && self.correct == self.total {
            ScoreBand::Perfect
        } else if self.total > 0 && at_least(80) {
            ScoreBand::Excellent
        } else if self.total > 0 && at_least(60) {
            ScoreBand::Good
        } else if self.total > 0 && at_least(40) {
            ScoreBand::Fair
        } else {
            ScoreBand::KeepStudying
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(Score::new(10, 10).band(), ScoreBand::Perfect);
        assert_eq!(Score::new(9, 10).band(), ScoreBand::Excellent);
        assert_eq!(Score::new(8, 10).band(), ScoreBand::Excellent);
        assert_eq!(Score::new(7, 10).band(), ScoreBand::Good);
        assert_eq!(Score::new(6, 10).band(), ScoreBand::Good);
        assert_eq!(Score::new(4, 10).band(), ScoreBand::Fair);
        assert_eq!(Score::new(3, 10).band(), ScoreBand::KeepStudying);
        assert_eq!(Score::new(0, 10).band(), ScoreBand::KeepStudying);
    }

    #[test]
    fn short_sessions_use_exact_ratios() {
        assert_eq!(Score::new(4, 5).band(), ScoreBand::Excellent);
        assert_eq!(Score::new(2, 5).band(), ScoreBand::Fair);
        assert_eq!(Score::new(1, 3).band(), ScoreBand::KeepStudying);
        assert_eq!(Score::new(2, 3).percent(), 66);
    }

    #[test]
    fn empty_score_is_zero() {
        let score = Score::new(0, 0);
        assert_eq!(score.percent(), 0);
        assert_eq!(score.band(), ScoreBand::KeepStudying);
    }

    #[test]
    fn correct_is_clamped_to_total() {
        assert_eq!(Score::new(12, 10).correct(), 10);
    }
}
