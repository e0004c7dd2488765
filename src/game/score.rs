/// Outcome of crediting one piece of food
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub points: u32,
    /// Segments added to the target length
    pub growth: usize,
    /// Set when this award produced a new high score
    pub new_high_score: Option<u32>,
}

/// Score, growth target and high score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTracker {
    score: u32,
    high_score: u32,
    target_length: usize,
    min_length: usize,
    growth_divisor: u32,
}

impl ScoreTracker {
    pub fn new(high_score: u32, min_length: usize, growth_divisor: u32) -> Self {
        Self {
            score: 0,
            high_score,
            target_length: min_length,
            min_length,
            growth_divisor,
        }
    }

    /// Reset the per-round values; the high score carries over
    pub fn begin_round(&mut self, min_length: usize) {
        self.score = 0;
        self.min_length = min_length;
        self.target_length = min_length;
    }

    pub fn set_growth_divisor(&mut self, growth_divisor: u32) {
        self.growth_divisor = growth_divisor;
    }

    /// Segments gained from a food worth `points`, never less than one
    pub fn growth_for(&self, points: u32) -> usize {
        match self.growth_divisor {
            0 => 1,
            divisor => ((points / divisor) as usize).max(1),
        }
    }

    /// Credit a piece of food and run the high score check
    pub fn award(&mut self, points: u32) -> Award {
        let growth = self.growth_for(points);
        self.score = self.score.saturating_add(points);
        self.target_length += growth;

        Award {
            points,
            growth,
            new_high_score: self.check_high_score(),
        }
    }

    /// Raise the high score if the current score beats it.
    ///
    /// Returns the new value only when it changed, so callers persist and
    /// announce each new record once.
    pub fn check_high_score(&mut self) -> Option<u32> {
        if self.score > self.high_score {
            self.high_score = self.score;
            Some(self.high_score)
        } else {
            None
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn target_length(&self) -> usize {
        self.target_length.max(self.min_length)
    }
}
