//! Scoring, gravity and level progression following the NES ruleset

/// Frames each gravity step waits at levels 0-29 (29 and above share the last entry)
const FRAMES_PER_DROP: [u8; 30] = [
    48, 43, 38, 33, 28, 23, 18, 13, 8, 6, //
    5, 5, 5, 4, 4, 4, 3, 3, 3, 2, //
    2, 2, 2, 2, 2, 2, 2, 2, 2, 1,
];

/// NES frame rate the table is counted in
const FRAMES_PER_SECOND: f64 = 60.0;

/// Seconds between gravity steps at a level
pub fn seconds_per_drop(level: u32) -> f64 {
    let level = level.min(FRAMES_PER_DROP.len() as u32 - 1) as usize;
    FRAMES_PER_DROP[level] as f64 / FRAMES_PER_SECOND
}

/// Points for clearing `line_count` rows at once on `level`
pub fn compute_score(level: u32, line_count: u32) -> u32 {
    let base: u32 = match line_count {
        1 => 40,
        2 => 100,
        3 => 300,
        4 => 1200,
        _ => 0,
    };
    base.saturating_mul(level.saturating_add(1))
}

/// Total lines needed before `level` advances, for a game begun at `start_level`
pub fn lines_for_next_level(start_level: u32, level: u32) -> u32 {
    let tens = start_level.saturating_mul(10);
    let first = tens.saturating_add(10).min(100u32.max(tens.saturating_sub(50)));
    first.saturating_add(level.saturating_sub(start_level).saturating_mul(10))
}

/// Scoring state for one game
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u32,
    /// Current level
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
    /// Level the game was started on
    pub start_level: u32,
}

impl Score {
    pub fn new(start_level: u32) -> Self {
        Self {
            points: 0,
            level: start_level,
            lines: 0,
            start_level,
        }
    }

    /// Add a line clear of `count` rows. Returns the points awarded.
    ///
    /// Points use the level before any level-up, and at most one level is
    /// gained per clear.
    pub fn add_clear(&mut self, count: u32) -> u32 {
        let awarded = compute_score(self.level, count);
        self.points = self.points.saturating_add(awarded);
        self.lines = self.lines.saturating_add(count);

        if self.lines >= lines_for_next_level(self.start_level, self.level) {
            self.level = self.level.saturating_add(1);
            tracing::info!("Level up to {} at {} lines", self.level, self.lines);
        }
        awarded
    }

    /// Seconds between gravity steps at the current level
    pub fn seconds_per_drop(&self) -> f64 {
        seconds_per_drop(self.level)
    }
}
