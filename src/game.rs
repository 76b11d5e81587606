//! Core game state and logic
//!
//! `Game` is advanced once per frame by `update`, which reads the frame's
//! input edges and dispatches on the current phase. Time is supplied by the
//! caller in seconds and only compared against deadlines stored here.

use crate::board::Board;
use crate::input::InputState;
use crate::lines::{collapse, find_filled_rows, LineMask};
use crate::piece::PieceState;
use crate::score::Score;
use crate::tetromino::TetrominoType;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// How long filled rows stay highlighted before they collapse
const LINE_HIGHLIGHT_SECONDS: f64 = 0.5;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Choosing the starting level
    Start,
    Playing,
    /// Filled rows are highlighted, waiting to collapse
    Line,
    Paused,
    GameOver,
}

/// Events worth a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Lock,
    LineClear,
    Pause,
    Resume,
    GameOver,
    HighScore,
}

/// Receiver for game cues. Delivery is fire-and-forget.
pub trait CueSink {
    fn cue(&mut self, cue: Cue);
}

/// Discards every cue
impl CueSink for () {
    fn cue(&mut self, _cue: Cue) {}
}

/// Records cues in order
impl CueSink for Vec<Cue> {
    fn cue(&mut self, cue: Cue) {
        self.push(cue);
    }
}

/// Result of one soft drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fall {
    Falling,
    Locked,
}

/// The main game struct
pub struct Game {
    /// The game board
    pub board: Board,
    /// Rows being cleared; only meaningful in `Phase::Line`
    pub lines: LineMask,
    /// Current falling piece
    pub piece: PieceState,
    /// Piece that spawns after the current one locks
    pub next: TetrominoType,
    /// Current phase
    pub phase: Phase,
    /// Level chosen on the start screen
    pub start_level: u32,
    /// Score, level and line count
    pub score: Score,
    /// Best score seen, including this session
    pub hiscore: u32,
    /// Whether the next new high score still gets a cue
    hiscore_armed: bool,
    /// Game clock in seconds, as of the last update
    pub time: f64,
    next_drop_time: f64,
    highlight_end_time: f64,
    rng: ChaCha8Rng,
}

impl Game {
    /// Create a new game on the start screen
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a new game with a fixed piece sequence
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = random_tetromino(&mut rng);

        Self {
            board: Board::new(),
            lines: LineMask::default(),
            piece: PieceState::spawn(TetrominoType::T),
            next,
            phase: Phase::Start,
            start_level: 0,
            score: Score::new(0),
            hiscore: 0,
            hiscore_armed: true,
            time: 0.0,
            next_drop_time: 0.0,
            highlight_end_time: 0.0,
            rng,
        }
    }

    /// Seconds between gravity steps at the current level
    pub fn seconds_per_drop(&self) -> f64 {
        self.score.seconds_per_drop()
    }

    /// Advance one frame
    pub fn update(&mut self, time: f64, input: &InputState, cues: &mut impl CueSink) {
        self.time = time;
        self.track_hiscore(cues);

        match self.phase {
            Phase::Start => self.update_start(input),
            Phase::Playing => self.update_play(input, cues),
            Phase::Line => self.update_line(),
            Phase::Paused => self.update_pause(input, cues),
            Phase::GameOver => self.update_game_over(input),
        }
    }

    fn track_hiscore(&mut self, cues: &mut impl CueSink) {
        match self.phase {
            Phase::Start => self.hiscore_armed = true,
            Phase::Playing if self.score.points > self.hiscore => {
                self.hiscore = self.score.points;
                if self.hiscore_armed {
                    self.hiscore_armed = false;
                    tracing::info!("New high score {}", self.hiscore);
                    cues.cue(Cue::HighScore);
                }
            }
            _ => {}
        }
    }

    fn update_start(&mut self, input: &InputState) {
        let pressed = &input.pressed;
        if pressed.up {
            self.start_level = self.start_level.saturating_add(1);
        }
        if pressed.down && self.start_level > 0 {
            self.start_level -= 1;
        }

        if pressed.drop {
            self.board.clear();
            self.lines = LineMask::default();
            self.score = Score::new(self.start_level);
            self.spawn_piece();
            self.pick_next();
            self.phase = Phase::Playing;
            tracing::info!("Game started at level {}", self.start_level);
        }
    }

    fn update_play(&mut self, input: &InputState, cues: &mut impl CueSink) {
        let pressed = &input.pressed;

        // All moves of this frame are tried together and kept only if valid
        let mut candidate = self.piece;
        if pressed.move_left {
            candidate = candidate.shifted(-1);
        }
        if pressed.move_right {
            candidate = candidate.shifted(1);
        }
        if pressed.rotate_cw {
            candidate = candidate.rotated_cw();
        }
        if pressed.rotate_ccw {
            candidate = candidate.rotated_ccw();
        }
        if candidate.is_valid(&self.board) {
            self.piece = candidate;
        }

        // A lock that fills a row or tops out stops gravity for the rest of the frame
        let mut halted = false;
        if (pressed.soft_drop || pressed.down) && self.soft_drop(cues) == Fall::Locked {
            halted = self.needs_resolution();
        }

        if pressed.drop {
            while self.soft_drop(cues) == Fall::Falling {}
            halted = self.needs_resolution();
        }

        while !halted && self.time >= self.next_drop_time {
            if self.soft_drop(cues) == Fall::Locked {
                halted = self.needs_resolution();
            }
        }

        self.lines = find_filled_rows(&self.board);
        if !self.lines.is_empty() {
            self.phase = Phase::Line;
            self.highlight_end_time = self.time + LINE_HIGHLIGHT_SECONDS;
            tracing::debug!("{} rows filled", self.lines.count());
            cues.cue(Cue::LineClear);
        }

        if self.board.is_topped_out() {
            self.phase = Phase::GameOver;
            tracing::info!(
                "Game over: score {} level {} lines {}",
                self.score.points,
                self.score.level,
                self.score.lines
            );
            cues.cue(Cue::GameOver);
        }

        if pressed.pause && self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            tracing::debug!("Paused at {:.2}s", self.time);
            cues.cue(Cue::Pause);
        }
    }

    fn update_line(&mut self) {
        if self.time < self.highlight_end_time {
            return;
        }

        collapse(&mut self.board, &self.lines);
        let awarded = self.score.add_clear(self.lines.count());
        tracing::debug!("Cleared {} rows for {} points", self.lines.count(), awarded);
        self.lines = LineMask::default();
        self.phase = Phase::Playing;
    }

    fn update_pause(&mut self, input: &InputState, cues: &mut impl CueSink) {
        if input.pressed.pause || input.pressed.drop {
            self.phase = Phase::Playing;
            tracing::debug!("Resumed at {:.2}s", self.time);
            cues.cue(Cue::Resume);
        }
    }

    fn update_game_over(&mut self, input: &InputState) {
        if input.pressed.drop {
            self.board.clear();
            self.phase = Phase::Start;
        }
    }

    /// Move the piece down one row, or lock it and spawn the next one
    fn soft_drop(&mut self, cues: &mut impl CueSink) -> Fall {
        let lowered = self.piece.lowered();
        if lowered.is_valid(&self.board) {
            self.piece = lowered;
            self.next_drop_time = self.time + self.seconds_per_drop();
            return Fall::Falling;
        }

        self.piece.merge_into(&mut self.board);
        tracing::debug!(
            "Locked {:?} at row {} col {}",
            self.piece.piece_type,
            self.piece.row,
            self.piece.col
        );
        self.spawn_piece();
        self.pick_next();
        cues.cue(Cue::Lock);
        Fall::Locked
    }

    /// Whether the board must leave play after a lock
    fn needs_resolution(&self) -> bool {
        self.board.is_topped_out() || !find_filled_rows(&self.board).is_empty()
    }

    fn spawn_piece(&mut self) {
        self.piece = PieceState::spawn(self.next);
        self.next_drop_time = self.time + self.seconds_per_drop();
    }

    fn pick_next(&mut self) {
        self.next = random_tetromino(&mut self.rng);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform pick over the seven shapes, no bag
fn random_tetromino(rng: &mut ChaCha8Rng) -> TetrominoType {
    let all = TetrominoType::all();
    all[rng.gen_range(0..all.len())]
}
