//! NESTRS - classic falling blocks in the terminal
//!
//! Gravity, scoring and level progression follow the NES ruleset.

mod audio;
mod board;
mod clock;
mod game;
mod input;
mod lines;
mod piece;
mod score;
mod settings;
mod tetromino;
mod ui;

use audio::AudioManager;
use clock::FrameClock;
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use game::Game;
use input::{InputState, KeyTracker};
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};
use ui::FrameStats;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the nestrs temp directory, creating it if needed
fn nestrs_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("nestrs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn init_tracing(session_id: u32) -> tracing_appender::non_blocking::WorkerGuard {
    let dir = nestrs_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&dir, &log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "nestrs=debug".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(
        "NESTRS starting up, session={:08x}, log={}",
        session_id,
        dir.join(&log_file).display()
    );
    guard
}

fn main() -> io::Result<()> {
    let _guard = init_tracing(rand::random());

    let mut settings = Settings::load();

    // Optional; the game runs silently without a device or sound files
    let mut audio = AudioManager::new();
    if let Some(a) = audio.as_mut() {
        a.set_sfx_volume(settings.audio.sfx_volume as f32 / 100.0);
    } else {
        tracing::info!("Audio unavailable, running silent");
    }

    let mut game = Game::new();
    game.hiscore = settings.high_score.best;
    game.start_level = settings.gameplay.start_level;

    let mut tracker = KeyTracker::from_settings(&settings);

    // Setup terminal
    enable_raw_mode()?;
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    tracker.set_release_events(enhanced);
    tracing::debug!("Key release events: {}", enhanced);
    execute!(stdout(), EnterAlternateScreen, EnableFocusChange)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut game, &mut tracker, &mut audio, &settings);

    // Persist before restoring the terminal
    record_session(&mut settings, &game);
    let saved = settings.save();
    let restored = restore_terminal(&mut terminal, enhanced);

    if let Err(e) = saved {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    if result.is_ok() {
        println!("Thanks for playing NESTRS!");
        println!("High score: {}", settings.high_score.best);
    }

    result.and(restored)
}

/// Copy what outlives the session back into the settings
fn record_session(settings: &mut Settings, game: &Game) {
    settings.record_score(game.hiscore);
    settings.gameplay.start_level = game.start_level;
}

/// Undo terminal setup, attempting every step even after a failure
fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    enhanced: bool,
) -> io::Result<()> {
    let mut result = Ok(());
    if enhanced {
        result = result.and(execute!(stdout(), PopKeyboardEnhancementFlags));
    }
    result = result.and(execute!(stdout(), DisableFocusChange));
    result = result.and(disable_raw_mode());
    result = result.and(execute!(stdout(), LeaveAlternateScreen));
    result.and(terminal.show_cursor())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    tracker: &mut KeyTracker,
    audio: &mut Option<AudioManager>,
    settings: &Settings,
) -> io::Result<()> {
    let mut clock = FrameClock::new();
    let mut input = InputState::default();
    let mut next_frame = Instant::now();

    loop {
        // Handle input until the next frame is due
        loop {
            let timeout = next_frame.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Key(key) => {
                    if tracker.handle_key(key, Instant::now()) {
                        tracing::info!("Quit requested");
                        return Ok(());
                    }
                }
                Event::FocusLost => tracker.clear(),
                _ => {}
            }
        }

        // Skip frames rather than run several at once after a stall
        let now = Instant::now();
        next_frame = (next_frame + FRAME_DURATION).max(now);

        let time = clock.tick();
        input = input.next(tracker.levels(now));
        match audio.as_mut() {
            Some(audio) => game.update(time, &input, audio),
            None => game.update(time, &input, &mut ()),
        }

        let stats = FrameStats {
            fps: clock.fps(),
            frames: clock.frames(),
        };
        terminal.draw(|frame| ui::render_game(frame, game, settings, stats))?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_session_keeps_best_score() {
        let mut settings = Settings::default();
        settings.high_score.best = 900;

        let mut game = Game::with_seed(1);
        game.hiscore = 400;
        game.start_level = 6;
        record_session(&mut settings, &game);
        assert_eq!(settings.high_score.best, 900);
        assert_eq!(settings.gameplay.start_level, 6);

        game.hiscore = 1500;
        record_session(&mut settings, &game);
        assert_eq!(settings.high_score.best, 1500);
    }
}
