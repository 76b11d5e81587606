//! Terminal UI rendering with ratatui

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, GAME_OVER_ROW, VISIBLE_HEIGHT};
use crate::game::{Game, Phase};
use crate::settings::Settings;
use crate::tetromino::{cell_color, Rotation, TetrominoType};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const EMPTY: &str = "  ";

/// Board (10*2 + 2 for borders) plus stats (18)
const GAME_WIDTH: u16 = 40;
/// Visible rows plus borders
const GAME_HEIGHT: u16 = VISIBLE_HEIGHT as u16 + 2;

/// Frame-rate figures shown in the side panel
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f64,
    pub frames: u64,
}

/// Render one frame of the game
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings, stats: FrameStats) {
    let area = frame.area();
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BOARD_WIDTH as u16 * 2 + 2),
            Constraint::Length(18),
        ])
        .split(game_area);

    render_board(frame, layout[0], game, settings, stats.frames);
    render_stats(frame, layout[1], game, settings, stats);

    match game.phase {
        Phase::Start => render_start(frame, layout[0], game, settings),
        Phase::Paused => render_overlay(
            frame,
            layout[0],
            "PAUSED",
            &format!("{} to resume", key_names(&settings.keys.pause)),
        ),
        Phase::GameOver => render_overlay(
            frame,
            layout[0],
            "GAME OVER",
            &format!("{} to continue", key_names(&settings.keys.drop)),
        ),
        Phase::Playing | Phase::Line => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// What occupies one visible cell
fn cell_at(game: &Game, settings: &Settings, row: usize, col: usize) -> Option<(Color, bool)> {
    let in_play = matches!(game.phase, Phase::Playing | Phase::Paused);
    let (r, c) = (row as i32, col as i32);

    if in_play {
        let piece = game.piece;
        if let Some((_, _, value)) = piece.blocks().find(|&(pr, pc, _)| pr == r && pc == c) {
            return cell_color(value).map(|color| (color, false));
        }
    }

    if let Some(color) = cell_color(game.board.get(row, col)) {
        return Some((color, false));
    }

    if in_play && settings.visual.show_ghost {
        let landing = game.piece.landing(&game.board);
        if landing.row != game.piece.row && landing.blocks().any(|(lr, lc, _)| lr == r && lc == c) {
            return Some((game.piece.piece_type.color(), true));
        }
    }

    None
}

fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings, frames: u64) {
    let (block_char, ghost_char) = settings.visual.block_chars();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Rows being cleared flash white on alternate frames
    let flash = game.phase == Phase::Line && frames % 2 == 0;

    let mut lines: Vec<Line> = Vec::new();
    for row in GAME_OVER_ROW..BOARD_HEIGHT {
        let mut spans = Vec::new();
        for col in 0..BOARD_WIDTH {
            let span = match cell_at(game, settings, row, col) {
                _ if flash && game.lines.contains(row) => {
                    Span::styled(block_char, Style::default().fg(Color::White))
                }
                Some((color, false)) => Span::styled(block_char, Style::default().fg(color)),
                Some((color, true)) => Span::styled(ghost_char, Style::default().fg(color).dim()),
                None => Span::raw(EMPTY),
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings, stats: FrameStats) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));

    let mut lines = vec![
        label("LEVEL"),
        Line::styled(format!("{}", game.score.level), Style::default().fg(Color::Cyan)),
        label("LINES"),
        Line::styled(format!("{}", game.score.lines), Style::default().fg(Color::Green)),
        label("SCORE"),
        Line::styled(format!("{}", game.score.points), Style::default().fg(Color::Yellow).bold()),
        label("HI"),
        Line::styled(format!("{}", game.hiscore), Style::default().fg(Color::Magenta)),
        Line::raw(""),
        label("NEXT"),
    ];

    if game.phase != Phase::Start {
        let (block_char, _) = settings.visual.block_chars();
        lines.extend(mini_piece(game.next, block_char));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("FPS {:.0}", stats.fps),
        Style::default().fg(Color::DarkGray),
    ));
    lines.push(Line::styled(
        format!("DTIME {:.3}", game.seconds_per_drop()),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Occupied rows of a piece at spawn rotation
fn mini_piece(piece_type: TetrominoType, block_char: &str) -> Vec<Line<'static>> {
    let side = piece_type.side();
    let color = piece_type.color();
    let block_char = block_char.to_string();

    (0..side)
        .filter(|&row| (0..side).any(|col| piece_type.cell_at(row, col, Rotation::North) != 0))
        .map(|row| {
            let spans: Vec<Span> = (0..side)
                .map(|col| {
                    if piece_type.cell_at(row, col, Rotation::North) != 0 {
                        Span::styled(block_char.clone(), Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Level select and controls
fn render_start(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let popup_area = center_rect(area, area.width, 16);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" NESTRS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let keys = &settings.keys;
    let control = |name: &'static str, bound: &[String]| {
        Line::from(vec![
            Span::styled(format!("{:<7}", name), Style::default().fg(Color::Gray)),
            Span::raw(key_names(bound)),
        ])
    };

    let text = vec![
        Line::styled(
            format!("LEVEL {}", game.start_level),
            Style::default().fg(Color::Yellow).bold(),
        ),
        Line::styled(
            format!("{}/{} to change", key_names(&keys.up), key_names(&keys.down)),
            Style::default().fg(Color::DarkGray),
        ),
        Line::raw(""),
        control("Left", &keys.move_left),
        control("Right", &keys.move_right),
        control("Down", &keys.soft_drop),
        control("Rot L", &keys.rotate_ccw),
        control("Rot R", &keys.rotate_cw),
        control("Drop", &keys.drop),
        control("Pause", &keys.pause),
        control("Quit", &keys.quit),
        Line::raw(""),
        Line::styled(
            format!("{} to start", key_names(&keys.drop)),
            Style::default().fg(Color::Yellow),
        ),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = area.width.min(22);
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn key_names(keys: &[String]) -> String {
    keys.join("/")
}
