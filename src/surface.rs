//! Drawing targets.
//! `TerminalSurface` paints the page with ANSI colours; `HtmlSurface` rewrites a
//! self-refreshing HTML file that a browser (or a big screen) can keep open.
//! The master desk owns its terminal for prompts, so the master always draws
//! into an HTML file.

use anyhow::{Context, Result};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::board::{BoardView, CellView};
use crate::html::page_document;
use crate::scoreboard::ScoreCard;
use crate::timer::{TimerReading, Urgency};
use crate::view::{Page, Screen};

pub trait Surface {
    /// Replaces whatever was shown with `page`.
    fn present(&mut self, page: &Page) -> Result<()>;
    /// Refreshes only the countdown of the page currently shown.
    fn update_timer(&mut self, reading: &TimerReading) -> Result<()>;
    /// Surfaces a message to the user (failed mutations, confirmations).
    fn alert(&mut self, message: &str);
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn present(&mut self, page: &Page) -> Result<()> {
        (**self).present(page)
    }

    fn update_timer(&mut self, reading: &TimerReading) -> Result<()> {
        (**self).update_timer(reading)
    }

    fn alert(&mut self, message: &str) {
        (**self).alert(message)
    }
}

// *************** Terminal ***************

const CELL_WIDTH: usize = 14;

#[derive(Debug, Default)]
pub struct TerminalSurface;

impl Surface for TerminalSurface {
    fn present(&mut self, page: &Page) -> Result<()> {
        let mut out = io::stdout();
        execute!(out, Clear(ClearType::All), MoveTo(0, 0)).context("Failed to clear terminal")?;

        let mut text = String::new();
        text.push_str(&format!("{}", format!("Panel Dash - {}", page.role.title()).bold()));
        if let Some(status) = page.status {
            text.push_str(&format!("  [{}]", status.label()));
        }
        text.push('\n');

        match &page.screen {
            Screen::Waiting => text.push_str("\nWaiting for the game to start...\n"),
            Screen::Setup(form) => {
                text.push_str(&format!(
                    "\nSetup: {size}x{size} board, time limit {limit}\n",
                    size = form.board_size,
                    limit = form.time_limit_text()
                ));
                for team in &form.teams {
                    let swatch = format!("  {}  ", team.name);
                    let swatch = match parse_hex_color(&team.color) {
                        Some(color) => format!("{}", swatch.on(color).white()),
                        None => swatch,
                    };
                    text.push_str(&format!("{} {}\n", swatch, team.member_list()));
                }
                let filled = form.problems.iter().filter(|p| p.is_set()).count();
                text.push_str(&format!("Problems: {}/{} set\n", filled, form.problems.len()));
                for p in form.problems.iter().filter(|p| p.is_set()) {
                    text.push_str(&format!("  ({},{}) {}\n", p.row, p.col, p.preview()));
                }
            }
            Screen::Game { board, scoreboard, timer } => {
                text.push_str(&format!("\n{}\n\n", styled_timer(timer)));
                text.push_str(&terminal_board(board));
                text.push('\n');
                text.push_str(&terminal_scoreboard(scoreboard));
                let links: Vec<&CellView> = board.cells.iter().filter(|c| c.link.is_some()).collect();
                if !links.is_empty() {
                    text.push_str("\nProblems:\n");
                    for cell in links {
                        text.push_str(&format!(
                            "  ({},{}) {}\n",
                            cell.row,
                            cell.col,
                            cell.link.as_deref().unwrap_or_default()
                        ));
                    }
                }
            }
            Screen::Result { board, scoreboard, banner } => {
                text.push('\n');
                if let Some(banner) = banner {
                    let headline = banner.headline.clone().bold();
                    let headline = match parse_hex_color(&banner.color) {
                        Some(color) => headline.with(color),
                        None => headline,
                    };
                    text.push_str(&format!("{}\n\n", headline));
                }
                if let Some(board) = board {
                    text.push_str(&terminal_board(board));
                    text.push('\n');
                }
                text.push_str(&terminal_scoreboard(scoreboard));
            }
        }

        write!(out, "{}", text).context("Failed to write to terminal")?;
        out.flush().context("Failed to flush terminal")?;
        Ok(())
    }

    fn update_timer(&mut self, reading: &TimerReading) -> Result<()> {
        let mut out = io::stdout();
        write!(out, "\r{}   ", styled_timer(reading)).context("Failed to write timer")?;
        out.flush().context("Failed to flush terminal")?;
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{}", format!("! {}", message).red().bold());
    }
}

fn styled_timer(reading: &TimerReading) -> String {
    let text = format!("Time left {}", reading.text).bold();
    let text = match reading.urgency {
        Urgency::Normal => text,
        Urgency::Warning => text.yellow(),
        Urgency::Danger => text.red(),
    };
    format!("{}", text)
}

fn fit(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{:^width$}", clipped, width = width)
}

fn terminal_board(board: &BoardView) -> String {
    let mut text = String::new();
    for row in board.rows() {
        let mut top = String::new();
        let mut bottom = String::new();
        for cell in row {
            let label = fit(cell.label.as_deref().unwrap_or(if cell.captured { "*" } else { "." }), CELL_WIDTH);
            let user = fit(cell.captured_user.as_deref().unwrap_or(""), CELL_WIDTH);
            match cell.background.as_deref().and_then(parse_hex_color) {
                Some(color) => {
                    top.push_str(&format!("{}", label.on(color).white().bold()));
                    bottom.push_str(&format!("{}", user.on(color).white()));
                }
                None => {
                    top.push_str(&format!("{}", label.on(Color::DarkGrey)));
                    bottom.push_str(&format!("{}", user.on(Color::DarkGrey)));
                }
            }
            top.push(' ');
            bottom.push(' ');
        }
        text.push_str(&top);
        text.push('\n');
        text.push_str(&bottom);
        text.push_str("\n\n");
    }
    text
}

fn terminal_scoreboard(cards: &[ScoreCard]) -> String {
    let mut text = String::new();
    for card in cards {
        let entry = format!("  {}  {}  ", card.name, card.score);
        match parse_hex_color(&card.color) {
            Some(color) => text.push_str(&format!("{}", entry.on(color).white().bold())),
            None => text.push_str(&entry),
        }
        text.push(' ');
    }
    text.push('\n');
    text
}

/// `#rrggbb` or `#rgb`.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let digits = hex.trim().strip_prefix('#')?;
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

// *************** HTML file ***************

pub struct HtmlSurface {
    path: PathBuf,
    last: Option<Page>,
}

impl HtmlSurface {
    pub fn new(path: PathBuf) -> Self {
        HtmlSurface { path, last: None }
    }

    // Staged beside the target, then renamed over it: readers only see whole pages.
    fn write(&self, page: &Page) -> Result<()> {
        let document = page_document(page)?;
        let staging = self.staging_path();
        fs::write(&staging, document)
            .with_context(|| format!("Failed to write page to {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(OsString::from).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Surface for HtmlSurface {
    fn present(&mut self, page: &Page) -> Result<()> {
        self.write(page)?;
        self.last = Some(page.clone());
        Ok(())
    }

    fn update_timer(&mut self, reading: &TimerReading) -> Result<()> {
        let Some(mut page) = self.last.take() else {
            return Ok(());
        };
        let changed = page.set_timer(reading);
        let result = if changed { self.write(&page) } else { Ok(()) };
        self.last = Some(page);
        result
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{}", format!("! {}", message).red().bold());
    }
}

// *************** Recording (tests) ***************

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub pages: Vec<Page>,
    pub timers: Vec<TimerReading>,
    pub alerts: Vec<String>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn last_page(&self) -> Option<&Page> {
        self.pages.last()
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn present(&mut self, page: &Page) -> Result<()> {
        self.pages.push(page.clone());
        Ok(())
    }

    fn update_timer(&mut self, reading: &TimerReading) -> Result<()> {
        self.timers.push(reading.clone());
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GameStatus;
    use crate::view::Role;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#e74c3c"), Some(Color::Rgb { r: 0xe7, g: 0x4c, b: 0x3c }));
        assert_eq!(parse_hex_color("#fff"), Some(Color::Rgb { r: 255, g: 255, b: 255 }));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(parse_hex_color("#12345g"), None);
    }

    #[test]
    fn test_fit_clips_and_centers() {
        assert_eq!(fit("abc", 5), " abc ");
        assert_eq!(fit("abcdefgh", 4), "abcd");
    }

    #[test]
    fn test_html_surface_replaces_page_whole() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("panel_dash_replace_{}.html", std::process::id()));
        let surface = HtmlSurface::new(path.clone());
        assert_eq!(
            surface.staging_path(),
            dir.join(format!("panel_dash_replace_{}.html.tmp", std::process::id()))
        );

        fs::write(&path, "stale").unwrap();
        let mut surface = surface;
        let page = Page { role: Role::Spectator, status: None, screen: Screen::Waiting };
        surface.present(&page).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
        assert!(written.trim_end().ends_with("</html>"));
        assert!(!surface.staging_path().exists());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_html_surface_rewrites_timer() {
        let path = std::env::temp_dir().join(format!("panel_dash_surface_{}.html", std::process::id()));
        let mut surface = HtmlSurface::new(path.clone());
        let page = Page {
            role: Role::Participant,
            status: Some(GameStatus::Running),
            screen: Screen::Game {
                board: BoardView { size: 1, cell_px: 80, cells: vec![CellView::default()] },
                scoreboard: vec![],
                timer: TimerReading::placeholder(),
            },
        };
        surface.present(&page).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("--:--"));

        let reading = TimerReading { text: "01:05".into(), urgency: Urgency::Normal, remaining: Some(65) };
        surface.update_timer(&reading).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("01:05"));
        assert!(!surface.staging_path().exists());
        let _ = fs::remove_file(path);
    }
}
