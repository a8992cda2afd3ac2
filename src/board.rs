//! Board renderer.
//! Projects a snapshot onto a `board_size x board_size` grid of cell views, row-major.
//! Each position is found by a linear scan of the snapshot's cells, which is fine at
//! contest scale (at most ~100 cells).
//! Rendering never fails: a cell missing optional fields just shows fewer elements.

use crate::model::{GameState, Team, TeamId};
use std::collections::HashMap;

/// Fallback colours for teams without an explicit one, cycled by team position.
pub const TEAM_COLORS: [&str; 4] = [
    "#e74c3c", // red
    "#3498db", // blue
    "#2ecc71", // green
    "#f39c12", // orange
];

pub const PARTICIPANT_CELL_PX: u32 = 80;
const SPECTATOR_MIN_CELL_PX: u32 = 80;
const SPECTATOR_MAX_CELL_PX: u32 = 150;
// Room taken by the header and scoreboard around the spectator board.
const SPECTATOR_RESERVED_HEIGHT: u32 = 300;
const SPECTATOR_RESERVED_WIDTH: u32 = 100;
const SPECTATOR_CELL_GAP: u32 = 10;

pub fn palette_color(index: usize) -> &'static str {
    TEAM_COLORS[index % TEAM_COLORS.len()]
}

/// Explicit colour if set, else the palette entry for the team's position.
pub fn resolve_team_color(team: &Team, index: usize) -> &str {
    team.explicit_color().unwrap_or_else(|| palette_color(index))
}

/// Team id -> display colour, built in team order.
pub fn team_colors(state: &GameState) -> HashMap<&TeamId, &str> {
    state
        .teams
        .iter()
        .enumerate()
        .map(|(index, team)| (&team.id, resolve_team_color(team, index)))
        .collect()
}

/// Largest cell that fits the viewport, clamped to `[80, 150]` pixels.
pub fn spectator_cell_px(board_size: usize, viewport_width: u32, viewport_height: u32) -> u32 {
    let size = u32::try_from(board_size.max(1)).unwrap_or(u32::MAX);
    let fit_height = (viewport_height.saturating_sub(SPECTATOR_RESERVED_HEIGHT) / size)
        .saturating_sub(SPECTATOR_CELL_GAP);
    let fit_width = (viewport_width.saturating_sub(SPECTATOR_RESERVED_WIDTH) / size)
        .saturating_sub(SPECTATOR_CELL_GAP);
    fit_height
        .min(fit_width)
        .min(SPECTATOR_MAX_CELL_PX)
        .max(SPECTATOR_MIN_CELL_PX)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardOptions {
    pub show_links: bool,
    pub cell_px: u32,
}

impl BoardOptions {
    pub fn with_links() -> Self {
        BoardOptions { show_links: true, cell_px: PARTICIPANT_CELL_PX }
    }

    pub fn without_links() -> Self {
        BoardOptions { show_links: false, cell_px: PARTICIPANT_CELL_PX }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub label: Option<String>,
    pub link: Option<String>,
    pub background: Option<String>,
    pub captured: bool,
    pub captured_user: Option<String>,
}

#[cfg(test)]
impl CellView {
    pub fn is_blank(&self) -> bool {
        self.label.is_none()
            && self.link.is_none()
            && self.background.is_none()
            && !self.captured
            && self.captured_user.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardView {
    pub size: usize,
    pub cell_px: u32,
    /// Row-major, `size * size` entries.
    pub cells: Vec<CellView>,
}

impl BoardView {
    #[cfg(test)]
    pub fn at(&self, row: usize, col: usize) -> Option<&CellView> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells.get(row * self.size + col)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellView]> {
        self.cells.chunks(self.size.max(1))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn render_board(state: &GameState, options: BoardOptions) -> BoardView {
    let colors = team_colors(state);
    let size = state.board_size;
    let mut cells = Vec::with_capacity(size * size);

    for row in 0..size {
        for col in 0..size {
            let mut view = CellView { row, col, ..CellView::default() };

            if let Some(cell) = state.cell_at(row, col) {
                view.label = non_empty(&cell.problem_id);
                if options.show_links {
                    view.link = non_empty(&cell.problem_url);
                }
                if let Some(owner) = &cell.captured_by_team_id {
                    view.captured = true;
                    view.background = colors.get(owner).map(|c| c.to_string());
                    view.captured_user = non_empty(&cell.captured_by_user);
                }
            }

            cells.push(view);
        }
    }

    BoardView { size, cell_px: options.cell_px, cells }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, GameStatus};
    use std::collections::HashMap;

    fn team(id: &str, color: Option<&str>) -> Team {
        Team {
            id: TeamId::new(id),
            name: format!("Team {id}"),
            color: color.map(str::to_string),
            members: vec![],
        }
    }

    fn state(size: usize, teams: Vec<Team>, cells: Vec<Cell>) -> GameState {
        GameState {
            id: None,
            status: GameStatus::Running,
            board_size: size,
            time_limit: None,
            started_at: None,
            ended_at: None,
            teams,
            cells,
            scores: HashMap::new(),
        }
    }

    #[test]
    fn test_single_capture_on_3x3() {
        let cell = Cell {
            row: 1,
            col: 1,
            captured_by_team_id: Some(TeamId::new("t1")),
            ..Cell::default()
        };
        let board = render_board(&state(3, vec![team("t1", None)], vec![cell]), BoardOptions::with_links());

        assert_eq!(board.cells.len(), 9);
        let center = board.at(1, 1).unwrap();
        assert_eq!(center.background.as_deref(), Some("#e74c3c"));
        assert!(center.captured);
        let blanks = board.cells.iter().filter(|c| c.is_blank()).count();
        assert_eq!(blanks, 8);
    }

    #[test]
    fn test_explicit_color_wins() {
        let t = team("a", Some("#123456"));
        assert_eq!(resolve_team_color(&t, 0), "#123456");
        let empty = team("b", Some(""));
        assert_eq!(resolve_team_color(&empty, 1), "#3498db");
    }

    #[test]
    fn test_palette_wraps_past_four_teams() {
        let teams: Vec<Team> = (0..6).map(|i| team(&i.to_string(), None)).collect();
        let s = state(2, teams, vec![]);
        let colors = team_colors(&s);
        assert_eq!(colors[&TeamId::new("4")], "#e74c3c");
        assert_eq!(colors[&TeamId::new("5")], "#3498db");
        assert_eq!(colors[&TeamId::new("3")], "#f39c12");
    }

    #[test]
    fn test_links_only_when_enabled() {
        let cell = Cell {
            row: 0,
            col: 0,
            problem_id: Some("abc001_a".into()),
            problem_url: Some("https://atcoder.jp/contests/abc001/tasks/abc001_a".into()),
            ..Cell::default()
        };
        let s = state(1, vec![], vec![cell]);

        let with = render_board(&s, BoardOptions::with_links());
        assert!(with.at(0, 0).unwrap().link.is_some());
        assert_eq!(with.at(0, 0).unwrap().label.as_deref(), Some("abc001_a"));

        let without = render_board(&s, BoardOptions::without_links());
        assert!(without.at(0, 0).unwrap().link.is_none());
    }

    #[test]
    fn test_malformed_cell_degrades() {
        let cell = Cell {
            row: 0,
            col: 1,
            problem_id: Some(String::new()),
            captured_by_user: Some("ghost".into()),
            ..Cell::default()
        };
        let board = render_board(&state(2, vec![], vec![cell]), BoardOptions::with_links());
        // Handle without a capturing team is not shown.
        assert!(board.at(0, 1).unwrap().is_blank());
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let s = state(4, vec![team("a", None)], vec![]);
        assert_eq!(
            render_board(&s, BoardOptions::with_links()),
            render_board(&s, BoardOptions::with_links())
        );
    }

    #[test]
    fn test_spectator_cell_px_clamps() {
        // 1080 - 300 = 780 / 5 = 156 - 10 = 146; 1920 - 100 = 1820 / 5 = 364 - 10
        assert_eq!(spectator_cell_px(5, 1920, 1080), 146);
        assert_eq!(spectator_cell_px(2, 3840, 2160), 150);
        assert_eq!(spectator_cell_px(10, 800, 600), 80);
    }

    #[test]
    fn test_spectator_cell_px_huge_board() {
        // Would truncate to 0 as u32.
        assert_eq!(spectator_cell_px(1usize << 32, 1920, 1080), 80);
        assert_eq!(spectator_cell_px(usize::MAX, 1920, 1080), 80);
    }

    #[test]
    fn test_rows_chunks_row_major() {
        let board = render_board(&state(3, vec![], vec![]), BoardOptions::with_links());
        let rows: Vec<_> = board.rows().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[2][1].row, rows[2][1].col), (2, 1));
    }
}
