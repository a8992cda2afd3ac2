//! Admin setup form.
//! Holds the editable team configs and problem grid before they are POSTed to
//! `/api/game/setup`. The form is either generated from defaults or restored from a
//! snapshot that is still in setup; it is never merged back into the cached snapshot.

use crate::board::palette_color;
use crate::model::{CellSetup, GameState, SetupRequest, TeamSetup};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BOARD_SIZE: usize = 5;
pub const DEFAULT_TEAM_COUNT: usize = 2;
pub const DEFAULT_TIME_LIMIT: u32 = 60;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamForm {
    pub name: String,
    pub color: String,
    /// One handle per line, as typed.
    pub members: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProblemInput {
    pub row: usize,
    pub col: usize,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetupForm {
    pub board_size: usize,
    /// Minutes, 0 for no limit.
    pub time_limit: u32,
    pub teams: Vec<TeamForm>,
    pub problems: Vec<ProblemInput>,
}

impl Default for SetupForm {
    fn default() -> Self {
        SetupForm::generate(DEFAULT_BOARD_SIZE, DEFAULT_TEAM_COUNT)
    }
}

impl SetupForm {
    /// Fresh form; zero sizes fall back to the defaults.
    pub fn generate(board_size: usize, team_count: usize) -> Self {
        let board_size = if board_size == 0 { DEFAULT_BOARD_SIZE } else { board_size };
        let team_count = if team_count == 0 { DEFAULT_TEAM_COUNT } else { team_count };

        SetupForm {
            board_size,
            time_limit: DEFAULT_TIME_LIMIT,
            teams: default_teams(team_count),
            problems: empty_grid(board_size),
        }
    }

    /// Rebuilds teams and grid for new dimensions. Entered values are discarded;
    /// the time limit is kept.
    pub fn regenerate(&mut self, board_size: usize, team_count: usize) {
        let time_limit = self.time_limit;
        *self = SetupForm::generate(board_size, team_count);
        self.time_limit = time_limit;
    }

    /// Form prefilled from a snapshot.
    pub fn restore(state: &GameState) -> Self {
        let mut form = SetupForm::generate(state.board_size, state.teams.len());
        form.time_limit = state.time_limit_minutes();

        for (slot, team) in form.teams.iter_mut().zip(&state.teams) {
            slot.name = team.name.clone();
            if let Some(color) = team.explicit_color() {
                slot.color = color.to_string();
            }
            slot.members = team.members.join("\n");
        }

        for cell in &state.cells {
            let Some(url) = cell.problem_url.as_deref().filter(|u| !u.is_empty()) else {
                continue;
            };
            if let Some(input) = form.problem_mut(cell.row, cell.col) {
                input.url = url.to_string();
            }
        }

        form
    }

    pub fn problem_mut(&mut self, row: usize, col: usize) -> Option<&mut ProblemInput> {
        self.problems.iter_mut().find(|p| p.row == row && p.col == col)
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn to_request(&self) -> SetupRequest {
        SetupRequest {
            board_size: self.board_size,
            time_limit: self.time_limit,
            teams: self
                .teams
                .iter()
                .map(|t| TeamSetup {
                    name: t.name.clone(),
                    color: t.color.clone(),
                    members: parse_members(&t.members),
                })
                .collect(),
            cells: self
                .problems
                .iter()
                .map(|p| CellSetup {
                    row: p.row,
                    col: p.col,
                    problem_url: p.url.trim().to_string(),
                })
                .collect(),
        }
    }

    /// "45 min", or "none" without a limit.
    pub fn time_limit_text(&self) -> String {
        if self.time_limit == 0 {
            "none".to_string()
        } else {
            format!("{} min", self.time_limit)
        }
    }
}

impl TeamForm {
    pub fn member_list(&self) -> String {
        parse_members(&self.members).join(", ")
    }
}

impl ProblemInput {
    /// Problem id when the URL has one, else the URL as typed.
    pub fn preview(&self) -> &str {
        problem_id_from_url(&self.url).unwrap_or(self.url.trim())
    }

    pub fn is_set(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

fn default_teams(count: usize) -> Vec<TeamForm> {
    (0..count)
        .map(|i| TeamForm {
            name: format!("Team {}", i + 1),
            color: palette_color(i).to_string(),
            members: String::new(),
        })
        .collect()
}

fn empty_grid(size: usize) -> Vec<ProblemInput> {
    (0..size)
        .flat_map(|row| (0..size).map(move |col| ProblemInput { row, col, url: String::new() }))
        .collect()
}

/// Trimmed, non-empty lines.
pub fn parse_members(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// `https://atcoder.jp/contests/abc001/tasks/abc001_a?lang=en` -> `abc001_a`
pub fn problem_id_from_url(url: &str) -> Option<&str> {
    let (_, tail) = url.trim().rsplit_once("/tasks/")?;
    let id = tail.split(['?', '#']).next().unwrap_or("");
    (!id.is_empty()).then_some(id)
}
