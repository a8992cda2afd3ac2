//! Game-state snapshot types.
//! Mirrors the JSON served by `GET /api/game` and the bodies POSTed to the mutation endpoints.
//! A snapshot is decoded and validated once per fetch; renderers trust it afterwards
//! but still treat every optional field as possibly missing.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Largest board a snapshot may describe. Contest boards are at most about 10x10;
/// anything far beyond that is a server bug, not a game.
pub const MAX_BOARD_SIZE: usize = 32;

// *************** Snapshot Types ***************

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Setup,
    Running,
    Ended,
}

impl GameStatus {
    /// Badge text, e.g. "Running".
    pub fn label(self) -> &'static str {
        match self {
            GameStatus::Setup => "Setup",
            GameStatus::Running => "Running",
            GameStatus::Ended => "Ended",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Setup => "setup",
            GameStatus::Running => "running",
            GameStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team key. The server sends ids as JSON numbers, but score-map keys always
/// arrive as strings, so both forms collapse into the same textual key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    #[cfg(test)]
    pub fn new(id: impl Into<String>) -> Self {
        TeamId(id.into())
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TeamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => TeamId(n.to_string()),
            Raw::Str(s) => TeamId(s),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Team {
    /// Explicit colour, ignoring empty strings.
    pub fn explicit_color(&self) -> Option<&str> {
        self.color.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Cell {
    #[serde(default)]
    pub id: Option<i64>,
    pub row: usize,
    pub col: usize,
    #[serde(default)]
    pub problem_url: Option<String>,
    #[serde(default)]
    pub problem_id: Option<String>,
    #[serde(default)]
    pub captured_by_team_id: Option<TeamId>,
    #[serde(default)]
    pub captured_by_user: Option<String>,
    #[serde(default)]
    pub captured_at: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GameState {
    #[serde(default)]
    pub id: Option<i64>,
    pub status: GameStatus,
    pub board_size: usize,
    /// Minutes; `None` and `Some(0)` both mean unlimited.
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub started_at: Option<i64>,
    #[serde(default)]
    pub ended_at: Option<i64>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub scores: HashMap<TeamId, i64>,
}

impl GameState {
    /// Score for a team, 0 when the server sent none.
    pub fn score_of(&self, team: &TeamId) -> i64 {
        self.scores.get(team).copied().unwrap_or(0)
    }

    /// Linear scan for the cell at a grid position.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit.unwrap_or(0)
    }

    /// Checks the snapshot invariants the renderers rely on.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.board_size == 0 {
            return Err(SnapshotError::EmptyBoard);
        }
        if self.board_size > MAX_BOARD_SIZE {
            return Err(SnapshotError::BoardTooLarge(self.board_size));
        }

        let mut team_ids = HashSet::new();
        for team in &self.teams {
            if !team_ids.insert(&team.id) {
                return Err(SnapshotError::DuplicateTeam(team.id.clone()));
            }
        }

        let mut positions = HashSet::new();
        for cell in &self.cells {
            if cell.row >= self.board_size || cell.col >= self.board_size {
                return Err(SnapshotError::CellOutOfBounds {
                    row: cell.row,
                    col: cell.col,
                    size: self.board_size,
                });
            }
            if !positions.insert((cell.row, cell.col)) {
                return Err(SnapshotError::DuplicateCell {
                    row: cell.row,
                    col: cell.col,
                });
            }
            if let Some(owner) = &cell.captured_by_team_id {
                if !team_ids.contains(owner) {
                    return Err(SnapshotError::UnknownTeam(owner.clone()));
                }
            }
        }

        if let Some(unknown) = self.scores.keys().find(|id| !team_ids.contains(id)) {
            return Err(SnapshotError::UnknownTeam(unknown.clone()));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("board size must be positive")]
    EmptyBoard,
    #[error("board size {0} exceeds the limit of {max}", max = MAX_BOARD_SIZE)]
    BoardTooLarge(usize),
    #[error("team id {0} appears more than once")]
    DuplicateTeam(TeamId),
    #[error("cell ({row},{col}) lies outside the {size}x{size} board")]
    CellOutOfBounds { row: usize, col: usize, size: usize },
    #[error("more than one cell at ({row},{col})")]
    DuplicateCell { row: usize, col: usize },
    #[error("reference to unknown team id {0}")]
    UnknownTeam(TeamId),
}

// *************** Mutation Payloads ***************

/// Body of `POST /api/game/setup`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SetupRequest {
    pub board_size: usize,
    pub time_limit: u32,
    pub teams: Vec<TeamSetup>,
    pub cells: Vec<CellSetup>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamSetup {
    pub name: String,
    pub color: String,
    pub members: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CellSetup {
    pub row: usize,
    pub col: usize,
    pub problem_url: String,
}

/// Reply to every mutation endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct MutationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

// *************** Tests ***************
