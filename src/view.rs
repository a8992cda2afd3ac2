//! What a controller shows: a role, an optional status badge and one screen.
//! Screens are plain data so surfaces only draw, never decide.

use crate::board::BoardView;
use crate::model::GameStatus;
use crate::scoreboard::{ScoreCard, WinnerBanner};
use crate::setup::SetupForm;
use crate::timer::TimerReading;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Participant,
    Spectator,
}

impl Role {
    pub fn title(self) -> &'static str {
        match self {
            Role::Admin => "Master",
            Role::Participant => "Participant",
            Role::Spectator => "Spectate",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    Setup,
    Waiting,
    Game,
    Result,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Screen {
    Waiting,
    Setup(SetupForm),
    Game {
        board: BoardView,
        scoreboard: Vec<ScoreCard>,
        timer: TimerReading,
    },
    Result {
        /// Spectators only get the scoreboard and banner.
        board: Option<BoardView>,
        scoreboard: Vec<ScoreCard>,
        banner: Option<WinnerBanner>,
    },
}

impl Screen {
    pub fn kind(&self) -> ViewKind {
        match self {
            Screen::Waiting => ViewKind::Waiting,
            Screen::Setup(_) => ViewKind::Setup,
            Screen::Game { .. } => ViewKind::Game,
            Screen::Result { .. } => ViewKind::Result,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub role: Role,
    pub status: Option<GameStatus>,
    pub screen: Screen,
}

impl Page {
    /// Swaps in a fresh reading if this page shows a running game.
    pub fn set_timer(&mut self, reading: &TimerReading) -> bool {
        match &mut self.screen {
            Screen::Game { timer, .. } => {
                *timer = reading.clone();
                true
            }
            _ => false,
        }
    }
}
