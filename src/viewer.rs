//! Participant and spectator controllers.
//! Both follow the polled status: no game or setup -> waiting, running -> game,
//! ended -> result. They differ only in what the screens contain.

use anyhow::Result;
use tracing::info;

use crate::board::{BoardOptions, PARTICIPANT_CELL_PX, render_board, spectator_cell_px};
use crate::controller::{ControllerCore, ViewController};
use crate::model::{GameState, GameStatus};
use crate::scoreboard::{WinnerBanner, render_scoreboard};
use crate::surface::Surface;
use crate::timer::{now_epoch, read_timer};
use crate::view::{Page, Role, Screen};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerRole {
    Participant,
    /// Large screen; the viewport decides the cell size.
    Spectator { viewport_width: u32, viewport_height: u32 },
}

impl ViewerRole {
    fn role(self) -> Role {
        match self {
            ViewerRole::Participant => Role::Participant,
            ViewerRole::Spectator { .. } => Role::Spectator,
        }
    }

    fn game_board(self, state: &GameState) -> BoardOptions {
        match self {
            ViewerRole::Participant => BoardOptions { show_links: true, cell_px: PARTICIPANT_CELL_PX },
            ViewerRole::Spectator { viewport_width, viewport_height } => BoardOptions {
                show_links: false,
                cell_px: spectator_cell_px(state.board_size, viewport_width, viewport_height),
            },
        }
    }

    fn badge(self, state: Option<&GameState>) -> Option<GameStatus> {
        match self {
            ViewerRole::Participant => state.map(|s| s.status),
            ViewerRole::Spectator { .. } => None,
        }
    }
}

pub struct ViewerController<S> {
    core: ControllerCore<S>,
    role: ViewerRole,
}

impl<S: Surface> ViewerController<S> {
    pub fn new(core: ControllerCore<S>, role: ViewerRole) -> Self {
        ViewerController { core, role }
    }

    pub fn update_view(&mut self) -> Result<()> {
        match self.core.current().map(|s| s.status) {
            None | Some(GameStatus::Setup) => self.show_waiting_view(),
            Some(GameStatus::Running) => self.show_game_view(),
            Some(GameStatus::Ended) => self.show_result_view(),
        }
    }

    fn show_waiting_view(&mut self) -> Result<()> {
        self.core.timer.stop();
        let page = Page {
            role: self.role.role(),
            status: self.role.badge(self.core.current()),
            screen: Screen::Waiting,
        };
        self.core.show(page)
    }

    fn show_game_view(&mut self) -> Result<()> {
        let Some(state) = self.core.current() else {
            return self.show_waiting_view();
        };
        let page = Page {
            role: self.role.role(),
            status: self.role.badge(Some(state)),
            screen: Screen::Game {
                board: render_board(state, self.role.game_board(state)),
                scoreboard: render_scoreboard(state),
                timer: read_timer(Some(state), now_epoch()),
            },
        };
        self.core.show(page)?;
        self.core.timer.start();
        Ok(())
    }

    fn show_result_view(&mut self) -> Result<()> {
        let Some(state) = self.core.current() else {
            return self.show_waiting_view();
        };
        let screen = match self.role {
            ViewerRole::Participant => Screen::Result {
                board: Some(render_board(state, BoardOptions::without_links())),
                scoreboard: render_scoreboard(state),
                banner: WinnerBanner::resolve(state, true),
            },
            ViewerRole::Spectator { .. } => Screen::Result {
                board: None,
                scoreboard: render_scoreboard(state),
                banner: WinnerBanner::resolve(state, false),
            },
        };
        let page = Page {
            role: self.role.role(),
            status: self.role.badge(Some(state)),
            screen,
        };
        self.core.show(page)?;
        self.core.timer.stop();
        Ok(())
    }
}

impl<S: Surface> ViewController for ViewerController<S> {
    type Surface = S;

    fn core(&mut self) -> &mut ControllerCore<S> {
        &mut self.core
    }

    async fn open(&mut self) -> Result<()> {
        info!(role = ?self.role, server = self.core.api.base_url(), "watching game");
        self.core.spawn_fetch();
        self.core.poll.start();
        Ok(())
    }

    async fn on_snapshot(&mut self) -> Result<()> {
        self.update_view()
    }

    async fn on_tick(&mut self) -> Result<()> {
        let reading = read_timer(self.core.current(), now_epoch());
        self.core.surface.update_timer(&reading)
    }
}
