//! Master controller.
//! Walks setup -> running -> ended, and is the only role that mutates the game. Polling
//! runs only while a game is in progress and stops for good once the end is confirmed.
//! The desk publishes confirmed commands; the current setup form goes back to the desk
//! through a watch channel so edits start from what is on screen.

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::api::MutationError;
use crate::board::{BoardOptions, render_board};
use crate::controller::{Command, ControllerCore, ViewController};
use crate::model::GameStatus;
use crate::scoreboard::{WinnerBanner, render_scoreboard};
use crate::setup::SetupForm;
use crate::surface::Surface;
use crate::timer::{has_expired, now_epoch, read_timer};
use crate::view::{Page, Role, Screen, ViewKind};

pub struct AdminController<S> {
    core: ControllerCore<S>,
    form: SetupForm,
    form_tx: watch::Sender<SetupForm>,
    /// Set once the countdown has triggered an end for the current game.
    expiry_fired: bool,
}

impl<S: Surface> AdminController<S> {
    pub fn new(core: ControllerCore<S>) -> Self {
        let form = SetupForm::default();
        let (form_tx, _) = watch::channel(form.clone());
        AdminController { core, form, form_tx, expiry_fired: false }
    }

    /// Receiver for the desk; always holds the form currently shown.
    pub fn form_updates(&self) -> watch::Receiver<SetupForm> {
        self.form_tx.subscribe()
    }

    fn set_form(&mut self, form: SetupForm) {
        self.form = form;
        self.form_tx.send_replace(self.form.clone());
    }

    /// Fetches the state and switches to the matching view.
    pub async fn load_game_state(&mut self) -> Result<()> {
        if !self.core.fetch_now().await? {
            return Ok(());
        }

        let Some(state) = self.core.current() else {
            return self.show_setup_view();
        };

        match state.status {
            GameStatus::Running => {
                self.show_game_view()?;
                self.core.poll.start();
            }
            GameStatus::Ended => self.show_result_view()?,
            GameStatus::Setup => {
                let restored = SetupForm::restore(state);
                self.set_form(restored);
                self.show_setup_view()?;
            }
        }
        Ok(())
    }

    fn show_setup_view(&mut self) -> Result<()> {
        let page = Page {
            role: Role::Admin,
            status: self.core.current().map(|s| s.status),
            screen: Screen::Setup(self.form.clone()),
        };
        self.core.show(page)
    }

    fn show_game_view(&mut self) -> Result<()> {
        let Some(state) = self.core.current() else {
            return Ok(());
        };
        let page = Page {
            role: Role::Admin,
            status: Some(state.status),
            screen: Screen::Game {
                board: render_board(state, BoardOptions::with_links()),
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
            return Ok(());
        };
        let page = Page {
            role: Role::Admin,
            status: Some(state.status),
            screen: Screen::Result {
                board: Some(render_board(state, BoardOptions::without_links())),
                scoreboard: render_scoreboard(state),
                banner: WinnerBanner::resolve(state, true),
            },
        };
        self.core.show(page)
    }

    /// Poll handler: follows the game until it ends.
    fn update_game_view(&mut self) -> Result<()> {
        let Some(status) = self.core.current().map(|s| s.status) else {
            return Ok(());
        };
        match status {
            GameStatus::Ended => {
                self.core.poll.stop();
                self.core.timer.stop();
                self.show_result_view()
            }
            GameStatus::Running => self.show_game_view(),
            GameStatus::Setup => Ok(()),
        }
    }

    // *************** Mutations ***************

    pub async fn save_setup(&mut self, form: SetupForm) -> Result<()> {
        self.set_form(form);
        let request = self.form.to_request();
        match self.core.api.setup_game(&request).await {
            Ok(()) => {
                info!(board_size = request.board_size, teams = request.teams.len(), "setup saved");
                self.core.surface.alert("Setup saved successfully!");
                self.reload().await
            }
            Err(e) => {
                self.report("saving setup", &e);
                Ok(())
            }
        }
    }

    pub async fn start_game(&mut self) -> Result<()> {
        match self.core.api.start_game().await {
            Ok(()) => {
                info!("game started");
                self.expiry_fired = false;
                self.reload().await
            }
            Err(e) => {
                self.report("starting game", &e);
                Ok(())
            }
        }
    }

    pub async fn end_game(&mut self) -> Result<()> {
        match self.core.api.end_game().await {
            Ok(()) => {
                info!("game ended");
                self.core.poll.stop();
                self.core.timer.stop();
                self.reload().await
            }
            Err(e) => {
                self.report("ending game", &e);
                Ok(())
            }
        }
    }

    pub async fn refresh_game(&mut self) -> Result<()> {
        if let Err(e) = self.core.api.refresh().await {
            error!("Refresh error: {:#}", e);
            return Ok(());
        }
        match self.core.fetch_now().await {
            Ok(true) => self.update_game_view(),
            Ok(false) => Ok(()),
            Err(e) => {
                error!("Refresh error: {:#}", e);
                Ok(())
            }
        }
    }

    /// Back to a fresh setup form.
    pub fn new_game(&mut self) -> Result<()> {
        self.core.poll.stop();
        self.core.timer.stop();
        self.expiry_fired = false;
        self.set_form(SetupForm::default());
        self.show_setup_view()
    }

    /// Shows a draft from the desk without saving it.
    pub fn edit_setup(&mut self, form: SetupForm) -> Result<()> {
        self.set_form(form);
        match self.core.view() {
            None | Some(ViewKind::Setup) => self.show_setup_view(),
            _ => Ok(()),
        }
    }

    // A failed re-fetch after a successful mutation is logged like any poll failure.
    async fn reload(&mut self) -> Result<()> {
        if let Err(e) = self.load_game_state().await {
            error!("Failed to reload game state: {:#}", e);
        }
        Ok(())
    }

    fn report(&mut self, action: &str, error: &MutationError) {
        warn!(action, "mutation failed: {}", error);
        self.core.surface.alert(&error.alert_text(action));
    }
}

impl<S: Surface> ViewController for AdminController<S> {
    type Surface = S;

    fn core(&mut self) -> &mut ControllerCore<S> {
        &mut self.core
    }

    async fn open(&mut self) -> Result<()> {
        info!(server = self.core.api.base_url(), "master desk open");
        if let Err(e) = self.load_game_state().await {
            error!("Failed to load game state: {:#}", e);
        }
        if self.core.view().is_none() {
            self.show_setup_view()?;
        }
        Ok(())
    }

    async fn on_snapshot(&mut self) -> Result<()> {
        self.update_game_view()
    }

    async fn on_fetch_error(&mut self, error: anyhow::Error) -> Result<()> {
        error!("Failed to fetch game state: {:#}", error);
        Ok(())
    }

    async fn on_tick(&mut self) -> Result<()> {
        let now = now_epoch();
        let reading = read_timer(self.core.current(), now);
        self.core.surface.update_timer(&reading)?;

        let expired = self.core.current().is_some_and(|s| has_expired(s, now));
        if expired && !self.expiry_fired {
            self.expiry_fired = true;
            info!("time is up, ending game");
            self.end_game().await?;
        }
        Ok(())
    }

    async fn on_command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SaveSetup(form) => self.save_setup(form).await,
            Command::EditSetup(form) => self.edit_setup(form),
            Command::Start => self.start_game().await,
            Command::End => self.end_game().await,
            Command::Refresh => self.refresh_game().await,
            Command::NewGame => self.new_game(),
        }
    }
}
