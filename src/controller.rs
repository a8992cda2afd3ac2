//! Shared view-controller machinery.
//! A controller owns its cached snapshot, a poll ticker and a timer ticker, and reacts
//! to one event at a time on a single thread. Poll fetches run as spawned tasks that
//! report back through a channel; they cannot be cancelled once issued, and the
//! snapshot's sequence guard discards replies that arrive out of order.

use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::model::GameState;
use crate::setup::SetupForm;
use crate::snapshot::SnapshotSlot;
use crate::surface::Surface;
use crate::ticker::Ticker;
use crate::view::{Page, ViewKind};

/// Requests from the master desk. Confirmation has already happened there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show an edited, unsaved form.
    EditSetup(SetupForm),
    SaveSetup(SetupForm),
    Start,
    End,
    Refresh,
    NewGame,
}

#[derive(Debug)]
pub enum Event {
    Poll,
    Fetched { seq: u64, result: Result<Option<GameState>> },
    Tick,
    Command(Command),
    /// The desk hung up.
    CommandsClosed,
}

#[derive(Clone, Copy, Debug)]
pub struct Periods {
    pub poll: Duration,
    pub timer: Duration,
}

pub struct ControllerCore<S> {
    pub api: ApiClient,
    pub surface: S,
    pub snapshot: SnapshotSlot,
    pub poll: Ticker,
    pub timer: Ticker,
    view: Option<ViewKind>,
    fetched_tx: mpsc::UnboundedSender<(u64, Result<Option<GameState>>)>,
    fetched_rx: mpsc::UnboundedReceiver<(u64, Result<Option<GameState>>)>,
    commands: Option<mpsc::Receiver<Command>>,
}

impl<S: Surface> ControllerCore<S> {
    pub fn new(api: ApiClient, surface: S, periods: Periods) -> Self {
        let (fetched_tx, fetched_rx) = mpsc::unbounded_channel();
        ControllerCore {
            api,
            surface,
            snapshot: SnapshotSlot::new(),
            poll: Ticker::new(periods.poll),
            timer: Ticker::new(periods.timer),
            view: None,
            fetched_tx,
            fetched_rx,
            commands: None,
        }
    }

    pub fn with_commands(mut self, commands: mpsc::Receiver<Command>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn current(&self) -> Option<&GameState> {
        self.snapshot.current()
    }

    pub fn view(&self) -> Option<ViewKind> {
        self.view
    }

    /// Fires a fetch in the background; the reply shows up as `Event::Fetched`.
    pub fn spawn_fetch(&mut self) {
        let seq = self.snapshot.issue();
        let api = self.api.clone();
        let tx = self.fetched_tx.clone();
        debug!(seq, "polling game state");
        tokio::spawn(async move {
            let result = api.fetch_game_state().await;
            // The controller may be gone by now.
            let _ = tx.send((seq, result));
        });
    }

    /// Fetches and waits. Returns whether the reply was applied.
    pub async fn fetch_now(&mut self) -> Result<bool> {
        let seq = self.snapshot.issue();
        let state = self.api.fetch_game_state().await?;
        Ok(self.snapshot.accept(seq, state))
    }

    pub fn show(&mut self, page: Page) -> Result<()> {
        let kind = page.screen.kind();
        if self.view != Some(kind) {
            debug!(?kind, "switching view");
        }
        self.view = Some(kind);
        self.surface.present(&page)
    }

    pub async fn next_event(&mut self) -> Event {
        tokio::select! {
            _ = self.poll.tick() => Event::Poll,
            Some((seq, result)) = self.fetched_rx.recv() => Event::Fetched { seq, result },
            _ = self.timer.tick() => Event::Tick,
            command = next_command(&mut self.commands) => match command {
                Some(command) => Event::Command(command),
                None => {
                    self.commands = None;
                    Event::CommandsClosed
                }
            },
        }
    }
}

async fn next_command(commands: &mut Option<mpsc::Receiver<Command>>) -> Option<Command> {
    match commands {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// One role's reaction to events.
#[allow(async_fn_in_trait)]
pub trait ViewController {
    type Surface: Surface;

    fn core(&mut self) -> &mut ControllerCore<Self::Surface>;

    /// Runs once before the event loop.
    async fn open(&mut self) -> Result<()>;

    /// A newer snapshot (or "no game") was just cached.
    async fn on_snapshot(&mut self) -> Result<()>;

    async fn on_fetch_error(&mut self, error: anyhow::Error) -> Result<()> {
        warn!("Failed to fetch game state: {:#}", error);
        Ok(())
    }

    async fn on_tick(&mut self) -> Result<()>;

    async fn on_command(&mut self, command: Command) -> Result<()> {
        debug!(?command, "ignoring command");
        Ok(())
    }
}

/// Drives a controller until its desk hangs up or a handler fails.
pub async fn run<C: ViewController>(controller: &mut C) -> Result<()> {
    controller.open().await?;

    loop {
        match controller.core().next_event().await {
            Event::Poll => controller.core().spawn_fetch(),
            Event::Fetched { seq, result } => match result {
                Ok(state) => {
                    if controller.core().snapshot.accept(seq, state) {
                        controller.on_snapshot().await?;
                    }
                }
                Err(e) => controller.on_fetch_error(e).await?,
            },
            Event::Tick => controller.on_tick().await?,
            Event::Command(command) => controller.on_command(command).await?,
            Event::CommandsClosed => {
                debug!("command channel closed, stopping");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use crate::view::{Role, Screen};

    fn core() -> ControllerCore<RecordingSurface> {
        let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let periods = Periods { poll: Duration::from_secs(3), timer: Duration::from_secs(1) };
        ControllerCore::new(api, RecordingSurface::default(), periods)
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_tick_event() {
        let mut core = core();
        core.poll.start();
        assert!(matches!(core.next_event().await, Event::Poll));
    }

    #[tokio::test]
    async fn test_spawned_fetch_reports_back() {
        let mut core = core();
        core.spawn_fetch();
        match core.next_event().await {
            Event::Fetched { seq, result } => {
                assert_eq!(seq, 1);
                assert!(result.is_err());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_commands_forwarded_then_closed() {
        let (tx, rx) = mpsc::channel(4);
        let mut core = core().with_commands(rx);
        tx.send(Command::Refresh).await.unwrap();
        drop(tx);
        assert!(matches!(core.next_event().await, Event::Command(Command::Refresh)));
        assert!(matches!(core.next_event().await, Event::CommandsClosed));
    }

    #[tokio::test]
    async fn test_show_tracks_view() {
        let mut core = core();
        core.show(Page { role: Role::Participant, status: None, screen: Screen::Waiting }).unwrap();
        assert_eq!(core.view(), Some(ViewKind::Waiting));
        assert_eq!(core.surface.pages.len(), 1);
    }
}
