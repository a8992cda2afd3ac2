//! Master desk.
//! Blocking dialoguer console on its own thread, so menus and prompts never stall the
//! controller's polling. Save, start and end are confirmed here before the command is
//! sent; the controller only ever sees confirmed requests.

use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::thread::{self, JoinHandle};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error};

use crate::controller::Command;
use crate::model::MAX_BOARD_SIZE;
use crate::setup::SetupForm;
use crate::surface::parse_hex_color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    EditSetup,
    SaveSetup,
    Start,
    End,
    Refresh,
    NewGame,
    Quit,
}

pub const ACTIONS: [Action; 7] = [
    Action::EditSetup,
    Action::SaveSetup,
    Action::Start,
    Action::End,
    Action::Refresh,
    Action::NewGame,
    Action::Quit,
];

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::EditSetup => "Edit setup",
            Action::SaveSetup => "Save setup",
            Action::Start => "Start game",
            Action::End => "End game",
            Action::Refresh => "Refresh submissions",
            Action::NewGame => "New game",
            Action::Quit => "Quit",
        }
    }

    /// Question to confirm before the action fires, if any.
    pub fn confirmation(self) -> Option<&'static str> {
        match self {
            Action::SaveSetup => Some("Save the setup?"),
            Action::Start => Some("Start the game?"),
            Action::End => Some("End the game?"),
            _ => None,
        }
    }
}

pub fn spawn_desk(
    form: watch::Receiver<SetupForm>,
    commands: mpsc::Sender<Command>,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("master-desk".into())
        .spawn(move || {
            if let Err(e) = run_desk(form, commands) {
                error!("Master desk stopped: {:#}", e);
            }
        })
        .context("Failed to start master desk thread")
}

fn run_desk(mut form: watch::Receiver<SetupForm>, commands: mpsc::Sender<Command>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let labels: Vec<&str> = ACTIONS.iter().map(|a| a.label()).collect();
    // Edits not yet reflected by the controller.
    let mut draft: Option<SetupForm> = None;

    loop {
        let choice = Select::with_theme(&theme)
            .with_prompt("Master desk")
            .items(&labels[..])
            .default(0)
            .interact()
            .context("Desk menu failed")?;
        let action = ACTIONS[choice];

        if let Some(question) = action.confirmation() {
            let confirmed = Confirm::with_theme(&theme)
                .with_prompt(question)
                .default(false)
                .interact()
                .context("Confirmation prompt failed")?;
            if !confirmed {
                continue;
            }
        }

        if form.has_changed().unwrap_or(false) {
            draft = None;
        }
        let current = match &draft {
            Some(draft) => draft.clone(),
            None => form.borrow_and_update().clone(),
        };

        let command = match action {
            Action::EditSetup => {
                let edited = edit_form(&theme, current)?;
                draft = Some(edited.clone());
                Command::EditSetup(edited)
            }
            Action::SaveSetup => Command::SaveSetup(current),
            Action::Start => Command::Start,
            Action::End => Command::End,
            Action::Refresh => Command::Refresh,
            Action::NewGame => {
                draft = None;
                Command::NewGame
            }
            Action::Quit => {
                debug!("desk closed by user");
                return Ok(());
            }
        };

        if commands.blocking_send(command).is_err() {
            // Controller is gone.
            return Ok(());
        }
    }
}

fn edit_form(theme: &ColorfulTheme, mut form: SetupForm) -> Result<SetupForm> {
    let board_size: usize = Input::with_theme(theme)
        .with_prompt("Board size")
        .with_initial_text(form.board_size.to_string())
        .validate_with(|v: &usize| {
            if (1..=MAX_BOARD_SIZE).contains(v) {
                Ok(())
            } else {
                Err(format!("must be between 1 and {}", MAX_BOARD_SIZE))
            }
        })
        .interact_text()
        .context("Failed to read board size")?;
    let team_count: usize = Input::with_theme(theme)
        .with_prompt("Team count")
        .with_initial_text(form.team_count().to_string())
        .validate_with(|v: &usize| if *v == 0 { Err("must be at least 1") } else { Ok(()) })
        .interact_text()
        .context("Failed to read team count")?;
    let time_limit: u32 = Input::with_theme(theme)
        .with_prompt("Time limit (minutes, 0 = none)")
        .with_initial_text(form.time_limit.to_string())
        .interact_text()
        .context("Failed to read time limit")?;

    if board_size != form.board_size || team_count != form.team_count() {
        form.regenerate(board_size, team_count);
    }
    form.time_limit = time_limit;

    for (index, team) in form.teams.iter_mut().enumerate() {
        team.name = Input::with_theme(theme)
            .with_prompt(format!("Team {} name", index + 1))
            .with_initial_text(team.name.clone())
            .interact_text()
            .context("Failed to read team name")?;
        team.color = Input::with_theme(theme)
            .with_prompt(format!("Team {} color", index + 1))
            .with_initial_text(team.color.clone())
            .validate_with(|c: &String| {
                if parse_hex_color(c).is_some() { Ok(()) } else { Err("expected #rrggbb") }
            })
            .interact_text()
            .context("Failed to read team color")?;
        let members: String = Input::with_theme(theme)
            .with_prompt(format!("Team {} members (comma separated)", index + 1))
            .with_initial_text(team.member_list())
            .allow_empty(true)
            .interact_text()
            .context("Failed to read team members")?;
        team.members = members_from_entry(&members);
    }

    let edit_problems = Confirm::with_theme(theme)
        .with_prompt("Edit problem URLs?")
        .default(true)
        .interact()
        .context("Confirmation prompt failed")?;
    if edit_problems {
        for problem in form.problems.iter_mut() {
            problem.url = Input::with_theme(theme)
                .with_prompt(format!("({},{}) problem URL", problem.row, problem.col))
                .with_initial_text(problem.url.clone())
                .allow_empty(true)
                .interact_text()
                .context("Failed to read problem URL")?;
        }
    }

    Ok(form)
}

/// "alice, bob carol" -> "alice\nbob\ncarol"
pub fn members_from_entry(entry: &str) -> String {
    entry
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
