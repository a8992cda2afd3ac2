mod admin;
mod api;
mod board;
mod config;
mod controller;
mod desk;
#[cfg(test)]
mod fake_server;
mod html;
mod model;
mod scoreboard;
mod setup;
mod snapshot;
mod surface;
mod ticker;
mod timer;
mod view;
mod viewer;

use anyhow::{Context, Result, bail};
use clap::{Arg, Command};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::admin::AdminController;
use crate::api::ApiClient;
use crate::config::{Config, SERVER_ENV, load_config};
use crate::controller::ControllerCore;
use crate::surface::{HtmlSurface, Surface, TerminalSurface};
use crate::viewer::{ViewerController, ViewerRole};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("panel_dash=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let matches = Command::new("panel-dash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live panel dash contest board client")
        .arg(
            Arg::new("role")
                .long("role")
                .value_name("ROLE")
                .help("Screen to run: master desk, participant viewer or big-screen spectator")
                .default_value("viewer")
                .value_parser(["master", "viewer", "spectate"]),
        )
        .arg(
            Arg::new("server")
                .long("server")
                .value_name("URL")
                .help("Game server base URL (overrides config and PANEL_DASH_SERVER)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Config file (default: ./panel_dash.json if present)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .help("Render into a self-refreshing HTML file instead of the terminal (required for master)"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    if let Ok(server) = std::env::var(SERVER_ENV) {
        config.server_url = server;
    }
    if let Some(server) = matches.get_one::<String>("server") {
        config.server_url = server.clone();
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.output = Some(PathBuf::from(output));
    }

    let role = matches
        .get_one::<String>("role")
        .map(String::as_str)
        .unwrap_or("viewer");

    info!(role, server = %config.server_url, "Panel Dash starting");
    let api = ApiClient::new(&config.server_url, config.request_timeout())?;

    tokio::select! {
        result = run_role(role, api, &config) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
            Ok(())
        }
    }
}

async fn run_role(role: &str, api: ApiClient, config: &Config) -> Result<()> {
    let surface = make_surface(config, role)?;
    let core = ControllerCore::new(api, surface, config.periods());

    match role {
        "master" => {
            let (tx, rx) = mpsc::channel(16);
            let mut admin = AdminController::new(core.with_commands(rx));
            desk::spawn_desk(admin.form_updates(), tx)?;
            controller::run(&mut admin).await
        }
        "spectate" => {
            let role = ViewerRole::Spectator {
                viewport_width: config.viewport_width,
                viewport_height: config.viewport_height,
            };
            controller::run(&mut ViewerController::new(core, role)).await
        }
        _ => controller::run(&mut ViewerController::new(core, ViewerRole::Participant)).await,
    }
}

// The master desk prompts on the terminal, so the master board must go to a file.
fn make_surface(config: &Config, role: &str) -> Result<Box<dyn Surface>> {
    match &config.output {
        Some(path) => {
            info!(path = %path.display(), "rendering to HTML file");
            Ok(Box::new(HtmlSurface::new(path.clone())))
        }
        None if role == "master" => {
            bail!("The master desk needs --output FILE (or \"output\" in the config); the terminal is used for its prompts")
        }
        None => Ok(Box::new(TerminalSurface)),
    }
}
