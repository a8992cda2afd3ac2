//! HTML page rendering.
//! Askama templates under `templates/`; server-provided text is escaped by the
//! templates themselves.

use anyhow::{Context, Result};
use askama::Template;

use crate::board::BoardView;
use crate::model::GameStatus;
use crate::scoreboard::{ScoreCard, WinnerBanner};
use crate::setup::SetupForm;
use crate::timer::TimerReading;
use crate::view::{Page, Screen};

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    title: &'a str,
    status: Option<GameStatus>,
    /// Already rendered (and escaped) by one of the section templates.
    section: String,
}

#[derive(Template)]
#[template(path = "waiting.html")]
struct WaitingSection;

#[derive(Template)]
#[template(path = "setup.html")]
struct SetupSection<'a> {
    form: &'a SetupForm,
}

#[derive(Template)]
#[template(path = "game.html")]
struct GameSection<'a> {
    board: &'a BoardView,
    scoreboard: &'a [ScoreCard],
    timer: &'a TimerReading,
}

#[derive(Template)]
#[template(path = "result.html")]
struct ResultSection<'a> {
    board: Option<&'a BoardView>,
    scoreboard: &'a [ScoreCard],
    banner: Option<&'a WinnerBanner>,
}

/// Complete, self-refreshing HTML document for a page.
pub fn page_document(page: &Page) -> Result<String> {
    let section = match &page.screen {
        Screen::Waiting => WaitingSection.render(),
        Screen::Setup(form) => SetupSection { form }.render(),
        Screen::Game { board, scoreboard, timer } => GameSection { board, scoreboard, timer }.render(),
        Screen::Result { board, scoreboard, banner } => ResultSection {
            board: board.as_ref(),
            scoreboard,
            banner: banner.as_ref(),
        }
        .render(),
    }
    .context("Failed to render page section")?;

    PageTemplate {
        title: page.role.title(),
        status: page.status,
        section,
    }
    .render()
    .context("Failed to render page")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardOptions, render_board};
    use crate::model::{Cell, GameState, Team, TeamId};
    use crate::scoreboard::render_scoreboard;
    use crate::view::Role;
    use std::collections::HashMap;

    fn state() -> GameState {
        GameState {
            id: None,
            status: GameStatus::Running,
            board_size: 2,
            time_limit: None,
            started_at: None,
            ended_at: None,
            teams: vec![Team {
                id: TeamId::new("x"),
                name: "<script>alert(1)</script>".into(),
                color: None,
                members: vec![],
            }],
            cells: vec![Cell {
                row: 0,
                col: 0,
                problem_id: Some("abc001_a".into()),
                problem_url: Some("https://atcoder.jp/contests/abc001/tasks/abc001_a".into()),
                captured_by_team_id: Some(TeamId::new("x")),
                captured_by_user: Some("<b>eve</b>".into()),
                ..Cell::default()
            }],
            scores: HashMap::from([(TeamId::new("x"), 1)]),
        }
    }

    fn game_page(role: Role, options: BoardOptions) -> String {
        let s = state();
        let page = Page {
            role,
            status: Some(s.status),
            screen: Screen::Game {
                board: render_board(&s, options),
                scoreboard: render_scoreboard(&s),
                timer: TimerReading::placeholder(),
            },
        };
        page_document(&page).unwrap()
    }

    #[test]
    fn test_waiting_page_has_badge() {
        let page = Page {
            role: Role::Participant,
            status: Some(GameStatus::Setup),
            screen: Screen::Waiting,
        };
        let html = page_document(&page).unwrap();
        assert!(html.contains(r#"<span class="status setup">Setup</span>"#));
        assert!(html.contains("waitingView"));
        assert!(html.contains(r#"<meta http-equiv="refresh" content="1">"#));
    }

    #[test]
    fn test_spectator_page_has_no_badge() {
        let page = Page {
            role: Role::Spectator,
            status: None,
            screen: Screen::Waiting,
        };
        assert!(!page_document(&page).unwrap().contains("class=\"status"));
    }

    #[test]
    fn test_team_name_is_escaped() {
        let html = game_page(Role::Participant, BoardOptions::with_links());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_captured_cell_markup() {
        let html = game_page(Role::Participant, BoardOptions::with_links());
        assert!(html.contains(r#"class="cell captured" style="background-color: #e74c3c;""#));
        assert!(html.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(html.contains("problem-link"));
        assert!(html.contains(r#"<div id="timer" class="timer">--:--</div>"#));
    }

    #[test]
    fn test_spectator_board_has_no_links() {
        let html = game_page(Role::Spectator, BoardOptions::without_links());
        assert!(!html.contains("problem-link"));
        assert!(html.contains(r#"<span class="problem-id">abc001_a</span>"#));
    }

    #[test]
    fn test_result_page_banner_without_board() {
        let s = state();
        let page = Page {
            role: Role::Spectator,
            status: None,
            screen: Screen::Result {
                board: None,
                scoreboard: render_scoreboard(&s),
                banner: Some(WinnerBanner { headline: "Draw!".into(), color: "#fff".into() }),
            },
        };
        let html = page_document(&page).unwrap();
        assert!(html.contains(r#"<div id="winnerDisplay" class="winner" style="color: #fff;">Draw!</div>"#));
        assert!(!html.contains(r#"class="board""#));
        assert!(html.contains(r#"class="scoreboard""#));
    }

    #[test]
    fn test_setup_form_is_escaped() {
        let mut form = SetupForm::generate(1, 1);
        form.teams[0].name = "<script>x</script>".into();
        form.problems[0].url = "https://atcoder.jp/contests/abc100/tasks/abc100_b".into();
        let page = Page { role: Role::Admin, status: None, screen: Screen::Setup(form) };
        let html = page_document(&page).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("abc100_b"));
        assert!(html.contains("time limit 60 min"));
    }
}
