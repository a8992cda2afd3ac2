//! Scoreboard and winner resolution.
//! Score cards follow team order, not score order.

use crate::board::{palette_color, resolve_team_color};
use crate::model::{GameState, Team, TeamId};

const DRAW_HEADLINE: &str = "Draw!";
const DRAW_COLOR: &str = "#fff";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreCard {
    pub team_id: TeamId,
    pub name: String,
    pub color: String,
    pub score: i64,
}

pub fn render_scoreboard(state: &GameState) -> Vec<ScoreCard> {
    state
        .teams
        .iter()
        .enumerate()
        .map(|(index, team)| ScoreCard {
            team_id: team.id.clone(),
            name: team.name.clone(),
            color: resolve_team_color(team, index).to_string(),
            score: state.score_of(&team.id),
        })
        .collect()
}

/// Teams tied at the top score, in team order.
///
/// Starts from a sentinel maximum of -1, so a board where every score is negative
/// has no winner.
pub fn determine_winners(state: &GameState) -> Vec<&Team> {
    let mut max_score = -1;
    let mut winners = Vec::new();

    for team in &state.teams {
        let score = state.score_of(&team.id);
        if score > max_score {
            max_score = score;
            winners.clear();
            winners.push(team);
        } else if score == max_score {
            winners.push(team);
        }
    }

    winners
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinnerBanner {
    pub headline: String,
    pub color: String,
}

impl WinnerBanner {
    /// `None` when there is nobody to announce. With `prefixed` the sole winner
    /// reads "Winner: NAME", otherwise just "NAME". A winner without an explicit
    /// colour is announced in the first palette colour, whatever its position.
    pub fn resolve(state: &GameState, prefixed: bool) -> Option<Self> {
        let winners = determine_winners(state);
        match winners.as_slice() {
            [] => None,
            [winner] => {
                let headline = if prefixed {
                    format!("Winner: {}", winner.name)
                } else {
                    winner.name.clone()
                };
                Some(WinnerBanner {
                    headline,
                    color: winner.explicit_color().unwrap_or(palette_color(0)).to_string(),
                })
            }
            _ => Some(WinnerBanner {
                headline: DRAW_HEADLINE.to_string(),
                color: DRAW_COLOR.to_string(),
            }),
        }
    }
}
