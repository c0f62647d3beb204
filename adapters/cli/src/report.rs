use anyhow::{Context, Result};
use serde::Serialize;
use vector_race_core::{InertiaPolicy, PlayerId, Position, RaceState, Track, Velocity};
use vector_race_system_race::{PlayerStatus, Race};

/// Machine-readable summary of a finished race.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct RaceReport {
    pub(crate) outcome: RaceState,
    pub(crate) winner: Option<String>,
    pub(crate) turns_played: u32,
    pub(crate) players: Vec<PlayerReport>,
}

/// Final standing of a single player.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct PlayerReport {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    #[serde(flatten)]
    pub(crate) status: PlayerStatus,
    pub(crate) position: Position,
    pub(crate) velocity: Velocity,
}

impl RaceReport {
    pub(crate) fn capture<T: Track, I: InertiaPolicy>(race: &Race<T, I>) -> Self {
        let winner = match race.state() {
            RaceState::Finished { winner } => race.player(winner).map(|p| p.name().to_owned()),
            _ => None,
        };
        let players = race
            .players()
            .map(|(player, status)| PlayerReport {
                id: player.id(),
                name: player.name().to_owned(),
                status,
                position: player.position(),
                velocity: player.velocity(),
            })
            .collect();
        Self {
            outcome: race.state(),
            winner,
            turns_played: race.turn(),
            players,
        }
    }

    pub(crate) fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialise race report")
    }

    /// One-line human summary of the outcome.
    pub(crate) fn headline(&self) -> String {
        match (self.outcome, &self.winner) {
            (RaceState::Finished { .. }, Some(name)) => {
                format!("{name} wins after {} turns.", self.turns_played)
            }
            (RaceState::Exhausted { turn_limit }, _) => {
                format!("Turn limit of {turn_limit} reached without a winner.")
            }
            (RaceState::AllEliminated, _) => {
                format!("Every player crashed by turn {}.", self.turns_played)
            }
            _ => format!("Race stopped after {} turns.", self.turns_played),
        }
    }
}
