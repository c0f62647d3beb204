use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use vector_race_system_strategies::StrategyKind;

/// Turn limit used when neither the command line nor the config sets one.
pub(crate) const DEFAULT_MAX_TURNS: u32 = 100;
/// Race seed used when neither the command line nor the config sets one.
pub(crate) const DEFAULT_SEED: u64 = 0;

/// Odd constant that spreads consecutive registration indices across the seed space.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Race configuration file contents. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RaceFile {
    pub(crate) max_turns: Option<u32>,
    pub(crate) seed: Option<u64>,
    pub(crate) players: Vec<PlayerEntry>,
}

impl RaceFile {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read race config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid race config at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse race config toml contents")
    }
}

/// One roster slot: a display name and the strategy driving it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PlayerEntry {
    pub(crate) name: String,
    pub(crate) kind: StrategyKind,
}

/// Parses a `NAME=KIND` command-line roster entry.
pub(crate) fn parse_player(value: &str) -> Result<PlayerEntry, String> {
    let Some((name, kind)) = value.split_once('=') else {
        return Err(format!("expected NAME=KIND, got `{value}`"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("player name missing in `{value}`"));
    }
    let kind = kind.parse::<StrategyKind>().map_err(|error| error.to_string())?;
    Ok(PlayerEntry {
        name: name.to_owned(),
        kind,
    })
}

/// Effective settings after merging flags over the config file over defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RaceSettings {
    pub(crate) max_turns: u32,
    pub(crate) seed: u64,
    pub(crate) roster: Vec<PlayerEntry>,
}

impl RaceSettings {
    pub(crate) fn resolve(
        file: RaceFile,
        max_turns: Option<u32>,
        seed: Option<u64>,
        players: Vec<PlayerEntry>,
    ) -> Self {
        let roster = if !players.is_empty() {
            players
        } else if !file.players.is_empty() {
            file.players
        } else {
            default_roster()
        };
        Self {
            max_turns: max_turns.or(file.max_turns).unwrap_or(DEFAULT_MAX_TURNS),
            seed: seed.or(file.seed).unwrap_or(DEFAULT_SEED),
            roster,
        }
    }

    /// Seed for the strategy registered at `index`.
    pub(crate) fn player_seed(&self, index: usize) -> u64 {
        self.seed
            .wrapping_add((index as u64).wrapping_add(1).wrapping_mul(SEED_STRIDE))
    }
}

fn default_roster() -> Vec<PlayerEntry> {
    vec![
        PlayerEntry {
            name: "Greedy".to_owned(),
            kind: StrategyKind::Greedy,
        },
        PlayerEntry {
            name: "Defensive".to_owned(),
            kind: StrategyKind::Defensive,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_parses_players_and_limits() {
        let file = RaceFile::parse(
            r#"
max_turns = 40
seed = 9

[[players]]
name = "Zippy"
kind = "speed-control"

[[players]]
name = "Wally"
kind = "wanderer"
"#,
        )
        .expect("valid config");

        assert_eq!(file.max_turns, Some(40));
        assert_eq!(file.seed, Some(9));
        assert_eq!(file.players.len(), 2);
        assert_eq!(file.players[0].kind, StrategyKind::SpeedControl);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(RaceFile::parse("laps = 3").is_err());
        assert!(RaceFile::parse("[[players]]\nname = \"x\"\nkind = \"teleporter\"").is_err());
    }

    #[test]
    fn flags_override_the_file_and_defaults_fill_the_rest() {
        let file = RaceFile {
            max_turns: Some(40),
            seed: Some(9),
            players: Vec::new(),
        };
        let settings = RaceSettings::resolve(file, Some(12), None, Vec::new());

        assert_eq!(settings.max_turns, 12);
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.roster, default_roster());

        let empty = RaceSettings::resolve(RaceFile::default(), None, None, Vec::new());
        assert_eq!(empty.max_turns, DEFAULT_MAX_TURNS);
        assert_eq!(empty.seed, DEFAULT_SEED);
    }

    #[test]
    fn command_line_roster_replaces_the_file_roster() {
        let file = RaceFile::parse("[[players]]\nname = \"Wally\"\nkind = \"wanderer\"")
            .expect("valid config");
        let flag = parse_player("Ace=aggressive").expect("valid entry");
        let settings = RaceSettings::resolve(file, None, None, vec![flag.clone()]);

        assert_eq!(settings.roster, vec![flag]);
    }

    #[test]
    fn player_flags_need_a_name_and_a_known_kind() {
        assert_eq!(
            parse_player(" Gus = greedy").expect("valid entry"),
            PlayerEntry {
                name: "Gus".to_owned(),
                kind: StrategyKind::Greedy,
            }
        );
        assert!(parse_player("greedy").is_err());
        assert!(parse_player("=greedy").is_err());
        assert!(parse_player("Gus=teleporter").is_err());
    }

    #[test]
    fn player_seeds_differ_per_slot() {
        let settings = RaceSettings::resolve(RaceFile::default(), None, Some(5), Vec::new());

        assert_ne!(settings.player_seed(0), settings.player_seed(1));
        assert_eq!(settings.player_seed(1), settings.player_seed(1));
    }
}
