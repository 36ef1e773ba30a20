use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::DataError;
use crate::table::{csv_reader, require_columns};

pub const TEAM_COLUMNS: [&str; 10] = [
    "Teams",
    "Games Played",
    "Goals Scored",
    "Goals Conceded",
    "Possession (%)",
    "Passing Accuracy (%)",
    "Yellow Cards",
    "Red Cards",
    "xG",
    "Shots on Target",
];

/// One row of the season statistics table, as read from disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamSeasonStats {
    #[serde(rename = "Teams")]
    pub team: String,
    #[serde(rename = "Games Played")]
    pub games_played: u32,
    #[serde(rename = "Goals Scored")]
    pub goals_scored: u32,
    #[serde(rename = "Goals Conceded")]
    pub goals_conceded: u32,
    #[serde(rename = "Possession (%)")]
    pub possession_pct: f64,
    #[serde(rename = "Passing Accuracy (%)")]
    pub passing_accuracy_pct: f64,
    #[serde(rename = "Yellow Cards")]
    pub yellow_cards: u32,
    #[serde(rename = "Red Cards")]
    pub red_cards: u32,
    #[serde(rename = "xG")]
    pub xg: f64,
    #[serde(rename = "Shots on Target")]
    pub shots_on_target: f64,
}

/// Season statistics plus the composite metrics the match model consumes.
/// The derived values are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamProfile {
    stats: TeamSeasonStats,
    offensive_strength: f64,
    defensive_strength: f64,
    adjusted_possession: f64,
    discipline_risk: f64,
}

impl TeamProfile {
    pub fn new(stats: TeamSeasonStats) -> Result<Self, DataError> {
        if stats.games_played == 0 {
            return Err(DataError::ZeroGamesPlayed { team: stats.team });
        }
        let games = stats.games_played as f64;
        let offensive_strength = stats.goals_scored as f64 / games;
        let defensive_strength = stats.goals_conceded as f64 / games;
        let adjusted_possession = stats.possession_pct * stats.passing_accuracy_pct / 100.0;
        let discipline_risk =
            (stats.yellow_cards as f64 / games) + (2.0 * stats.red_cards as f64 / games);
        Ok(Self {
            stats,
            offensive_strength,
            defensive_strength,
            adjusted_possession,
            discipline_risk,
        })
    }

    pub fn name(&self) -> &str {
        &self.stats.team
    }

    pub fn stats(&self) -> &TeamSeasonStats {
        &self.stats
    }

    pub fn offensive_strength(&self) -> f64 {
        self.offensive_strength
    }

    pub fn defensive_strength(&self) -> f64 {
        self.defensive_strength
    }

    pub fn adjusted_possession(&self) -> f64 {
        self.adjusted_possession
    }

    pub fn discipline_risk(&self) -> f64 {
        self.discipline_risk
    }
}

/// Name-keyed profile set. Iteration follows input order.
#[derive(Debug, Clone, Default)]
pub struct TeamProfiles {
    teams: Vec<TeamProfile>,
    index: HashMap<String, usize>,
}

impl TeamProfiles {
    pub fn from_profiles(profiles: impl IntoIterator<Item = TeamProfile>) -> Result<Self, DataError> {
        let mut out = Self::default();
        for profile in profiles {
            if out.index.contains_key(profile.name()) {
                return Err(DataError::DuplicateTeam {
                    team: profile.name().to_string(),
                });
            }
            out.index.insert(profile.name().to_string(), out.teams.len());
            out.teams.push(profile);
        }
        Ok(out)
    }

    pub fn get(&self, name: &str) -> Option<&TeamProfile> {
        self.index.get(name).map(|&idx| &self.teams[idx])
    }

    pub fn require(&self, name: &str) -> Result<&TeamProfile, DataError> {
        self.get(name).ok_or_else(|| DataError::UnknownTeam {
            team: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamProfile> {
        self.teams.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.teams.iter().map(|t| t.name())
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

pub fn read_team_profiles<R: io::Read>(reader: R) -> Result<TeamProfiles, DataError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    require_columns(&headers, "team stats", &TEAM_COLUMNS)?;

    let mut profiles = Vec::new();
    for record in rdr.deserialize::<TeamSeasonStats>() {
        profiles.push(TeamProfile::new(record?)?);
    }
    TeamProfiles::from_profiles(profiles)
}

pub fn load_team_profiles(path: &Path) -> Result<TeamProfiles> {
    let file = File::open(path).with_context(|| format!("open team stats {}", path.display()))?;
    let profiles = read_team_profiles(file)
        .with_context(|| format!("load team stats {}", path.display()))?;
    log::info!("loaded {} team profiles from {}", profiles.len(), path.display());
    Ok(profiles)
}
