use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::DataError;
use crate::table::{csv_reader, require_columns};
use crate::team_profile::TeamProfiles;

pub const FIXTURE_COLUMNS: [&str; 2] = ["HomeTeam", "AwayTeam"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Fixture {
    #[serde(rename = "HomeTeam")]
    pub home: String,
    #[serde(rename = "AwayTeam")]
    pub away: String,
}

impl Fixture {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }
}

pub fn read_fixtures<R: io::Read>(reader: R) -> Result<Vec<Fixture>, DataError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    require_columns(&headers, "fixtures", &FIXTURE_COLUMNS)?;

    let mut out = Vec::new();
    for record in rdr.deserialize::<Fixture>() {
        out.push(record?);
    }
    Ok(out)
}

/// Every fixture must name two distinct, known teams.
pub fn validate_fixtures(profiles: &TeamProfiles, fixtures: &[Fixture]) -> Result<(), DataError> {
    for fixture in fixtures {
        profiles.require(&fixture.home)?;
        profiles.require(&fixture.away)?;
        if fixture.home == fixture.away {
            return Err(DataError::SelfFixture {
                team: fixture.home.clone(),
            });
        }
    }

    let scheduled: HashSet<&str> = fixtures
        .iter()
        .flat_map(|f| [f.home.as_str(), f.away.as_str()])
        .collect();
    for name in profiles.names() {
        if !scheduled.contains(name) {
            log::warn!("team '{name}' has no fixtures and will finish every run on zero");
        }
    }
    Ok(())
}

pub fn load_fixtures(path: &Path, profiles: &TeamProfiles) -> Result<Vec<Fixture>> {
    let file = File::open(path).with_context(|| format!("open fixtures {}", path.display()))?;
    let fixtures =
        read_fixtures(file).with_context(|| format!("load fixtures {}", path.display()))?;
    validate_fixtures(profiles, &fixtures)
        .with_context(|| format!("validate fixtures {}", path.display()))?;
    log::info!("loaded {} fixtures from {}", fixtures.len(), path.display());
    Ok(fixtures)
}

/// Home-and-away schedule where every pair meets twice.
pub fn double_round_robin<S: AsRef<str>>(teams: &[S]) -> Vec<Fixture> {
    let mut out = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1));
    for home in teams {
        for away in teams {
            if home.as_ref() != away.as_ref() {
                out.push(Fixture::new(home.as_ref(), away.as_ref()));
            }
        }
    }
    out
}
