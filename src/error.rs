use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("{table}: required column '{column}' is missing")]
    MissingColumn { table: &'static str, column: &'static str },
    #[error("team '{team}' has zero games played")]
    ZeroGamesPlayed { team: String },
    #[error("team '{team}' appears more than once")]
    DuplicateTeam { team: String },
    #[error("unknown team '{team}'")]
    UnknownTeam { team: String },
    #[error("fixture pits '{team}' against itself")]
    SelfFixture { team: String },
    #[error("team '{team}': {field} is zero, goal rate is undefined")]
    ZeroDenominator { team: String, field: &'static str },
    #[error("team '{team}': goal rate {rate} is not a valid Poisson mean")]
    InvalidRate { team: String, rate: f64 },
    #[error("{home} {home_goals}-{away_goals} {away}: outcome does not match the score")]
    InconsistentResult {
        home: String,
        away: String,
        home_goals: u32,
        away_goals: u32,
    },
    #[error("no simulation runs to aggregate")]
    NoRuns,
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
}
