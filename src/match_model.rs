use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::error::DataError;
use crate::team_profile::TeamProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    pub home_goals: u32,
    pub away_goals: u32,
    pub outcome: Outcome,
}

impl MatchResult {
    pub fn from_score(home_goals: u32, away_goals: u32) -> Self {
        Self {
            home_goals,
            away_goals,
            outcome: classify_outcome(home_goals, away_goals),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalRates {
    pub home: f64,
    pub away: f64,
}

pub fn classify_outcome(home_goals: u32, away_goals: u32) -> Outcome {
    if home_goals > away_goals {
        Outcome::HomeWin
    } else if home_goals < away_goals {
        Outcome::AwayWin
    } else {
        Outcome::Draw
    }
}

/// Produces a final score for one fixture.
pub trait MatchSampler {
    fn sample(&mut self, home: &TeamProfile, away: &TeamProfile) -> Result<MatchResult, DataError>;
}

pub fn expected_goals(home: &TeamProfile, away: &TeamProfile) -> Result<GoalRates, DataError> {
    Ok(GoalRates {
        home: side_rate(home, away)?,
        away: side_rate(away, home)?,
    })
}

fn side_rate(own: &TeamProfile, opp: &TeamProfile) -> Result<f64, DataError> {
    let xg = own.stats().xg;
    if opp.defensive_strength() == 0.0 {
        return Err(DataError::ZeroDenominator {
            team: opp.name().to_string(),
            field: "defensive strength",
        });
    }
    if xg == 0.0 {
        return Err(DataError::ZeroDenominator {
            team: own.name().to_string(),
            field: "xG",
        });
    }

    let mut rate = xg * (own.offensive_strength() / opp.defensive_strength());
    rate *= own.adjusted_possession() / 100.0;
    // Finishing efficiency.
    rate *= own.stats().shots_on_target / xg;
    rate *= 1.0 - own.discipline_risk();

    if !rate.is_finite() || rate < 0.0 {
        return Err(DataError::InvalidRate {
            team: own.name().to_string(),
            rate,
        });
    }
    Ok(rate)
}

pub fn draw_goals<R: Rng + ?Sized>(rng: &mut R, team: &str, rate: f64) -> Result<u32, DataError> {
    if rate == 0.0 {
        return Ok(0);
    }
    let dist = Poisson::new(rate).map_err(|_| DataError::InvalidRate {
        team: team.to_string(),
        rate,
    })?;
    let goals: f64 = dist.sample(rng);
    Ok(goals as u32)
}

/// Independent Poisson draws for each side at the model's expected-goal rates.
pub struct PoissonSampler<R> {
    rng: R,
}

impl<R: Rng> PoissonSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> MatchSampler for PoissonSampler<R> {
    fn sample(&mut self, home: &TeamProfile, away: &TeamProfile) -> Result<MatchResult, DataError> {
        let rates = expected_goals(home, away)?;
        let home_goals = draw_goals(&mut self.rng, home.name(), rates.home)?;
        let away_goals = draw_goals(&mut self.rng, away.name(), rates.away)?;
        Ok(MatchResult::from_score(home_goals, away_goals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team_profile::TeamSeasonStats;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn stats(name: &str) -> TeamSeasonStats {
        TeamSeasonStats {
            team: name.to_string(),
            games_played: 10,
            goals_scored: 20,
            goals_conceded: 10,
            possession_pct: 50.0,
            passing_accuracy_pct: 80.0,
            yellow_cards: 2,
            red_cards: 0,
            xg: 1.5,
            shots_on_target: 5.0,
        }
    }

    fn profile(s: TeamSeasonStats) -> TeamProfile {
        TeamProfile::new(s).unwrap()
    }

    #[test]
    fn classify_outcome_covers_all_tags() {
        assert_eq!(classify_outcome(2, 1), Outcome::HomeWin);
        assert_eq!(classify_outcome(0, 3), Outcome::AwayWin);
        assert_eq!(classify_outcome(1, 1), Outcome::Draw);
    }

    #[test]
    fn expected_goals_follow_the_rate_formula() {
        let home = profile(stats("H"));
        let away = profile(stats("A"));
        let rates = expected_goals(&home, &away).unwrap();
        // 1.5 * (2.0 / 1.0) * 0.40 * (5.0 / 1.5) * (1 - 0.2)
        let want = 1.5 * 2.0 * 0.40 * (5.0 / 1.5) * 0.8;
        assert!((rates.home - want).abs() < 1e-12);
        assert!((rates.away - want).abs() < 1e-12);
    }

    #[test]
    fn zero_opponent_defence_is_an_error() {
        let home = profile(stats("H"));
        let mut wall = stats("Wall");
        wall.goals_conceded = 0;
        let away = profile(wall);
        let err = expected_goals(&home, &away).unwrap_err();
        assert!(matches!(
            err,
            DataError::ZeroDenominator {
                field: "defensive strength",
                ..
            }
        ));
    }

    #[test]
    fn zero_xg_is_an_error() {
        let mut s = stats("H");
        s.xg = 0.0;
        let home = profile(s);
        let away = profile(stats("A"));
        let err = expected_goals(&home, &away).unwrap_err();
        assert!(matches!(err, DataError::ZeroDenominator { field: "xG", .. }));
    }

    #[test]
    fn heavy_discipline_risk_makes_rate_invalid() {
        let mut s = stats("H");
        s.red_cards = 10;
        let home = profile(s);
        let away = profile(stats("A"));
        let err = expected_goals(&home, &away).unwrap_err();
        assert!(matches!(err, DataError::InvalidRate { ref team, .. } if team == "H"));
    }

    #[test]
    fn zero_rate_always_draws_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(draw_goals(&mut rng, "T", 0.0).unwrap(), 0);
        }
    }

    #[test]
    fn poisson_draws_average_near_rate() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let total: u64 = (0..n)
            .map(|_| draw_goals(&mut rng, "T", 1.6).unwrap() as u64)
            .sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 1.6).abs() < 0.05, "mean was {mean}");
    }

    #[test]
    fn sampler_result_is_consistent_with_score() {
        let home = profile(stats("H"));
        let away = profile(stats("A"));
        let mut sampler = PoissonSampler::new(StdRng::seed_from_u64(3));
        for _ in 0..50 {
            let r = sampler.sample(&home, &away).unwrap();
            assert_eq!(r.outcome, classify_outcome(r.home_goals, r.away_goals));
        }
    }
}
