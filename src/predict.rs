//! Match predictions from fitted parameters.

use std::str::FromStr;

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::error::UnknownTeam;
use crate::linear::Matrix;
use crate::params::FittedParameters;
use crate::scoregrid::{self, Score};
use crate::team::Team;
use crate::DEFAULT_GOALS_LINE;

/// Everything known about a single fixture under the model.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub home_team: Team,
    pub away_team: Team,
    pub expected_goals_home: f64,
    pub expected_goals_away: f64,
    /// Probabilities indexed by `[home goals][away goals]`.
    pub scoregrid: Matrix<f64>,
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    pub most_likely: Score,
    pub most_likely_prob: f64,
    pub goals_line: f64,
    pub over: f64,
    pub under: f64,
}

pub fn predict(
    home: &str,
    away: &str,
    params: &FittedParameters,
    max_goals: u8,
) -> Result<PredictionResult, UnknownTeam> {
    let (home_ordinal, away_ordinal) = (params.resolve(home)?, params.resolve(away)?);
    let (expected_goals_home, expected_goals_away) = scoregrid::expected_goals(home, away, params)?;
    let scoregrid = scoregrid::scoreline_matrix(expected_goals_home, expected_goals_away, max_goals);
    let outcomes = scoregrid::outcome_probabilities(&scoregrid);
    let (most_likely, most_likely_prob) = scoregrid::most_likely_scoreline(&scoregrid);
    let (over, under) = scoregrid::over_under(&scoregrid, DEFAULT_GOALS_LINE);
    let home_team = params.teams().get(home_ordinal).clone();
    let away_team = params.teams().get(away_ordinal).clone();
    debug!(
        "{} vs {}: λ {expected_goals_home:.3}-{expected_goals_away:.3}, most likely {most_likely}",
        home_team.name, away_team.name
    );

    Ok(PredictionResult {
        home_team,
        away_team,
        expected_goals_home,
        expected_goals_away,
        scoregrid,
        home_win: outcomes.home_win,
        draw: outcomes.draw,
        away_win: outcomes.away_win,
        most_likely,
        most_likely_prob,
        goals_line: DEFAULT_GOALS_LINE,
        over,
        under,
    })
}

/// A scheduled match between two named teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub home: String,
    pub away: String,
}
impl Fixture {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }
}

impl FromStr for Fixture {
    type Err = anyhow::Error;

    /// Parses `home:away`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (home, away) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("fixture '{s}' must be of the form home:away"))?;
        let (home, away) = (home.trim(), away.trim());
        if home.is_empty() || away.is_empty() {
            return Err(anyhow!("fixture '{s}' names an empty team"));
        }
        Ok(Self::new(home, away))
    }
}

/// Predicts every fixture in turn. Fixtures naming a team outside the parameters are logged and
/// left out of the result.
pub fn simulate_matchday(
    params: &FittedParameters,
    fixtures: &[Fixture],
    max_goals: u8,
) -> Vec<PredictionResult> {
    fixtures
        .iter()
        .filter_map(|fixture| match predict(&fixture.home, &fixture.away, params, max_goals) {
            Ok(prediction) => Some(prediction),
            Err(err) => {
                warn!("skipping {} vs {}: {err}", fixture.home, fixture.away);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert_float_eq::*;

    use super::*;
    use crate::testing::two_team_params;
    use crate::DEFAULT_MAX_GOALS;

    #[test]
    fn predict_scenario() {
        let params = two_team_params();
        let prediction = predict("A", "B", &params, DEFAULT_MAX_GOALS).unwrap();
        assert_eq!("A", prediction.home_team.name);
        assert_eq!("B", prediction.away_team.name);
        assert_float_relative_eq!(2.34, prediction.expected_goals_home);
        assert_float_relative_eq!(0.72, prediction.expected_goals_away);
        assert_eq!(6, prediction.scoregrid.rows());
        assert_eq!(Score::new(2, 0), prediction.most_likely);
        assert!(prediction.home_win > prediction.away_win);
        assert_eq!(DEFAULT_GOALS_LINE, prediction.goals_line);

        let total: f64 = prediction.scoregrid.flatten().iter().sum();
        assert_float_absolute_eq!(total, prediction.home_win + prediction.draw + prediction.away_win, 1e-12);
        assert_float_absolute_eq!(total, prediction.over + prediction.under, 1e-12);
    }

    #[test]
    fn predict_is_deterministic() {
        let params = two_team_params();
        let first = predict("A", "B", &params, 5).unwrap();
        let second = predict("A", "B", &params, 5).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn predict_against_self() {
        let params = two_team_params();
        let prediction = predict("B", "B", &params, 5).unwrap();
        assert_eq!(
            prediction.expected_goals_away * params.home_advantage(),
            prediction.expected_goals_home
        );
    }

    #[test]
    fn predict_unknown_team() {
        let params = two_team_params();
        assert_eq!("Z", predict("Z", "B", &params, 5).unwrap_err().team);
    }

    #[test]
    fn matchday_skips_unknown_fixtures() {
        let params = two_team_params();
        let fixtures = vec![
            Fixture::new("A", "B"),
            Fixture::new("A", "Z"),
            Fixture::new("B", "A"),
        ];
        let predictions = simulate_matchday(&params, &fixtures, 5);
        assert_eq!(2, predictions.len());
        assert_eq!("B", predictions[1].home_team.name);
    }

    #[test]
    fn parse_fixture() {
        assert_eq!(Fixture::new("Club America", "Toluca"), "Club America: Toluca".parse().unwrap());
        assert!("Club America".parse::<Fixture>().is_err());
        assert!(":Toluca".parse::<Fixture>().is_err());
    }
}
