//! Scoregrids: joint probabilities over final scores, indexed by home goals (rows) and away goals
//! (columns), and the outcomes derived from them.
//!
//! A scoregrid is truncated at a maximum number of goals per side and is not renormalised, so its
//! total mass falls slightly short of 1.

use std::fmt::{Display, Formatter};

use crate::error::UnknownTeam;
use crate::linear::Matrix;
use crate::params::FittedParameters;
use crate::poisson;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}
impl Score {
    pub fn new(home: u8, away: u8) -> Self {
        Self { home, away }
    }

    pub fn total(&self) -> u16 {
        self.home as u16 + self.away as u16
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Outcome {
    Win(Side),
    Draw,
    CorrectScore(Score),
}
impl Outcome {
    pub fn gather(&self, scoregrid: &Matrix<f64>) -> f64 {
        match self {
            Outcome::Win(side) => Self::gather_win(side, scoregrid),
            Outcome::Draw => Self::gather_draw(scoregrid),
            Outcome::CorrectScore(score) => Self::gather_correct_score(score, scoregrid),
        }
    }

    fn gather_win(side: &Side, scoregrid: &Matrix<f64>) -> f64 {
        let mut prob = 0.0;
        match side {
            Side::Home => {
                for row in 1..scoregrid.rows() {
                    for col in 0..row.min(scoregrid.cols()) {
                        prob += scoregrid[(row, col)];
                    }
                }
            }
            Side::Away => {
                for col in 1..scoregrid.cols() {
                    for row in 0..col.min(scoregrid.rows()) {
                        prob += scoregrid[(row, col)];
                    }
                }
            }
        }
        prob
    }

    fn gather_draw(scoregrid: &Matrix<f64>) -> f64 {
        let mut prob = 0.0;
        for index in 0..scoregrid.rows().min(scoregrid.cols()) {
            prob += scoregrid[(index, index)];
        }
        prob
    }

    fn gather_correct_score(score: &Score, scoregrid: &Matrix<f64>) -> f64 {
        let (row, col) = (score.home as usize, score.away as usize);
        if row < scoregrid.rows() && col < scoregrid.cols() {
            scoregrid[(row, col)]
        } else {
            0.0
        }
    }
}

/// Goal rates of the home and away sides: `λ_home = attack[home] × defense[away] × γ` and
/// `λ_away = attack[away] × defense[home]`.
pub fn expected_goals(
    home: &str,
    away: &str,
    params: &FittedParameters,
) -> Result<(f64, f64), UnknownTeam> {
    let (home, away) = (params.resolve(home)?, params.resolve(away)?);
    let home_goals = params.attack_at(home) * params.defense_at(away) * params.home_advantage();
    let away_goals = params.attack_at(away) * params.defense_at(home);
    Ok((home_goals, away_goals))
}

/// Independent Poisson scoregrid spanning 0 to `max_goals` for each side.
pub fn scoreline_matrix(home_rate: f64, away_rate: f64, max_goals: u8) -> Matrix<f64> {
    let home_probs = poisson::univariate_series(home_rate, max_goals);
    let away_probs = poisson::univariate_series(away_rate, max_goals);
    let mut scoregrid = Matrix::allocate(home_probs.len(), away_probs.len());
    for (home_goals, home_prob) in home_probs.iter().enumerate() {
        for (away_goals, away_prob) in away_probs.iter().enumerate() {
            scoregrid[(home_goals, away_goals)] = home_prob * away_prob;
        }
    }
    scoregrid
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutcomeProbabilities {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
}
impl OutcomeProbabilities {
    pub fn sum(&self) -> f64 {
        self.home_win + self.draw + self.away_win
    }
}

pub fn outcome_probabilities(scoregrid: &Matrix<f64>) -> OutcomeProbabilities {
    OutcomeProbabilities {
        home_win: Outcome::Win(Side::Home).gather(scoregrid),
        draw: Outcome::Draw.gather(scoregrid),
        away_win: Outcome::Win(Side::Away).gather(scoregrid),
    }
}

/// The most probable score. Ties resolve to the first cell in home-goals-major order.
pub fn most_likely_scoreline(scoregrid: &Matrix<f64>) -> (Score, f64) {
    let mut best = (Score::new(0, 0), f64::NEG_INFINITY);
    for row in 0..scoregrid.rows() {
        for (col, &prob) in scoregrid[row].iter().enumerate() {
            if prob > best.1 {
                best = (Score::new(row as u8, col as u8), prob);
            }
        }
    }
    best
}

/// Splits the scoregrid mass into `(over, under)`: scores whose total exceeds `threshold`, and the
/// rest.
pub fn over_under(scoregrid: &Matrix<f64>, threshold: f64) -> (f64, f64) {
    let (mut over, mut under) = (0.0, 0.0);
    for row in 0..scoregrid.rows() {
        for (col, &prob) in scoregrid[row].iter().enumerate() {
            if (row + col) as f64 > threshold {
                over += prob;
            } else {
                under += prob;
            }
        }
    }
    (over, under)
}
