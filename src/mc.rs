//! Monte Carlo simulation of match outcomes, used to cross-check the analytic scoregrid.

use tinyrand::{Rand, Seeded, Wyrand};
use tracing::debug;

use crate::poisson;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonteCarloTally {
    pub trials: u64,
    pub home_wins: u64,
    pub draws: u64,
    pub away_wins: u64,
}
impl MonteCarloTally {
    pub fn home_win_fraction(&self) -> f64 {
        self.fraction(self.home_wins)
    }

    pub fn draw_fraction(&self) -> f64 {
        self.fraction(self.draws)
    }

    pub fn away_win_fraction(&self) -> f64 {
        self.fraction(self.away_wins)
    }

    fn fraction(&self, count: u64) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            count as f64 / self.trials as f64
        }
    }
}

/// Simulates `trials` matches between sides scoring at the given rates. The same seed always
/// yields the same tally.
pub fn monte_carlo_outcome(home_rate: f64, away_rate: f64, trials: u64, seed: u64) -> MonteCarloTally {
    let mut rand = Wyrand::seed(seed);
    let tally = run(home_rate, away_rate, trials, &mut rand);
    debug!("simulated {trials} matches with seed {seed}: {tally:?}");
    tally
}

pub fn run(home_rate: f64, away_rate: f64, trials: u64, rand: &mut impl Rand) -> MonteCarloTally {
    let mut tally = MonteCarloTally {
        trials,
        ..MonteCarloTally::default()
    };
    for _ in 0..trials {
        let home_goals = poisson::sample(home_rate, rand);
        let away_goals = poisson::sample(away_rate, rand);
        match home_goals.cmp(&away_goals) {
            std::cmp::Ordering::Greater => tally.home_wins += 1,
            std::cmp::Ordering::Equal => tally.draws += 1,
            std::cmp::Ordering::Less => tally.away_wins += 1,
        }
    }
    tally
}
