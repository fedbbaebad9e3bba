//! A two-sided Poisson model of football scorelines. Per-team attack and defense strengths and a
//! league-wide home advantage are estimated from historical results by Poisson regression, then
//! turned into full scoreline distributions and the 1X2, correct-score and over/under
//! probabilities derived from them.

pub mod data;
pub mod error;
pub mod export;
pub mod linear;
pub mod mc;
pub mod model;
pub mod params;
pub mod poisson;
pub mod predict;
pub mod print;
pub mod ranking;
pub mod scoregrid;
pub mod team;

/// Default upper bound on the goals scored by either side in a scoregrid.
pub const DEFAULT_MAX_GOALS: u8 = 5;

/// Default total-goals line for over/under probabilities.
pub const DEFAULT_GOALS_LINE: f64 = 2.5;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
