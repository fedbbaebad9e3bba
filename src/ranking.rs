//! Team rankings, comparisons and qualitative profiles.

use serde::Serialize;
use strum_macros::{Display, EnumIter};
use tracing::debug;

use crate::error::UnknownTeam;
use crate::params::FittedParameters;
use crate::team::{Team, TeamId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTeam {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub team: TeamId,
    pub name: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Descending,
    Ascending,
}

/// Teams from the strongest attack (highest multiplier) down. Equal multipliers keep registry
/// order; `top_n` truncates the result.
pub fn rank_attack(params: &FittedParameters, top_n: Option<usize>) -> Vec<RankedTeam> {
    rank(params, params.attacks(), Order::Descending, top_n)
}

/// Teams from the strongest defense (lowest multiplier) up.
pub fn rank_defense(params: &FittedParameters, top_n: Option<usize>) -> Vec<RankedTeam> {
    rank(params, params.defenses(), Order::Ascending, top_n)
}

fn rank(
    params: &FittedParameters,
    coefficients: &[f64],
    order: Order,
    top_n: Option<usize>,
) -> Vec<RankedTeam> {
    let mut ordinals: Vec<_> = (0..coefficients.len()).collect();
    ordinals.sort_by(|&a, &b| match order {
        Order::Descending => coefficients[b].total_cmp(&coefficients[a]),
        Order::Ascending => coefficients[a].total_cmp(&coefficients[b]),
    });
    ordinals
        .into_iter()
        .take(top_n.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(index, ordinal)| {
            let team = params.teams().get(ordinal);
            RankedTeam {
                rank: index + 1,
                team: team.id.clone(),
                name: team.name.clone(),
                coefficient: coefficients[ordinal],
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamComparison {
    pub team: Team,
    pub attack: f64,
    pub defense: f64,
}

/// Side-by-side strengths of the listed teams, in the order given. Unknown teams are skipped.
pub fn compare<S: AsRef<str>>(params: &FittedParameters, teams: &[S]) -> Vec<TeamComparison> {
    teams
        .iter()
        .filter_map(|team| match params.resolve(team.as_ref()) {
            Ok(ordinal) => Some(TeamComparison {
                team: params.teams().get(ordinal).clone(),
                attack: params.attack_at(ordinal),
                defense: params.defense_at(ordinal),
            }),
            Err(_) => {
                debug!("omitting unknown team {} from comparison", team.as_ref());
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Rating {
    #[strum(serialize = "Very strong")]
    VeryStrong,
    Strong,
    #[strum(serialize = "Slightly above average")]
    SlightlyAbove,
    Average,
    #[strum(serialize = "Slightly below average")]
    SlightlyBelow,
    Weak,
}
impl Rating {
    const ATTACK_THRESHOLDS: [f64; 5] = [1.3, 1.15, 1.05, 0.95, 0.85];
    const DEFENSE_THRESHOLDS: [f64; 5] = [0.75, 0.85, 0.95, 1.05, 1.15];
    const GRADES: [Rating; 6] = [
        Rating::VeryStrong,
        Rating::Strong,
        Rating::SlightlyAbove,
        Rating::Average,
        Rating::SlightlyBelow,
        Rating::Weak,
    ];

    pub fn of_attack(attack: f64) -> Self {
        let grade = Self::ATTACK_THRESHOLDS
            .iter()
            .position(|&threshold| attack > threshold)
            .unwrap_or(Self::ATTACK_THRESHOLDS.len());
        Self::GRADES[grade]
    }

    pub fn of_defense(defense: f64) -> Self {
        let grade = Self::DEFENSE_THRESHOLDS
            .iter()
            .position(|&threshold| defense < threshold)
            .unwrap_or(Self::DEFENSE_THRESHOLDS.len());
        Self::GRADES[grade]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamProfile {
    pub team: Team,
    pub attack: f64,
    pub attack_rating: Rating,
    /// Signed percentage by which the attack multiplier departs from the league average.
    pub attack_vs_average: f64,
    pub attack_percentile: f64,
    pub defense: f64,
    pub defense_rating: Rating,
    /// Signed percentage by which the defense multiplier departs from the league average; negative
    /// values concede less than average.
    pub defense_vs_average: f64,
    pub defense_percentile: f64,
}

pub fn team_profile(params: &FittedParameters, team: &str) -> Result<TeamProfile, UnknownTeam> {
    let ordinal = params.resolve(team)?;
    let (attack, defense) = (params.attack_at(ordinal), params.defense_at(ordinal));
    Ok(TeamProfile {
        team: params.teams().get(ordinal).clone(),
        attack,
        attack_rating: Rating::of_attack(attack),
        attack_vs_average: (attack - 1.0) * 100.0,
        attack_percentile: percentile(attack, params.attacks()),
        defense,
        defense_rating: Rating::of_defense(defense),
        defense_vs_average: (defense - 1.0) * 100.0,
        defense_percentile: percentile(defense, params.defenses()),
    })
}

/// Percentage of `values` that lie strictly below `value`, in `[0, 100)`.
pub fn percentile(value: f64, values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let below = values.iter().filter(|&&other| other < value).count();
    below as f64 / values.len() as f64 * 100.0
}
