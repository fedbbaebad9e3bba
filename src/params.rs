//! Multiplicative team strengths recovered from a fitted model.

use tracing::{info, warn};

use crate::error::UnknownTeam;
use crate::linear::glm::{FittedModel, Regressor};
use crate::team::{Team, Teams};

/// Attack and defense multipliers for every training team, relative to a league average of 1.0,
/// and a league-wide home advantage. A higher attack multiplier scores more; a lower defense
/// multiplier concedes less.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedParameters {
    teams: Teams,
    attack: Vec<f64>,
    defense: Vec<f64>,
    home_advantage: f64,
}
impl FittedParameters {
    pub fn new(teams: Teams, attack: Vec<f64>, defense: Vec<f64>, home_advantage: f64) -> Self {
        assert_eq!(teams.len(), attack.len(), "one attack multiplier is required per team");
        assert_eq!(teams.len(), defense.len(), "one defense multiplier is required per team");
        Self {
            teams,
            attack,
            defense,
            home_advantage,
        }
    }

    pub fn teams(&self) -> &Teams {
        &self.teams
    }

    pub fn home_advantage(&self) -> f64 {
        self.home_advantage
    }

    /// Looks up a team by display name or identifier.
    pub fn resolve(&self, team: &str) -> Result<usize, UnknownTeam> {
        self.teams.resolve(team)
    }

    pub fn attack(&self, team: &str) -> Result<f64, UnknownTeam> {
        Ok(self.attack[self.resolve(team)?])
    }

    pub fn defense(&self, team: &str) -> Result<f64, UnknownTeam> {
        Ok(self.defense[self.resolve(team)?])
    }

    pub fn attack_at(&self, ordinal: usize) -> f64 {
        self.attack[ordinal]
    }

    pub fn defense_at(&self, ordinal: usize) -> f64 {
        self.defense[ordinal]
    }

    pub fn attacks(&self) -> &[f64] {
        &self.attack
    }

    pub fn defenses(&self) -> &[f64] {
        &self.defense
    }

    pub fn iter(&self) -> impl Iterator<Item = TeamStrength<'_>> {
        self.teams.iter().enumerate().map(|(ordinal, team)| TeamStrength {
            team,
            attack: self.attack[ordinal],
            defense: self.defense[ordinal],
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamStrength<'a> {
    pub team: &'a Team,
    pub attack: f64,
    pub defense: f64,
}

/// Exponentiates the fitted log-coefficients. A team without a coefficient is taken to be
/// average.
pub fn extract_parameters(model: &FittedModel, teams: &Teams) -> FittedParameters {
    let multiplier = |regressor: Regressor| match model.coefficient(&regressor) {
        Some(coefficient) => coefficient.exp(),
        None => {
            warn!(
                "no coefficient for {}, assuming the league average",
                regressor.describe(teams)
            );
            1.0
        }
    };
    let attack = (0..teams.len()).map(|team| multiplier(Regressor::Attack(team))).collect();
    let defense = (0..teams.len()).map(|team| multiplier(Regressor::Defense(team))).collect();
    let home_advantage = multiplier(Regressor::Home);
    info!(
        "home advantage: {home_advantage:.4} ({:+.1}% goals at home)",
        (home_advantage - 1.0) * 100.0
    );
    FittedParameters::new(teams.clone(), attack, defense, home_advantage)
}
