//! Log-linear Poisson regression over team indicator variables, fitted by iteratively reweighted
//! least squares.
//!
//! The design carries one attack and one defense indicator per team and a home indicator, with no
//! intercept. Such a design is rank-deficient by one (the attack indicators and the defense
//! indicators each sum to one on every row), so each weighted least-squares step is solved with
//! the Moore-Penrose pseudo-inverse, which selects the minimum-norm coefficient vector.

use std::fmt::{Display, Formatter};
use std::ops::Range;

use anyhow::bail;
use nalgebra::{DMatrix, DVector};
use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};
use statrs::function::erf::erfc;
use statrs::function::factorial::ln_factorial;
use strum::IntoEnumIterator;
use strum_macros::{EnumCount, EnumIter};
use tracing::{debug, info};

use crate::data::DesignRow;
use crate::error::ConvergenceError;
use crate::team::Teams;

/// Singular values below this fraction of the largest are treated as zero.
const RELATIVE_RANK_TOLERANCE: f64 = 1e-10;

/// Floor on the starting mean, so that all-zero responses still yield a finite linear predictor.
const MIN_START_MEAN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regressor {
    /// Active when the team with this ordinal is the scoring side.
    Attack(usize),
    /// Active when the team with this ordinal is the conceding side.
    Defense(usize),
    /// Active when the scoring side plays at home.
    Home,
}
impl Regressor {
    pub fn resolve(&self, row: &DesignRow) -> f64 {
        let active = match self {
            Regressor::Attack(team) => row.attack == *team,
            Regressor::Defense(team) => row.defense == *team,
            Regressor::Home => row.is_home,
        };
        if active {
            1.0
        } else {
            0.0
        }
    }

    pub fn describe<'a>(&'a self, teams: &'a Teams) -> DescribeRegressor<'a> {
        DescribeRegressor {
            regressor: self,
            teams,
        }
    }
}

pub struct DescribeRegressor<'a> {
    regressor: &'a Regressor,
    teams: &'a Teams,
}

impl Display for DescribeRegressor<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.regressor {
            Regressor::Attack(team) => write!(f, "attack[{}]", self.teams.get(*team).id),
            Regressor::Defense(team) => write!(f, "defense[{}]", self.teams.get(*team).id),
            Regressor::Home => write!(f, "home"),
        }
    }
}

/// The model's linear predictor: a sum of coefficient-weighted regressors, with no intercept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegressionSpec {
    pub regressors: Vec<Regressor>,
}
impl RegressionSpec {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.regressors.is_empty() {
            bail!("at least one regressor must be present");
        }
        for (index, regressor) in self.regressors.iter().enumerate() {
            if self.regressors[..index].contains(regressor) {
                bail!("duplicate regressor {regressor:?}");
            }
        }
        Ok(())
    }

    pub fn position(&self, regressor: &Regressor) -> Option<usize> {
        self.regressors.iter().position(|candidate| candidate == regressor)
    }
}

/// One attack and one defense regressor per team, in team order, followed by the home regressor.
pub fn build_regression_spec(teams: &Teams) -> RegressionSpec {
    let regressors = (0..teams.len())
        .map(Regressor::Attack)
        .chain((0..teams.len()).map(Regressor::Defense))
        .chain([Regressor::Home])
        .collect();
    RegressionSpec { regressors }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub max_iterations: u64,
    /// Convergence is declared once the relative change in deviance falls below this value.
    pub tolerance: f64,
}
impl FitConfig {
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_iterations == 0 {
            bail!("at least one iteration must be permitted");
        }
        if self.tolerance <= 0.0 {
            bail!("tolerance must be positive");
        }
        Ok(())
    }
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    pub spec: RegressionSpec,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<f64>,
    pub p_values: Vec<f64>,
    pub deviance: f64,
    pub null_deviance: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    /// Numerical rank of the design, i.e., the number of identifiable coefficients.
    pub rank: usize,
    pub observations: usize,
    pub iterations: u64,
}
impl FittedModel {
    /// Maximises the Poisson log-likelihood of `table` under a log link.
    pub fn fit(
        spec: RegressionSpec,
        table: &[DesignRow],
        config: &FitConfig,
    ) -> Result<Self, ConvergenceError> {
        if table.is_empty() {
            return Err(ConvergenceError::NoObservations);
        }
        if spec.regressors.is_empty() {
            return Err(ConvergenceError::NoRegressors);
        }

        let x = DMatrix::from_fn(table.len(), spec.regressors.len(), |row, col| {
            spec.regressors[col].resolve(&table[row])
        });
        let y = DVector::from_iterator(table.len(), table.iter().map(|row| row.goals as f64));
        let mean = y.mean();

        let mut mu = y.map(|y| f64::max((y + mean) / 2.0, MIN_START_MEAN));
        let mut eta = mu.map(f64::ln);
        let mut deviance = poisson_deviance(&y, &mu);
        let mut change = f64::INFINITY;
        let mut iterations = 0;
        let coefficients = loop {
            if iterations == config.max_iterations {
                return Err(ConvergenceError::IterationLimit { iterations, change });
            }
            iterations += 1;

            let working_response = DVector::from_fn(y.len(), |row, _| {
                eta[row] + (y[row] - mu[row]) / mu[row]
            });
            let (xtw, information) = weighted_information(&x, &mu);
            let (information_inv, _) = pseudo_inverse(information)
                .ok_or(ConvergenceError::Diverged { iteration: iterations })?;
            let beta = information_inv * (xtw * working_response);

            eta = &x * &beta;
            mu = eta.map(f64::exp);
            let new_deviance = poisson_deviance(&y, &mu);
            if !new_deviance.is_finite() {
                return Err(ConvergenceError::Diverged { iteration: iterations });
            }
            change = (new_deviance - deviance).abs() / (new_deviance.abs() + 0.1);
            deviance = new_deviance;
            debug!("iteration {iterations}: deviance {deviance:.6}, relative change {change:e}");
            if change < config.tolerance {
                break beta;
            }
        };

        let (_, information) = weighted_information(&x, &mu);
        let (covariance, rank) = pseudo_inverse(information)
            .ok_or(ConvergenceError::Diverged { iteration: iterations })?;
        let std_errors: Vec<_> = covariance.diagonal().iter().map(|variance| variance.max(0.0).sqrt()).collect();
        let p_values = coefficients
            .iter()
            .zip(&std_errors)
            .map(|(&coefficient, &std_error)| wald_p_value(coefficient, std_error))
            .collect();

        let log_likelihood = poisson_log_likelihood(&y, &mu);
        let aic = -2.0 * log_likelihood + 2.0 * rank as f64;
        let null_deviance = poisson_deviance(&y, &DVector::from_element(y.len(), mean));
        info!(
            "converged after {iterations} iterations: deviance {deviance:.2}, log-likelihood {log_likelihood:.2}, AIC {aic:.2}"
        );

        Ok(Self {
            spec,
            coefficients: coefficients.iter().copied().collect(),
            std_errors,
            p_values,
            deviance,
            null_deviance,
            log_likelihood,
            aic,
            rank,
            observations: table.len(),
            iterations,
        })
    }

    pub fn coefficient(&self, regressor: &Regressor) -> Option<f64> {
        self.spec
            .position(regressor)
            .map(|index| self.coefficients[index])
    }

    /// The fitted mean number of goals for a design row.
    pub fn predict(&self, row: &DesignRow) -> f64 {
        self.spec
            .regressors
            .iter()
            .zip(&self.coefficients)
            .map(|(regressor, coefficient)| coefficient * regressor.resolve(row))
            .sum::<f64>()
            .exp()
    }

    pub fn tabulate(&self, teams: &Teams) -> Table {
        let mut table = Table::default()
            .with_cols(vec![
                Col::new(Styles::default()),
                Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
                Col::new(Styles::default().with(MinWidth(11)).with(HAlign::Right)),
                Col::new(Styles::default().with(MinWidth(9)).with(HAlign::Right)),
                Col::new(Styles::default().with(MinWidth(5))),
            ])
            .with_row(Row::new(
                Styles::default().with(Header(true)),
                vec![
                    "Regressor".into(),
                    "Coefficient".into(),
                    "Std. error".into(),
                    "P-value".into(),
                    "".into(),
                ],
            ));
        for (index, regressor) in self.spec.regressors.iter().enumerate() {
            table.push_row(Row::new(
                Styles::default(),
                vec![
                    regressor.describe(teams).to_string().into(),
                    format!("{:.6}", self.coefficients[index]).into(),
                    format!("{:.6}", self.std_errors[index]).into(),
                    format!("{:.6}", self.p_values[index]).into(),
                    Significance::lookup(self.p_values[index]).label().into(),
                ],
            ));
        }
        table
    }
}

/// Returns `Xᵀ·W` and the Fisher information `Xᵀ·W·X`, where the weights are the fitted means.
fn weighted_information(x: &DMatrix<f64>, mu: &DVector<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
    let xtw = DMatrix::from_fn(x.ncols(), x.nrows(), |row, col| x[(col, row)] * mu[col]);
    let information = &xtw * x;
    (xtw, information)
}

/// Pseudo-inverse of a symmetric positive semi-definite matrix, along with its numerical rank.
fn pseudo_inverse(matrix: DMatrix<f64>) -> Option<(DMatrix<f64>, usize)> {
    let svd = matrix.svd(true, true);
    let eps = svd.singular_values.max() * RELATIVE_RANK_TOLERANCE;
    let rank = svd.rank(eps);
    svd.pseudo_inverse(eps).ok().map(|inverse| (inverse, rank))
}

fn poisson_deviance(y: &DVector<f64>, mu: &DVector<f64>) -> f64 {
    2.0 * y
        .iter()
        .zip(mu.iter())
        .map(|(&y, &mu)| {
            let ratio_term = if y > 0.0 { y * (y / mu).ln() } else { 0.0 };
            ratio_term - (y - mu)
        })
        .sum::<f64>()
}

fn poisson_log_likelihood(y: &DVector<f64>, mu: &DVector<f64>) -> f64 {
    y.iter()
        .zip(mu.iter())
        .map(|(&y, &mu)| y * mu.ln() - mu - ln_factorial(y as u64))
        .sum()
}

/// Two-sided p-value of a Wald z-test against a zero coefficient.
fn wald_p_value(coefficient: f64, std_error: f64) -> f64 {
    if std_error > 0.0 && std_error.is_finite() {
        erfc((coefficient / std_error).abs() / std::f64::consts::SQRT_2)
    } else {
        1.0
    }
}

#[derive(Debug, Clone, PartialEq, EnumCount, EnumIter)]
pub enum Significance {
    A,
    B,
    C,
    D,
    E,
}
impl Significance {
    pub fn label(&self) -> &'static str {
        match self {
            Significance::A => "***",
            Significance::B => "**",
            Significance::C => "*",
            Significance::D => ".",
            Significance::E => "",
        }
    }

    pub fn range(&self) -> Range<f64> {
        match self {
            Significance::A => 0.0..0.001,
            Significance::B => 0.001..0.01,
            Significance::C => 0.01..0.05,
            Significance::D => 0.05..0.1,
            Significance::E => 0.1..1.0 + f64::EPSILON,
        }
    }

    pub fn lookup(p_value: f64) -> Self {
        Self::iter()
            .find(|sig| sig.range().contains(&p_value))
            .unwrap_or(Significance::E)
    }
}
