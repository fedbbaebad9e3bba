//! The end-to-end training pipeline and the handle through which a trained model is used.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::data::{build_design_table, History};
use crate::error::{ModelError, UntrainedModel};
use crate::export;
use crate::linear::glm::{build_regression_spec, FitConfig, FittedModel};
use crate::params::{extract_parameters, FittedParameters};
use crate::predict::{self, Fixture, PredictionResult};
use crate::ranking::{self, RankedTeam, TeamComparison, TeamProfile};

/// Number of leading teams listed per ranking in a [`ModelSummary`].
pub const SUMMARY_TOP_N: usize = 3;

/// How a model's parameters came about.
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    Fitted {
        matches: usize,
        seasons: usize,
        fit: FittedModel,
    },
    /// Installed from previously exported parameters; no fit statistics are available.
    Installed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub params: FittedParameters,
    pub provenance: Provenance,
}
impl TrainedModel {
    pub fn fit(&self) -> Option<&FittedModel> {
        match &self.provenance {
            Provenance::Fitted { fit, .. } => Some(fit),
            Provenance::Installed => None,
        }
    }
}

/// Prepares the design table, fits the regression and extracts the team parameters.
pub fn train(history: &History, config: &FitConfig) -> Result<TrainedModel, ModelError> {
    let start_time = Instant::now();
    let table = build_design_table(&history.records, &history.teams)?;
    let spec = build_regression_spec(&history.teams);
    info!(
        "fitting {} regressors to {} observations",
        spec.regressors.len(),
        table.len()
    );
    let fit = FittedModel::fit(spec, &table, config)?;
    let params = extract_parameters(&fit, &history.teams);
    let elapsed = start_time.elapsed();
    info!(
        "trained on {} matches in {}s",
        history.records.len(),
        elapsed.as_millis() as f64 / 1_000.
    );
    Ok(TrainedModel {
        params,
        provenance: Provenance::Fitted {
            matches: history.records.len(),
            seasons: history.seasons(),
            fit,
        },
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitStatistics {
    pub matches: usize,
    pub seasons: usize,
    pub observations: usize,
    pub log_likelihood: f64,
    pub aic: f64,
    pub deviance: f64,
    pub null_deviance: f64,
    pub iterations: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub teams: usize,
    pub home_advantage: f64,
    pub statistics: Option<FitStatistics>,
    pub top_attack: Vec<RankedTeam>,
    pub top_defense: Vec<RankedTeam>,
}

/// Holds at most one trained model. Operations that need one fail with [`UntrainedModel`] until a
/// model is trained or installed, and again after [`invalidate`](Self::invalidate).
///
/// The model itself is immutable and reference-counted, so clones obtained from
/// [`trained`](Self::trained) stay valid across retraining.
#[derive(Debug, Default)]
pub struct ModelHandle {
    model: Option<Arc<TrainedModel>>,
}
impl ModelHandle {
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Returns the current model, initialising it with `init` if there is none.
    pub fn get_or_try_init<E>(
        &mut self,
        init: impl FnOnce() -> Result<TrainedModel, E>,
    ) -> Result<Arc<TrainedModel>, E> {
        if let Some(model) = &self.model {
            return Ok(model.clone());
        }
        let model = Arc::new(init()?);
        self.model = Some(model.clone());
        Ok(model)
    }

    /// Trains afresh, replacing any current model.
    pub fn train(&mut self, history: &History, config: &FitConfig) -> Result<Arc<TrainedModel>, ModelError> {
        self.invalidate();
        self.get_or_try_init(|| train(history, config))
    }

    /// Replaces any current model with previously fitted parameters.
    pub fn install_parameters(&mut self, params: FittedParameters) -> Arc<TrainedModel> {
        info!("installing parameters for {} teams", params.teams().len());
        let model = Arc::new(TrainedModel {
            params,
            provenance: Provenance::Installed,
        });
        self.model = Some(model.clone());
        model
    }

    pub fn invalidate(&mut self) {
        if self.model.take().is_some() {
            info!("model invalidated");
        }
    }

    pub fn trained(&self, operation: &'static str) -> Result<Arc<TrainedModel>, UntrainedModel> {
        self.model.clone().ok_or(UntrainedModel { operation })
    }

    fn params(&self, operation: &'static str) -> Result<&FittedParameters, UntrainedModel> {
        self.model
            .as_ref()
            .map(|model| &model.params)
            .ok_or(UntrainedModel { operation })
    }

    pub fn predict(&self, home: &str, away: &str, max_goals: u8) -> Result<PredictionResult, ModelError> {
        let params = self.params("predict")?;
        Ok(predict::predict(home, away, params, max_goals)?)
    }

    pub fn simulate_matchday(&self, fixtures: &[Fixture], max_goals: u8) -> Result<Vec<PredictionResult>, UntrainedModel> {
        let params = self.params("simulate a matchday")?;
        Ok(predict::simulate_matchday(params, fixtures, max_goals))
    }

    pub fn rank_attack(&self, top_n: Option<usize>) -> Result<Vec<RankedTeam>, UntrainedModel> {
        Ok(ranking::rank_attack(self.params("rank")?, top_n))
    }

    pub fn rank_defense(&self, top_n: Option<usize>) -> Result<Vec<RankedTeam>, UntrainedModel> {
        Ok(ranking::rank_defense(self.params("rank")?, top_n))
    }

    pub fn compare<S: AsRef<str>>(&self, teams: &[S]) -> Result<Vec<TeamComparison>, UntrainedModel> {
        Ok(ranking::compare(self.params("compare")?, teams))
    }

    pub fn team_profile(&self, team: &str) -> Result<TeamProfile, ModelError> {
        let params = self.params("profile a team")?;
        Ok(ranking::team_profile(params, team)?)
    }

    pub fn export_parameters(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let params = self.params("export parameters")?;
        export::save_parameters(path, params)?;
        Ok(())
    }

    pub fn summary(&self) -> Result<ModelSummary, UntrainedModel> {
        let model = self.trained("summarise")?;
        let statistics = match &model.provenance {
            Provenance::Fitted { matches, seasons, fit } => Some(FitStatistics {
                matches: *matches,
                seasons: *seasons,
                observations: fit.observations,
                log_likelihood: fit.log_likelihood,
                aic: fit.aic,
                deviance: fit.deviance,
                null_deviance: fit.null_deviance,
                iterations: fit.iterations,
            }),
            Provenance::Installed => None,
        };
        Ok(ModelSummary {
            teams: model.params.teams().len(),
            home_advantage: model.params.home_advantage(),
            statistics,
            top_attack: ranking::rank_attack(&model.params, Some(SUMMARY_TOP_N)),
            top_defense: ranking::rank_defense(&model.params, Some(SUMMARY_TOP_N)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_history, two_team_params};

    #[test]
    fn untrained_rejects_everything() {
        let handle = ModelHandle::default();
        assert!(!handle.is_trained());
        assert!(matches!(
            handle.predict("A", "B", 5).unwrap_err(),
            ModelError::Untrained(UntrainedModel { operation: "predict" })
        ));
        assert_eq!(UntrainedModel { operation: "rank" }, handle.rank_attack(None).unwrap_err());
        assert!(handle.rank_defense(Some(3)).is_err());
        assert!(handle.compare(&["A"]).is_err());
        assert!(handle.team_profile("A").is_err());
        assert!(handle.simulate_matchday(&[], 5).is_err());
        assert!(handle.summary().is_err());
        assert!(matches!(
            handle.export_parameters("/nonexistent/params.csv").unwrap_err(),
            ModelError::Untrained(_)
        ));
    }

    #[test]
    fn train_then_invalidate() {
        let mut handle = ModelHandle::default();
        let model = handle.train(&sample_history(), &FitConfig::default()).unwrap();
        assert!(handle.is_trained());
        assert!(model.fit().is_some());

        let prediction = handle.predict("Club America", "Atlas", 5).unwrap();
        assert!(prediction.home_win > prediction.away_win);
        assert_eq!("Club America", handle.rank_attack(Some(1)).unwrap()[0].name);

        let summary = handle.summary().unwrap();
        assert_eq!(4, summary.teams);
        assert_eq!(SUMMARY_TOP_N, summary.top_attack.len());
        let statistics = summary.statistics.unwrap();
        assert_eq!(12, statistics.matches);
        assert_eq!(24, statistics.observations);
        assert!(statistics.deviance < statistics.null_deviance);

        handle.invalidate();
        assert!(!handle.is_trained());
        assert!(handle.predict("Club America", "Atlas", 5).is_err());
        // models handed out earlier remain usable
        assert_eq!(4, model.params.teams().len());
    }

    #[test]
    fn initialises_once() {
        let mut handle = ModelHandle::default();
        let mut calls = 0;
        for _ in 0..3 {
            handle
                .get_or_try_init(|| {
                    calls += 1;
                    train(&sample_history(), &FitConfig::default())
                })
                .unwrap();
        }
        assert_eq!(1, calls);
    }

    #[test]
    fn failed_initialisation_leaves_handle_untrained() {
        let mut handle = ModelHandle::default();
        let config = FitConfig {
            max_iterations: 1,
            tolerance: 1e-12,
        };
        assert!(matches!(
            handle.train(&sample_history(), &config).unwrap_err(),
            ModelError::Convergence(_)
        ));
        assert!(!handle.is_trained());
    }

    #[test]
    fn installed_parameters() {
        let mut handle = ModelHandle::default();
        handle.install_parameters(two_team_params());
        let prediction = handle.predict("A", "B", 5).unwrap();
        assert_eq!(2.34, (prediction.expected_goals_home * 100.0).round() / 100.0);
        assert!(matches!(
            handle.predict("A", "Z", 5).unwrap_err(),
            ModelError::UnknownTeam(_)
        ));
        let summary = handle.summary().unwrap();
        assert!(summary.statistics.is_none());
        assert_eq!(2, summary.top_defense.len());
        assert_eq!(1.3, summary.home_advantage);
        assert!(handle.trained("inspect").unwrap().fit().is_none());
    }
}
