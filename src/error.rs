//! Error taxonomy. Each concern has its own type; [`ModelError`] unifies them for callers that
//! drive the whole pipeline.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0}")]
    NotFound(#[from] NotFound),

    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("{0}")]
    UnknownTeam(#[from] UnknownTeam),

    #[error("{0}")]
    Convergence(#[from] ConvergenceError),

    #[error("{0}")]
    Untrained(#[from] UntrainedModel),

    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

/// Failure to load a tabular source: either it could not be read at all, or its contents are
/// not in the expected shape.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{0}")]
    NotFound(#[from] NotFound),

    #[error("{0}")]
    Format(#[from] FormatError),
}

impl LoadError {
    /// Attributes a failure to read the contents of `path`. An I/O failure mid-read means the
    /// source is unreadable, not malformed.
    pub(crate) fn reading(path: &Path, err: FormatError) -> Self {
        match err {
            FormatError::Csv(err) if err.is_io_error() => NotFound {
                path: path.to_path_buf(),
                source: io::Error::from(err),
            }
            .into(),
            err => err.into(),
        }
    }
}

impl From<LoadError> for ModelError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(err) => ModelError::NotFound(err),
            LoadError::Format(err) => ModelError::Format(err),
        }
    }
}

/// The data source could not be opened or read.
#[derive(Debug, Error)]
#[error("cannot read {}: {source}", path.display())]
pub struct NotFound {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("malformed {column} {value:?} on line {line}")]
    MalformedField {
        line: u64,
        column: String,
        value: String,
    },

    #[error("team names {first:?} and {second:?} both normalise to {id}")]
    AmbiguousTeam {
        first: String,
        second: String,
        id: String,
    },

    #[error("inconsistent home advantage on line {line}: expected {expected}, got {actual}")]
    InconsistentHomeAdvantage {
        line: u64,
        expected: f64,
        actual: f64,
    },

    #[error("no records")]
    Empty,

    #[error("{0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown team {team:?}; available teams: {}", available.join(", "))]
pub struct UnknownTeam {
    pub team: String,
    pub available: Vec<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConvergenceError {
    #[error("no observations to fit")]
    NoObservations,

    #[error("no regressors to fit")]
    NoRegressors,

    #[error("deviance became non-finite at iteration {iteration}")]
    Diverged { iteration: u64 },

    #[error("no convergence after {iterations} iterations (relative deviance change {change:e})")]
    IterationLimit { iterations: u64, change: f64 },
}

/// An operation that needs fitted parameters was invoked before any were installed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot {operation}: the model has not been trained")]
pub struct UntrainedModel {
    pub operation: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_are_named() {
        let err = FormatError::MissingColumns(vec!["date".into(), "home_goals".into()]);
        assert_eq!("missing required columns: date, home_goals", err.to_string());
    }

    #[test]
    fn unknown_team_lists_alternatives() {
        let err = UnknownTeam {
            team: "Atlante".into(),
            available: vec!["Atlas".into(), "Toluca".into()],
        };
        assert_eq!(
            r#"unknown team "Atlante"; available teams: Atlas, Toluca"#,
            err.to_string()
        );
    }

    #[test]
    fn umbrella_preserves_message() {
        let err = ModelError::from(UntrainedModel { operation: "predict" });
        assert_eq!("cannot predict: the model has not been trained", err.to_string());
        assert!(matches!(err, ModelError::Untrained(_)));
    }
}
