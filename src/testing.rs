//! Testing helpers and fixtures.

use assert_float_eq::*;

use crate::data::{read_history, History, HistoryColumns};
use crate::params::FittedParameters;
use crate::team::Teams;

/// A double round-robin between four teams, one of which (Club America) dominates.
pub const SAMPLE_HISTORY_CSV: &str = "\
season,date,home_team,away_team,home_goals,away_goals
2023,2023-08-05,Atlas,Club America,1,2
2023,2023-08-05,Cruz Azul,Toluca,2,1
2023,2023-08-12,Club America,Cruz Azul,3,1
2023,2023-08-12,Toluca,Atlas,2,0
2023,2023-08-19,Atlas,Cruz Azul,1,1
2023,2023-08-19,Club America,Toluca,2,0
2023,2023-08-26,Club America,Atlas,4,1
2023,2023-08-26,Toluca,Cruz Azul,1,1
2023,2023-09-02,Cruz Azul,Club America,0,2
2023,2023-09-02,Atlas,Toluca,0,1
2023,2023-09-09,Cruz Azul,Atlas,2,1
2023,2023-09-09,Toluca,Club America,1,3
";

pub fn sample_history() -> History {
    read_history(SAMPLE_HISTORY_CSV.as_bytes(), &HistoryColumns::default()).unwrap()
}

/// Two teams, A and B, with hand-picked strengths.
pub fn two_team_params() -> FittedParameters {
    FittedParameters::new(
        Teams::from_names(["A", "B"]).unwrap(),
        vec![1.5, 0.8],
        vec![0.9, 1.2],
        1.3,
    )
}

pub fn assert_slice_f64_relative(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        let actual = actual[index];
        if actual != expected {
            assert_float_relative_eq!(expected, actual, epsilon);
        }
    }
}

pub fn assert_slice_f64_absolute(expected: &[f64], actual: &[f64], epsilon: f64) {
    assert_eq!(
        expected.len(),
        actual.len(),
        "lengths do not match: {} ≠ {}",
        expected.len(),
        actual.len()
    );
    for (index, &expected) in expected.iter().enumerate() {
        assert_float_absolute_eq!(expected, actual[index], epsilon);
    }
}
