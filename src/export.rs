//! Flat CSV export of fitted parameters, rankings and matchday predictions, and reloading of
//! exported parameters.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, Trim, Writer};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FormatError, LoadError, NotFound};
use crate::params::FittedParameters;
use crate::predict::PredictionResult;
use crate::ranking::RankedTeam;
use crate::team::{TeamId, Teams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ParameterRow {
    team: String,
    attack_coefficient: f64,
    defense_coefficient: f64,
    home_advantage: f64,
}

/// Writes one row per team. The home advantage is repeated on every row.
pub fn write_parameters(writer: impl io::Write, params: &FittedParameters) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(writer);
    for strength in params.iter() {
        writer.serialize(ParameterRow {
            team: strength.team.name.clone(),
            attack_coefficient: strength.attack,
            defense_coefficient: strength.defense,
            home_advantage: params.home_advantage(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_parameters(reader: impl io::Read) -> Result<FittedParameters, FormatError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut rows: Vec<ParameterRow> = vec![];
    let mut home_advantage = None;
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        let row: ParameterRow = record.deserialize(Some(&headers))?;
        match home_advantage {
            None => home_advantage = Some(row.home_advantage),
            Some(expected) if expected.to_bits() != row.home_advantage.to_bits() => {
                return Err(FormatError::InconsistentHomeAdvantage {
                    line,
                    expected,
                    actual: row.home_advantage,
                });
            }
            Some(_) => {}
        }
        for (column, value) in [
            ("attack_coefficient", row.attack_coefficient),
            ("defense_coefficient", row.defense_coefficient),
            ("home_advantage", row.home_advantage),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(FormatError::MalformedField {
                    line,
                    column: column.into(),
                    value: value.to_string(),
                });
            }
        }
        rows.push(row);
    }
    let Some(home_advantage) = home_advantage else {
        return Err(FormatError::Empty);
    };

    rows.sort_by(|a, b| a.team.cmp(&b.team));
    if let Some(pair) = rows.windows(2).find(|pair| pair[0].team == pair[1].team) {
        return Err(FormatError::AmbiguousTeam {
            first: pair[0].team.clone(),
            second: pair[1].team.clone(),
            id: TeamId::from_name(&pair[0].team).to_string(),
        });
    }
    let teams = Teams::from_names(rows.iter().map(|row| row.team.as_str()))?;
    let attack = rows.iter().map(|row| row.attack_coefficient).collect();
    let defense = rows.iter().map(|row| row.defense_coefficient).collect();
    Ok(FittedParameters::new(teams, attack, defense, home_advantage))
}

pub fn save_parameters(path: impl AsRef<Path>, params: &FittedParameters) -> Result<(), csv::Error> {
    let path = path.as_ref();
    write_parameters(File::create(path)?, params)?;
    info!("saved parameters for {} teams to {}", params.teams().len(), path.display());
    Ok(())
}

pub fn load_parameters(path: impl AsRef<Path>) -> Result<FittedParameters, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let params = read_parameters(file).map_err(|err| LoadError::reading(path, err))?;
    info!(
        "loaded parameters for {} teams from {} (home advantage {:.4})",
        params.teams().len(),
        path.display(),
        params.home_advantage()
    );
    Ok(params)
}

#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    rank: usize,
    team: &'a str,
    coefficient: f64,
}

pub fn write_rankings(writer: impl io::Write, ranking: &[RankedTeam]) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(writer);
    for ranked in ranking {
        writer.serialize(RankingRow {
            rank: ranked.rank,
            team: &ranked.name,
            coefficient: ranked.coefficient,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_rankings(path: impl AsRef<Path>, ranking: &[RankedTeam]) -> Result<(), csv::Error> {
    let path = path.as_ref();
    write_rankings(File::create(path)?, ranking)?;
    info!("saved ranking of {} teams to {}", ranking.len(), path.display());
    Ok(())
}

#[derive(Debug, Serialize)]
struct MatchdayRow<'a> {
    home_team: &'a str,
    away_team: &'a str,
    home_win: f64,
    draw: f64,
    away_win: f64,
    most_likely: String,
}

pub fn write_matchday(writer: impl io::Write, predictions: &[PredictionResult]) -> Result<(), csv::Error> {
    let mut writer = Writer::from_writer(writer);
    for prediction in predictions {
        writer.serialize(MatchdayRow {
            home_team: &prediction.home_team.name,
            away_team: &prediction.away_team.name,
            home_win: prediction.home_win,
            draw: prediction.draw,
            away_win: prediction.away_win,
            most_likely: prediction.most_likely.to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_matchday(path: impl AsRef<Path>, predictions: &[PredictionResult]) -> Result<(), csv::Error> {
    let path = path.as_ref();
    write_matchday(File::create(path)?, predictions)?;
    info!("saved {} matchday predictions to {}", predictions.len(), path.display());
    Ok(())
}
