//! Loading of historical results and their expansion into a regression design table.

use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::{FormatError, LoadError, NotFound, UnknownTeam};
use crate::team::{TeamId, Teams};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Header names of the six required columns of a history file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryColumns {
    pub season: String,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: String,
    pub away_goals: String,
}
impl HistoryColumns {
    pub fn spanish() -> Self {
        Self {
            season: "Temporada".into(),
            date: "Fecha".into(),
            home_team: "Equipo_Local".into(),
            away_team: "Equipo_Visitante".into(),
            home_goals: "Goles_Local".into(),
            away_goals: "Goles_Visitante".into(),
        }
    }

    fn required(&self) -> [&str; 6] {
        [
            &self.season,
            &self.date,
            &self.home_team,
            &self.away_team,
            &self.home_goals,
            &self.away_goals,
        ]
    }
}

impl Default for HistoryColumns {
    fn default() -> Self {
        Self {
            season: "season".into(),
            date: "date".into(),
            home_team: "home_team".into(),
            away_team: "away_team".into(),
            home_goals: "home_goals".into(),
            away_goals: "away_goals".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub season: String,
    pub date: NaiveDate,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_goals: u8,
    pub away_goals: u8,
}

/// Matches in source order, along with every team that appears in them.
#[derive(Debug, Clone)]
pub struct History {
    pub records: Vec<MatchRecord>,
    pub teams: Teams,
}
impl History {
    pub fn seasons(&self) -> usize {
        self.records
            .iter()
            .map(|record| record.season.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

pub fn load_history(path: impl AsRef<Path>, columns: &HistoryColumns) -> Result<History, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let history = read_history(file, columns).map_err(|err| LoadError::reading(path, err))?;
    info!(
        "loaded {} matches from {} ({} seasons, {} teams)",
        history.records.len(),
        path.display(),
        history.seasons(),
        history.teams.len()
    );
    Ok(history)
}

pub fn read_history(reader: impl io::Read, columns: &HistoryColumns) -> Result<History, FormatError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let layout = ColumnLayout::locate(&headers, columns)?;

    let mut rows = vec![];
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        rows.push(layout.parse(&record, line, columns)?);
    }
    if rows.is_empty() {
        return Err(FormatError::Empty);
    }

    let teams = Teams::from_names(
        rows.iter()
            .flat_map(|row| [row.home_team.as_str(), row.away_team.as_str()]),
    )?;
    for (ordinal, team) in teams.iter().enumerate() {
        debug!("team {}: {} ({})", ordinal + 1, team.name, team.id);
    }

    let records = rows
        .into_iter()
        .map(|row| MatchRecord {
            season: row.season,
            date: row.date,
            home_team: TeamId::from_name(&row.home_team),
            away_team: TeamId::from_name(&row.away_team),
            home_goals: row.home_goals,
            away_goals: row.away_goals,
        })
        .collect();
    Ok(History { records, teams })
}

struct RawRow {
    season: String,
    date: NaiveDate,
    home_team: String,
    away_team: String,
    home_goals: u8,
    away_goals: u8,
}

struct ColumnLayout {
    indexes: [usize; 6],
}
impl ColumnLayout {
    fn locate(headers: &StringRecord, columns: &HistoryColumns) -> Result<Self, FormatError> {
        let mut indexes = [0; 6];
        let mut missing = vec![];
        for (slot, name) in columns.required().into_iter().enumerate() {
            match headers.iter().position(|header| header == name) {
                None => missing.push(name.to_string()),
                Some(index) => indexes[slot] = index,
            }
        }
        if !missing.is_empty() {
            return Err(FormatError::MissingColumns(missing));
        }
        Ok(Self { indexes })
    }

    fn parse(&self, record: &StringRecord, line: u64, columns: &HistoryColumns) -> Result<RawRow, FormatError> {
        let names = columns.required();
        let field = |slot: usize| record.get(self.indexes[slot]).unwrap_or_default();
        let malformed = |slot: usize| FormatError::MalformedField {
            line,
            column: names[slot].to_string(),
            value: field(slot).to_string(),
        };
        let team = |slot: usize| {
            let name = field(slot);
            if TeamId::from_name(name).as_str().is_empty() {
                Err(malformed(slot))
            } else {
                Ok(name.to_string())
            }
        };
        let goals = |slot: usize| field(slot).parse::<u8>().map_err(|_| malformed(slot));

        Ok(RawRow {
            season: field(0).to_string(),
            date: parse_date(field(1)).ok_or_else(|| malformed(1))?,
            home_team: team(2)?,
            away_team: team(3)?,
            home_goals: goals(4)?,
            away_goals: goals(5)?,
        })
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// One goal-count observation: the `attack` team scored `goals` against the `defense` team.
/// Teams are given by their ordinal in the [`Teams`] registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignRow {
    pub goals: u8,
    pub attack: usize,
    pub defense: usize,
    pub is_home: bool,
}

/// Expands each match into two observations: the home side's goals, then the away side's.
pub fn build_design_table(records: &[MatchRecord], teams: &Teams) -> Result<Vec<DesignRow>, UnknownTeam> {
    let ordinal = |id: &TeamId| teams.ordinal(id).ok_or_else(|| teams.unknown(id.as_str()));
    let mut table = Vec::with_capacity(records.len() * 2);
    for record in records {
        let (home, away) = (ordinal(&record.home_team)?, ordinal(&record.away_team)?);
        table.push(DesignRow {
            goals: record.home_goals,
            attack: home,
            defense: away,
            is_home: true,
        });
        table.push(DesignRow {
            goals: record.away_goals,
            attack: away,
            defense: home,
            is_home: false,
        });
    }
    debug!(
        "prepared {} observations from {} matches",
        table.len(),
        records.len()
    );
    Ok(table)
}
