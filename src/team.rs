//! Team identifiers and the registry of teams observed in training data.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{FormatError, UnknownTeam};

/// Normalised identifier of a team, derived from its display name. Whitespace and hyphens become
/// underscores; periods and any other non-word characters are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(String);
impl TeamId {
    pub fn from_name(name: &str) -> Self {
        let normalised = name
            .trim()
            .chars()
            .filter_map(|c| match c {
                ' ' | '-' => Some('_'),
                c if c.is_alphanumeric() || c == '_' => Some(c),
                _ => None,
            })
            .collect();
        Self(normalised)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TeamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

/// The ordered set of teams a model is trained on. Teams are sorted by display name and each is
/// addressed by its ordinal, which doubles as the column offset of its coefficients.
#[derive(Debug, Clone, Default)]
pub struct Teams {
    entries: Vec<Team>,
    ordinals: FxHashMap<TeamId, usize>,
}
impl Teams {
    /// Builds the registry from display names, which may repeat. Fails if two distinct names
    /// normalise to the same identifier.
    pub fn from_names<I>(names: I) -> Result<Self, FormatError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let names: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .collect();
        let mut entries = Vec::with_capacity(names.len());
        let mut ordinals =
            FxHashMap::with_capacity_and_hasher(names.len(), Default::default());
        for name in names {
            let id = TeamId::from_name(&name);
            if let Some(&existing) = ordinals.get(&id) {
                let existing: &Team = &entries[existing];
                return Err(FormatError::AmbiguousTeam {
                    first: existing.name.clone(),
                    second: name,
                    id: id.to_string(),
                });
            }
            ordinals.insert(id.clone(), entries.len());
            entries.push(Team { id, name });
        }
        Ok(Self { entries, ordinals })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.entries.iter()
    }

    pub fn get(&self, ordinal: usize) -> &Team {
        &self.entries[ordinal]
    }

    pub fn ordinal(&self, id: &TeamId) -> Option<usize> {
        self.ordinals.get(id).copied()
    }

    pub fn contains(&self, id: &TeamId) -> bool {
        self.ordinals.contains_key(id)
    }

    /// Locates a team by its display name or identifier.
    pub fn resolve(&self, name_or_id: &str) -> Result<usize, UnknownTeam> {
        self.ordinal(&TeamId::from_name(name_or_id))
            .ok_or_else(|| self.unknown(name_or_id))
    }

    pub fn unknown(&self, team: &str) -> UnknownTeam {
        UnknownTeam {
            team: team.to_string(),
            available: self.entries.iter().map(|team| team.name.clone()).collect(),
        }
    }
}

impl PartialEq for Teams {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalise() {
        assert_eq!("Club_America", TeamId::from_name("Club America").as_str());
        assert_eq!("Tigres_UANL", TeamId::from_name(" Tigres UANL ").as_str());
        assert_eq!("St_Pauli", TeamId::from_name("St. Pauli").as_str());
        assert_eq!("Leon_FC", TeamId::from_name("Leon-FC").as_str());
        assert_eq!("Querétaro", TeamId::from_name("Querétaro!").as_str());
    }

    #[test]
    fn registry_is_sorted_and_deduplicated() {
        let teams = Teams::from_names(["Toluca", "Atlas", "Toluca", "Club America"]).unwrap();
        let names: Vec<_> = teams.iter().map(|team| team.name.as_str()).collect();
        assert_eq!(vec!["Atlas", "Club America", "Toluca"], names);
        assert_eq!(Some(1), teams.ordinal(&TeamId::from_name("Club America")));
    }

    #[test]
    fn resolve_by_name_or_id() {
        let teams = Teams::from_names(["Club America", "Cruz Azul"]).unwrap();
        assert_eq!(Ok(0), teams.resolve("Club America"));
        assert_eq!(Ok(0), teams.resolve("Club_America"));
        let err = teams.resolve("Pumas").unwrap_err();
        assert_eq!("Pumas", err.team);
        assert_eq!(vec!["Club America", "Cruz Azul"], err.available);
    }

    #[test]
    fn colliding_names_are_rejected() {
        let err = Teams::from_names(["St. Pauli", "St Pauli"]).unwrap_err();
        assert!(
            matches!(err, FormatError::AmbiguousTeam { ref id, .. } if id == "St_Pauli"),
            "{err:?}"
        );
    }
}
