use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

#[derive(Clone, Debug, PartialEq)]
enum Requirement {
    Exists(String),
    NotExists(String),
    Equals(String, String),
    NotEquals(String, String),
}

impl Requirement {
    fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Requirement::Exists(key) => labels.contains_key(key),
            Requirement::NotExists(key) => !labels.contains_key(key),
            Requirement::Equals(key, value) => labels.get(key) == Some(value),
            Requirement::NotEquals(key, value) => labels.get(key) != Some(value),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct InvalidSelector(String);

impl Display for InvalidSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid label selector requirement {:?}", self.0)
    }
}

/// Equality based label selector, e.g. `app=web,tier!=backend,!canary`.
///
/// Set based requirements (`in`, `notin`) are not supported.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelSelector(Vec<Requirement>);

impl LabelSelector {
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.0.iter().all(|requirement| requirement.matches(labels))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(|c: char| c.is_whitespace() || "!=(),".contains(c))
}

fn parse_requirement(text: &str) -> Result<Requirement, InvalidSelector> {
    let invalid = || InvalidSelector(text.to_string());

    let requirement = if let Some(key) = text.strip_prefix('!') {
        Requirement::NotExists(key.trim().to_string())
    } else if let Some((key, value)) = text.split_once("!=") {
        Requirement::NotEquals(key.trim().to_string(), value.trim().to_string())
    } else if let Some((key, value)) = text.split_once("==").or_else(|| text.split_once('=')) {
        Requirement::Equals(key.trim().to_string(), value.trim().to_string())
    } else {
        Requirement::Exists(text.to_string())
    };

    let (key, value) = match &requirement {
        Requirement::Exists(key) | Requirement::NotExists(key) => (key, None),
        Requirement::Equals(key, value) | Requirement::NotEquals(key, value) => {
            (key, Some(value))
        }
    };

    if !valid_key(key) {
        return Err(invalid());
    }
    if let Some(value) = value {
        if value.contains(|c: char| c.is_whitespace() || "!=(),".contains(c)) {
            return Err(invalid());
        }
    }

    Ok(requirement)
}

impl FromStr for LabelSelector {
    type Err = InvalidSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(parse_requirement)
            .collect::<Result<Vec<_>, _>>()
            .map(LabelSelector)
    }
}

impl<'de> Deserialize<'de> for LabelSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
