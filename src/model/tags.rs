use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// A set of tags attached to targets, e.g. the discovery source. Tags take
/// part in a target's hash, but not in its identity.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Tags(BTreeSet<String>);

impl Tags {
    /// Parses whitespace separated tags.
    pub fn parse(line: &str) -> Self {
        Tags(line.split_whitespace().map(ToString::to_string).collect())
    }

    pub fn merge(&mut self, other: &Tags) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        self.0.insert(tag.into());
    }

    #[inline]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for Tags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for tag in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(tag)?;
            first = false;
        }

        Ok(())
    }
}

impl FromStr for Tags {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Tags::parse(s))
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let line = String::deserialize(deserializer)?;
        Ok(Tags::parse(&line))
    }
}
