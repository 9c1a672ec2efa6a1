//! Ordered, immutable set of request headers sent with one probe.
//!
//! Names compare ASCII case-insensitively (as HTTP does) but keep the
//! spelling they were defined with, so what goes on the wire matches the
//! literal. Derived sets (`without`, `only`) are new values.

use anyhow::{bail, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Header name → value pairs in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    /// Empty set ("No headers").
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from literal pairs. A later duplicate name replaces the
    /// earlier value in place.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (k, v) in pairs {
            let (k, v) = (k.into(), v.into());
            match entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&k)) {
                Some(slot) => slot.1 = v,
                None => entries.push((k, v)),
            }
        }
        Self { entries }
    }

    /// Parses `Name: value` lines (e.g. from repeated `-H` flags).
    pub fn parse_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pairs = Vec::new();
        for line in lines {
            let line = line.as_ref();
            let Some((name, value)) = line.split_once(':') else {
                bail!("header must look like 'Name: value', got {:?}", line);
            };
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                bail!("invalid header name in {:?}", line);
            }
            pairs.push((name.to_string(), value.trim().to_string()));
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Header names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Copy of this set minus `name`. Unknown names yield an identical copy.
    pub fn without(&self, name: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| !n.eq_ignore_ascii_case(name))
                .cloned()
                .collect(),
        }
    }

    /// Set holding only `name` (empty when `name` is absent).
    pub fn only(&self, name: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(n, _)| n.eq_ignore_ascii_case(name))
                .cloned()
                .collect(),
        }
    }

    /// Copy of this set with `name` set to `value` (appended if new).
    pub fn with(&self, name: &str, value: &str) -> Self {
        Self::from_pairs(
            self.entries
                .iter()
                .cloned()
                .chain(std::iter::once((name.to_string(), value.to_string()))),
        )
    }

    /// `Name: value` lines as handed to the transport.
    pub fn to_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(n, v)| format!("{}: {}", n, v))
            .collect()
    }
}

// Serialized as a map (`{ Range = "bytes=0-" }` in TOML) with entry order kept.
impl Serialize for HeaderSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (n, v) in &self.entries {
            map.serialize_entry(n, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HeaderSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeaderSetVisitor;

        impl<'de> Visitor<'de> for HeaderSetVisitor {
            type Value = HeaderSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<HeaderSet, A::Error> {
                let mut pairs: Vec<(String, String)> = Vec::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    pairs.push((k, v));
                }
                Ok(HeaderSet::from_pairs(pairs))
            }
        }

        deserializer.deserialize_map(HeaderSetVisitor)
    }
}
