// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Nickname tables: alternate display vocabulary.
//!
//! A nickname is an alias usable in a template in place of a unit or
//! division name (`"mn"` for `Month`), optionally with labels for the
//! values (`0 → "Jan."`, `1 → "Feb."`, ...). Label indices are always
//! zero-based, even for names formatted one-based.
//!
//! Nicknames are supplied per call and never stored on a compiled system.
//!
//! ```
//! use horolog::{Nickname, Nicknames};
//!
//! let nicknames = Nicknames::new().with(
//!     "wk",
//!     Nickname::new("Week").with_labels(["Sun.", "Mon.", "Tue.", "Wed.", "Thu.", "Fri.", "Sat."]),
//! );
//! let wk = nicknames.get("wk").unwrap();
//! assert_eq!(wk.canonical(), "Week");
//! assert_eq!(wk.label(2), Some("Tue."));
//! assert_eq!(wk.index_of("Sat."), Some(6));
//! ```

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Alias target plus optional index → label table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Nickname {
    canonical: String,
    labels: BTreeMap<usize, String>,
}

impl Nickname {
    pub fn new(canonical: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Label the zero-based value `index`.
    pub fn with_label(mut self, index: usize, label: impl Into<String>) -> Self {
        self.labels.insert(index, label.into());
        self
    }

    /// Label values `0, 1, 2, ...` in order.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().enumerate().map(|(i, l)| (i, l.into())));
        self
    }

    /// Name of the unit or division this alias stands for.
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .find_map(|(i, l)| (l == label).then_some(*i))
    }

    pub fn labels(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().map(|(i, l)| (*i, l.as_str()))
    }
}

/// Alias key → [`Nickname`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Nicknames(BTreeMap<String, Nickname>);

impl Nicknames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, alias: impl Into<String>, nickname: Nickname) -> Self {
        self.insert(alias, nickname);
        self
    }

    pub fn insert(&mut self, alias: impl Into<String>, nickname: Nickname) -> Option<Nickname> {
        self.0.insert(alias.into(), nickname)
    }

    pub fn get(&self, alias: &str) -> Option<&Nickname> {
        self.0.get(alias)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every label of every alias.
    pub fn all_labels(&self) -> impl Iterator<Item = &str> {
        self.0.values().flat_map(|n| n.labels.values().map(String::as_str))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_labels() {
        let nick = Nickname::new("Month").with_label(0, "January").with_label(11, "December");
        assert_eq!(nick.label(11), Some("December"));
        assert_eq!(nick.label(5), None);
        assert_eq!(nick.index_of("January"), Some(0));
        assert_eq!(nick.index_of("june"), None);
    }

    #[test]
    fn test_all_labels_spans_aliases() {
        let nicknames = Nicknames::new()
            .with("wk", Nickname::new("Week").with_labels(["Sun.", "Mon."]))
            .with("yr", Nickname::new("Year"));
        let mut labels: Vec<&str> = nicknames.all_labels().collect();
        labels.sort_unstable();
        assert_eq!(labels, ["Mon.", "Sun."]);
        assert_eq!(nicknames.aliases().collect::<Vec<_>>(), ["wk", "yr"]);
    }
}
