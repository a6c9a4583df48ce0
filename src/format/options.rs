// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Per-call formatting options.

use super::Nicknames;
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options shared by [`TimeSystem::base_to_format`](crate::TimeSystem::base_to_format)
/// and [`TimeSystem::format_to_base`](crate::TimeSystem::format_to_base).
///
/// # Examples
///
/// ```
/// use horolog::FormatOptions;
///
/// let options = FormatOptions::new()
///     .one_based(["Month", "Day"])
///     .neg_template("Month/Day/Year BC");
/// assert!(options.is_one_based("Day"));
/// assert!(!options.is_one_based("Year"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormatOptions {
    one_based: BTreeSet<String>,
    nicknames: Nicknames,
    neg_template: Option<String>,
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Units and divisions whose displayed values start at 1.
    pub fn one_based<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_based.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn nicknames(mut self, nicknames: Nicknames) -> Self {
        self.nicknames = nicknames;
        self
    }

    /// Alternate template used for (and recognising) negative values.
    ///
    /// Without one, negative values are written with a leading `-`.
    pub fn neg_template(mut self, template: impl Into<String>) -> Self {
        self.neg_template = Some(template.into());
        self
    }

    #[inline]
    pub fn is_one_based(&self, name: &str) -> bool {
        self.one_based.contains(name)
    }

    #[inline]
    pub fn nickname_table(&self) -> &Nicknames {
        &self.nicknames
    }

    #[inline]
    pub fn negative_template(&self) -> Option<&str> {
        self.neg_template.as_deref()
    }
}
