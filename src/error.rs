// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error type shared by every fallible operation of the crate.
//!
//! All failures are synchronous precondition violations: the call is
//! aborted and nothing is partially committed.

use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of named item a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Unit,
    Exception,
    ExactDivision,
    RepeatingDivision,
    /// Any name accepted in a format template.
    Identifier,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::Unit => "unit",
            ItemKind::Exception => "exception",
            ItemKind::ExactDivision => "exact division",
            ItemKind::RepeatingDivision => "repeating division",
            ItemKind::Identifier => "identifier",
        };
        f.write_str(label)
    }
}

/// Errors raised while declaring, compiling or querying a time system.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The declared system is malformed (duplicate names, bad factors,
    /// broken hierarchy, missing division corrections, ...).
    #[error("invalid time system definition: {0}")]
    Definition(String),

    /// A name used in a query is not declared in the system.
    #[error("there is no {kind} named \"{name}\"")]
    Lookup { kind: ItemKind, name: String },

    /// A value string does not follow the literal skeleton of its template.
    #[error("\"{text}\" does not match the format \"{template}\": {reason}")]
    FormatMismatch {
        template: String,
        text: String,
        reason: String,
    },

    /// The same identifier was given two different values in one string.
    #[error("\"{name}\" is specified more than once with different values")]
    Consistency { name: String },

    /// An input value is not an accepted numeric representation.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A division index read from a value string is outside its label list.
    #[error("index {index} is out of range for division \"{division}\" ({len} subdivisions)")]
    IndexOutOfRange {
        division: String,
        index: i64,
        len: usize,
    },
}

impl Error {
    pub(crate) fn definition(msg: impl Into<String>) -> Self {
        Error::Definition(msg.into())
    }

    pub(crate) fn lookup(kind: ItemKind, name: impl Into<String>) -> Self {
        Error::Lookup {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn mismatch(template: &str, text: &str, reason: impl Into<String>) -> Self {
        Error::FormatMismatch {
            template: template.to_owned(),
            text: text.to_owned(),
            reason: reason.into(),
        }
    }
}
