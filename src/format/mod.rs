// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Format templates and value strings.
//!
//! A template is a literal skeleton with identifiers embedded in it:
//! `"Month/Day/Year"` splits into
//! `[Ident("Month"), Literal("/"), Ident("Day"), Literal("/"), Ident("Year")]`.
//! Identifiers are matched against one alternation built from every declared
//! name (plus nickname aliases for the call), each name escaped and longer
//! names tried first, so `"Daylight"` never splits into `"Day"` + `"light"`
//! when both are declared.
//!
//! A value string (`"6/26/2021"`) is then read along that skeleton: every
//! template literal must appear verbatim, and every identifier position
//! takes a number (optional sign, digits, optional fractional part) or one
//! of the nickname labels.

mod nickname;
mod options;

pub use nickname::{Nickname, Nicknames};
pub use options::FormatOptions;

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashSet;

const NUMBER_PATTERN: &str = r"[+-]?[0-9]+(?:\.[0-9]+)?";

// ═══════════════════════════════════════════════════════════════════════════
// Tokens
// ═══════════════════════════════════════════════════════════════════════════

/// A piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Literal(&'a str),
    Ident(&'a str),
}

/// A piece of a value string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueToken<'a> {
    Literal(&'a str),
    Number(&'a str),
    /// A nickname label such as `"Tue."`.
    Label(&'a str),
}

// ═══════════════════════════════════════════════════════════════════════════
// Matchers
// ═══════════════════════════════════════════════════════════════════════════

/// Escaped alternation of literal names, longest first.
fn alternation<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut unique: Vec<&str> = names
        .into_iter()
        .filter(|n| !n.is_empty())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    unique.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    unique.into_iter().map(regex::escape).collect()
}

fn compile(alternatives: &[String]) -> Result<Regex> {
    Regex::new(&format!("(?:{})", alternatives.join("|")))
        .map_err(|e| Error::definition(format!("cannot build the name matcher: {e}")))
}

/// Splits templates into literal and identifier tokens.
#[derive(Debug, Clone)]
pub(crate) struct NameMatcher {
    regex: Option<Regex>,
}

impl NameMatcher {
    pub(crate) fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let alternatives = alternation(names);
        let regex = if alternatives.is_empty() {
            None
        } else {
            Some(compile(&alternatives)?)
        };
        Ok(Self { regex })
    }

    pub(crate) fn split<'t>(&self, template: &'t str) -> Vec<Token<'t>> {
        let Some(regex) = &self.regex else {
            return literal_only(template, Token::Literal);
        };
        let mut tokens = Vec::new();
        let mut cursor = 0;
        for m in regex.find_iter(template) {
            if cursor < m.start() {
                tokens.push(Token::Literal(&template[cursor..m.start()]));
            }
            tokens.push(Token::Ident(m.as_str()));
            cursor = m.end();
        }
        if cursor < template.len() {
            tokens.push(Token::Literal(&template[cursor..]));
        }
        tracing::trace!(template, ?tokens, "split template");
        tokens
    }
}

/// Reads value strings along the literal skeleton of a template.
///
/// Literals are matched verbatim, so a template literal may itself contain
/// digits or nickname labels (`"Hour:Minute UTC+1"`). Each identifier
/// position takes the longest nickname label or the number found there.
#[derive(Debug, Clone)]
pub(crate) struct ValueMatcher {
    regex: Regex,
    labels: HashSet<String>,
}

impl ValueMatcher {
    pub(crate) fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let labels: HashSet<String> = labels.into_iter().map(str::to_owned).collect();
        let mut alternatives = alternation(labels.iter().map(String::as_str));
        alternatives.push(NUMBER_PATTERN.to_owned());
        let regex = Regex::new(&format!("^(?:{})", alternatives.join("|")))
            .map_err(|e| Error::definition(format!("cannot build the value matcher: {e}")))?;
        Ok(Self { regex, labels })
    }

    /// Split `text` into one value token per template token.
    ///
    /// Returns a human-readable reason when `text` does not follow the
    /// skeleton of `template`.
    pub(crate) fn split<'t>(
        &self,
        template: &[Token<'_>],
        text: &'t str,
    ) -> std::result::Result<Vec<ValueToken<'t>>, String> {
        let mut tokens = Vec::with_capacity(template.len());
        let mut cursor = 0;
        for (position, expected) in template.iter().enumerate() {
            let rest = &text[cursor..];
            match expected {
                Token::Literal(literal) => {
                    if !rest.starts_with(literal) {
                        return Err(format!(
                            "part {position} should be the literal \"{literal}\", found \"{rest}\""
                        ));
                    }
                    tokens.push(ValueToken::Literal(&rest[..literal.len()]));
                    cursor += literal.len();
                }
                Token::Ident(name) => {
                    let Some(m) = self.regex.find(rest) else {
                        return Err(format!(
                            "\"{rest}\" at part {position} does not start with a value for \"{name}\""
                        ));
                    };
                    let piece = m.as_str();
                    tokens.push(if self.labels.contains(piece) {
                        ValueToken::Label(piece)
                    } else {
                        ValueToken::Number(piece)
                    });
                    cursor += m.end();
                }
            }
        }
        if cursor < text.len() {
            return Err(format!("unexpected trailing \"{}\"", &text[cursor..]));
        }
        tracing::trace!(text, ?tokens, "split value string");
        Ok(tokens)
    }
}

fn literal_only<'t, T>(text: &'t str, wrap: impl Fn(&'t str) -> T) -> Vec<T> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![wrap(text)]
    }
}

/// Number of leading `-` characters.
pub(crate) fn leading_minus(text: &str) -> usize {
    text.chars().take_while(|&c| c == '-').count()
}
