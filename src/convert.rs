// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Conversions between base-unit values and formatted strings.
//!
//! | Direction        | Entry point                         |
//! |------------------|-------------------------------------|
//! | base → string    | [`TimeSystem::base_to_format`]      |
//! | string → base    | [`TimeSystem::format_to_base`]      |
//!
//! ## Formatting
//!
//! Units named in the template are peeled off largest first: each one takes
//! the whole number of its own size out of what the larger ones left over,
//! so `"Year:Day:Second"` gives days within the year and seconds within the
//! day. Divisions are located on the full value. When an exact division and
//! the unit it is counted in both appear, the unit is reported relative to
//! the start of the subdivision (day of the month rather than of the year).
//!
//! ## Parsing
//!
//! Units specified in the string are summed in base units. Exact divisions
//! then add the length of the subdivisions before the requested one (for the
//! dividing unit instance just computed) and repeating divisions shift the
//! total onto the requested slot. Everything finer than the smallest unit
//! involved is copied from the caller's `original` value, which makes a
//! template like `"Day"` a partial update of an existing date.
//!
//! ## Negative values
//!
//! Negative values are formatted from their magnitude, with the negative
//! template when one is configured and with a leading `-` otherwise. Parsing
//! reverses either convention.

use crate::division::{checked_index, Division};
use crate::error::{Error, ItemKind, Result};
use crate::format::{leading_minus, FormatOptions, Nickname, Token, ValueMatcher, ValueToken};
use crate::system::{Entry, TimeSystem};
use crate::unit::UnitId;
use crate::value::{self, parse_value, IntoValue, Value};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use std::collections::{BTreeMap, HashMap};

/// A template identifier resolved against the system and the nicknames.
#[derive(Debug, Clone, Copy)]
struct Resolved<'a> {
    canonical: &'a str,
    entry: Entry,
    nickname: Option<&'a Nickname>,
}

/// What a value string supplied for one identifier.
enum Given {
    /// Zero-based index, from a nickname label.
    Index(usize),
    Number(Value),
}

impl TimeSystem {
    fn resolve<'a>(&'a self, ident: &'a str, options: &'a FormatOptions) -> Result<Resolved<'a>> {
        let (canonical, nickname) = match options.nickname_table().get(ident) {
            Some(nick) => (nick.canonical(), Some(nick)),
            None => (ident, None),
        };
        let entry = self
            .entry(canonical)
            .ok_or_else(|| Error::lookup(ItemKind::Identifier, canonical))?;
        Ok(Resolved {
            canonical,
            entry,
            nickname,
        })
    }

    fn unit_size(&self, id: UnitId) -> Value {
        self.units.size(id)
    }

    // ═══════════════════════════════════════════════════════════════════
    // base → string
    // ═══════════════════════════════════════════════════════════════════

    /// Render `value` (in base units) through `template`.
    ///
    /// # Examples
    ///
    /// ```
    /// use horolog::{FormatOptions, TimeSystemBuilder};
    ///
    /// let mut builder = TimeSystemBuilder::new("Clock");
    /// builder
    ///     .add_base_unit("Second")?
    ///     .add_unit("Minute", 60, Some("Second"))?
    ///     .add_unit("Hour", 60, Some("Minute"))?;
    /// let clock = builder.compile()?;
    ///
    /// let options = FormatOptions::new();
    /// assert_eq!(clock.base_to_format(3725, "Hour:Minute:Second", &options)?, "1:2:5");
    /// assert_eq!(clock.base_to_format(3725, "Minute", &options)?, "62");
    /// assert_eq!(clock.base_to_format(-3725, "Hour:Minute:Second", &options)?, "-1:2:5");
    /// # Ok::<(), horolog::Error>(())
    /// ```
    pub fn base_to_format(
        &self,
        value: impl IntoValue,
        template: &str,
        options: &FormatOptions,
    ) -> Result<String> {
        let value = value.into_value()?;
        let negative = value.is_negative();
        let t = value.abs();
        let template = match (negative, options.negative_template()) {
            (true, Some(neg)) => neg,
            _ => template,
        };

        let tokens = self.tokenize(template, options.nickname_table())?;
        let mut idents: Vec<Resolved<'_>> = Vec::new();
        for token in &tokens {
            if let Token::Ident(name) = token {
                let resolved = self.resolve(name, options)?;
                if !idents.iter().any(|r| r.canonical == resolved.canonical) {
                    idents.push(resolved);
                }
            }
        }

        let mut values: HashMap<&str, BigInt> = HashMap::new();
        let offset = |name: &str| BigInt::from(u8::from(options.is_one_based(name)));

        // Units, largest first.
        let mut units: Vec<(&str, UnitId)> = idents
            .iter()
            .filter_map(|r| match r.entry {
                Entry::Unit(id) => Some((r.canonical, id)),
                _ => None,
            })
            .collect();
        units.sort_by_key(|(_, id)| std::cmp::Reverse(self.unit_size(*id)));
        let mut current = t.clone();
        for (name, id) in units {
            let remainder = value::modulo(&current, &self.unit_size(id));
            let whole = value::floor_int(&self.units.from_base(id, &(&current - &remainder)));
            values.insert(name, whole + offset(name));
            current = remainder;
        }

        // Divisions, located on the full value.
        for r in &idents {
            match r.entry {
                Entry::Exact(i) => {
                    let division = &self.exact[i];
                    let slot = division.locate(&self.units, &self.exceptions, &t);
                    values.insert(r.canonical, BigInt::from(slot.index) + offset(r.canonical));
                    let into = division.dividing_into_unit();
                    let into_name = self.units.get(into).name();
                    if let Some(count) = values.get_mut(into_name) {
                        *count -= value::floor_int(&self.units.from_base(into, &slot.consumed));
                    }
                }
                Entry::Repeating(i) => {
                    let index = self.repeating[i].locate(&self.units, &t);
                    values.insert(r.canonical, BigInt::from(index) + offset(r.canonical));
                }
                Entry::Unit(_) => {}
            }
        }

        let mut out = String::with_capacity(template.len());
        if negative && options.negative_template().is_none() {
            out.push('-');
        }
        for token in &tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Ident(name) => {
                    let r = self.resolve(name, options)?;
                    let shown = &values[r.canonical];
                    let label = r.nickname.and_then(|nick| {
                        let zero_based = shown - offset(r.canonical);
                        usize::try_from(&zero_based).ok().and_then(|i| nick.label(i))
                    });
                    match label {
                        Some(label) => out.push_str(label),
                        None => out.push_str(&shown.to_string()),
                    }
                }
            }
        }
        tracing::trace!(%value, template, formatted = %out, "formatted value");
        Ok(out)
    }

    // ═══════════════════════════════════════════════════════════════════
    // string → base
    // ═══════════════════════════════════════════════════════════════════

    /// Parse `text` written in `template` back into base units.
    ///
    /// Anything finer than the smallest unit or division named in the
    /// template is taken from `original`. A template without identifiers
    /// returns `original` unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use horolog::{FormatOptions, TimeSystemBuilder, Value};
    ///
    /// let mut builder = TimeSystemBuilder::new("Clock");
    /// builder
    ///     .add_base_unit("Second")?
    ///     .add_unit("Minute", 60, Some("Second"))?
    ///     .add_unit("Hour", 60, Some("Minute"))?;
    /// let clock = builder.compile()?;
    ///
    /// let options = FormatOptions::new();
    /// let t = clock.format_to_base("1:2", "Hour:Minute", 59, &options)?;
    /// assert_eq!(t, Value::from_integer(3779.into()));
    /// # Ok::<(), horolog::Error>(())
    /// ```
    pub fn format_to_base(
        &self,
        text: &str,
        template: &str,
        original: impl IntoValue,
        options: &FormatOptions,
    ) -> Result<Value> {
        let original = original.into_value()?;
        let matcher = ValueMatcher::new(options.nickname_table().all_labels())?;
        let (negative, template, text) = self.pick_template(text, template, options, &matcher)?;

        let tokens = self.tokenize(template, options.nickname_table())?;
        let given = matcher
            .split(&tokens, text)
            .map_err(|reason| Error::mismatch(template, text, reason))?;

        let mut unit_amounts: BTreeMap<UnitId, Value> = BTreeMap::new();
        let mut exact: Vec<(usize, usize)> = Vec::new();
        let mut repeating: Vec<(usize, usize)> = Vec::new();

        for (token, piece) in tokens.iter().zip(&given) {
            let Token::Ident(ident) = token else {
                continue;
            };
            let r = self.resolve(ident, options)?;
            let supplied = match piece {
                ValueToken::Label(label) => r
                    .nickname
                    .and_then(|nick| nick.index_of(label))
                    .map(Given::Index)
                    .ok_or_else(|| {
                        Error::mismatch(
                            template,
                            text,
                            format!("\"{label}\" is not a label of \"{ident}\""),
                        )
                    })?,
                ValueToken::Number(number) => Given::Number(parse_value(number)?),
                ValueToken::Literal(_) => continue,
            };
            let one_based = options.is_one_based(r.canonical);

            match r.entry {
                Entry::Unit(id) => {
                    let amount = match supplied {
                        Given::Index(index) => Value::from_integer(BigInt::from(index)),
                        Given::Number(v) if one_based => v - value::one(),
                        Given::Number(v) => v,
                    };
                    let in_base = self.units.to_base(id, &amount);
                    match unit_amounts.get(&id) {
                        Some(previous) if *previous != in_base => {
                            return Err(Error::Consistency {
                                name: r.canonical.to_owned(),
                            });
                        }
                        Some(_) => {}
                        None => {
                            unit_amounts.insert(id, in_base);
                        }
                    }
                }
                Entry::Exact(i) => {
                    let index = division_index(&self.exact[i], supplied, one_based, template, text)?;
                    record_index(&mut exact, i, index, r.canonical)?;
                }
                Entry::Repeating(i) => {
                    let index = division_index(&self.repeating[i], supplied, one_based, template, text)?;
                    record_index(&mut repeating, i, index, r.canonical)?;
                }
            }
        }

        let mut used: Vec<UnitId> = unit_amounts.keys().copied().collect();
        let provisional = unit_amounts.values().fold(Value::zero(), |acc, v| acc + v);
        let mut total = provisional.clone();

        for &(i, index) in &exact {
            let division = &self.exact[i];
            total += division.preceding(&self.units, &self.exceptions, &provisional, index);
            used.push(division.dividing_into_unit());
        }
        for &(i, index) in &repeating {
            let division = &self.repeating[i];
            total += division.realign(&self.units, &total, index);
            used.push(division.unit_in());
        }

        let Some(finest) = used.into_iter().min_by_key(|id| self.unit_size(*id)) else {
            return Ok(original);
        };
        total += value::modulo(&original.abs(), &self.unit_size(finest));
        if negative {
            total = -total;
        }
        tracing::trace!(text, template, value = %total, "parsed value string");
        Ok(total)
    }

    /// Choose between the regular and the negative reading of `text`.
    fn pick_template<'a>(
        &self,
        text: &'a str,
        template: &'a str,
        options: &'a FormatOptions,
        matcher: &ValueMatcher,
    ) -> Result<(bool, &'a str, &'a str)> {
        let Some(neg_template) = options.negative_template() else {
            let extra = leading_minus(text).saturating_sub(leading_minus(template));
            return Ok((extra > 0, template, &text[extra..]));
        };

        let fits = |candidate: &str| -> Result<bool> {
            let tokens = self.tokenize(candidate, options.nickname_table())?;
            Ok(matcher.split(&tokens, text).is_ok())
        };
        match (fits(template)?, fits(neg_template)?) {
            (true, false) => Ok((false, template, text)),
            (false, true) => Ok((true, neg_template, text)),
            (true, true) => Err(Error::mismatch(
                template,
                text,
                format!("it also matches the negative format \"{neg_template}\""),
            )),
            (false, false) => Err(Error::mismatch(
                template,
                text,
                format!("it does not match the negative format \"{neg_template}\" either"),
            )),
        }
    }
}

/// Zero-based division index from a label or a (possibly one-based) number.
fn division_index<D: Division>(
    division: &D,
    supplied: Given,
    one_based: bool,
    template: &str,
    text: &str,
) -> Result<usize> {
    match supplied {
        Given::Index(index) => checked_index(division, &BigInt::from(index)),
        Given::Number(v) => {
            if !v.is_integer() {
                return Err(Error::mismatch(
                    template,
                    text,
                    format!("\"{}\" needs a whole number, found {v}", division.name()),
                ));
            }
            let raw = v.to_integer() - BigInt::from(u8::from(one_based));
            checked_index(division, &raw)
        }
    }
}

fn record_index(seen: &mut Vec<(usize, usize)>, division: usize, index: usize, name: &str) -> Result<()> {
    match seen.iter().find(|(d, _)| *d == division) {
        Some((_, previous)) if *previous != index => Err(Error::Consistency {
            name: name.to_owned(),
        }),
        Some(_) => Ok(()),
        None => {
            seen.push((division, index));
            Ok(())
        }
    }
}
