// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time system declaration and compilation.
//!
//! A system goes through two types:
//!
//! 1. [`TimeSystemBuilder`] accumulates declarations (units, exceptions,
//!    divisions). It answers no queries.
//! 2. [`TimeSystemBuilder::compile`] validates the whole definition, derives
//!    every working factor and returns an immutable [`TimeSystem`] holding
//!    all queries. A compiled system is `Send + Sync` and can serve any
//!    number of concurrent conversions.
//!
//! Extending a compiled system means going back to a builder with
//! [`TimeSystem::into_builder`] and compiling again.
//!
//! Units, exact divisions and repeating divisions share one namespace,
//! because templates refer to all of them the same way. Exceptions have
//! their own.

use crate::division::{
    CorrectionDef, Division, ExactDivision, ExactDivisionDef, RepeatingDivision,
    RepeatingDivisionDef, SlotDef, SubdivisionDef,
};
use crate::error::{Error, ItemKind, Result};
use crate::exception::{Exception, ExceptionDef};
use crate::format::{NameMatcher, Nicknames, Token};
use crate::unit::{Unit, UnitDef, UnitId, UnitTable};
use crate::value::{IntoValue, Value};
use std::collections::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════

/// Mutable set of declarations for a time system.
///
/// # Examples
///
/// ```
/// use horolog::{TimeSystemBuilder, Value};
///
/// let mut builder = TimeSystemBuilder::new("Gregorian");
/// builder
///     .add_base_unit("Second")?
///     .add_unit("Minute", 60, Some("Second"))?
///     .add_unit("Hour", 60, Some("Minute"))?
///     .add_unit("Day", 24, Some("Hour"))?
///     .add_unit("Year", 365, Some("Day"))?
///     .add_exception("Leap Day 4", 4, "Year", 1, "Day")?
///     .add_exception("Leap Day 100", 100, "Year", -1, "Day")?
///     .add_exception("Leap Day 400", 400, "Year", 1, "Day")?;
///
/// let system = builder.compile()?;
/// assert_eq!(system.unit_to_base(1, "Year")?, Value::from_integer(31_556_952.into()));
/// # Ok::<(), horolog::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimeSystemBuilder {
    name: String,
    units: Vec<UnitDef>,
    exceptions: Vec<ExceptionDef>,
    exact_divisions: Vec<ExactDivisionDef>,
    repeating_divisions: Vec<RepeatingDivisionDef>,
}

impl TimeSystemBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    // ── declarations ──────────────────────────────────────────────────

    /// Declare the base unit, the root every conversion goes through.
    pub fn add_base_unit(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.add_unit(name, 1, None)
    }

    /// Declare a unit worth `factor` of `parent` (`None` for the base unit).
    pub fn add_unit(
        &mut self,
        name: impl Into<String>,
        factor: impl IntoValue,
        parent: Option<&str>,
    ) -> Result<&mut Self> {
        let name = name.into();
        self.ensure_free(&name)?;
        let factor = factor.into_value()?;
        if !crate::value::is_positive(&factor) {
            return Err(Error::definition(format!(
                "the conversion factor of \"{name}\" must be greater than 0"
            )));
        }
        self.units.push(UnitDef {
            name,
            factor,
            parent: parent.map(str::to_owned),
        });
        Ok(self)
    }

    /// Declare "every `interval_amount` `interval_unit`, add `add_amount`
    /// `add_unit`".
    pub fn add_exception(
        &mut self,
        name: impl Into<String>,
        interval_amount: impl IntoValue,
        interval_unit: &str,
        add_amount: impl IntoValue,
        add_unit: &str,
    ) -> Result<&mut Self> {
        let name = name.into();
        if self.exceptions.iter().any(|e| e.name == name) {
            return Err(Error::definition(format!(
                "there cannot be two exceptions named \"{name}\""
            )));
        }
        let interval_amount = interval_amount.into_value()?;
        if !crate::value::is_positive(&interval_amount) {
            return Err(Error::definition(format!(
                "the interval of exception \"{name}\" must be greater than 0"
            )));
        }
        self.exceptions.push(ExceptionDef {
            name,
            interval_amount,
            interval_unit: interval_unit.to_owned(),
            add_amount: add_amount.into_value()?,
            add_unit: add_unit.to_owned(),
        });
        Ok(self)
    }

    /// Declare an exact division of `dividing_unit` into labeled spans
    /// counted in `dividing_into_unit`.
    ///
    /// `corrections` pairs an exception name with the label that absorbs the
    /// time it adds.
    pub fn add_exact_division<D, L, C, E, T>(
        &mut self,
        name: impl Into<String>,
        dividing_unit: &str,
        dividing_into_unit: &str,
        subdivisions: D,
        corrections: C,
    ) -> Result<&mut Self>
    where
        D: IntoIterator<Item = (L, u64)>,
        L: Into<String>,
        C: IntoIterator<Item = (E, T)>,
        E: Into<String>,
        T: Into<String>,
    {
        let def = ExactDivisionDef {
            name: name.into(),
            dividing_unit: dividing_unit.to_owned(),
            dividing_into_unit: dividing_into_unit.to_owned(),
            subdivisions: subdivisions
                .into_iter()
                .map(|(label, count)| SubdivisionDef {
                    label: label.into(),
                    count,
                })
                .collect(),
            corrections: corrections
                .into_iter()
                .map(|(exception, label)| CorrectionDef {
                    exception: exception.into(),
                    label: label.into(),
                })
                .collect(),
        };
        self.ensure_free(&def.name)?;
        def.check_shape()?;
        self.exact_divisions.push(def);
        Ok(self)
    }

    /// Declare a repeating cycle of labeled slots measured in `unit_in`.
    pub fn add_repeating_division<D, L, W>(
        &mut self,
        name: impl Into<String>,
        unit_in: &str,
        slots: D,
    ) -> Result<&mut Self>
    where
        D: IntoIterator<Item = (L, W)>,
        L: Into<String>,
        W: IntoValue,
    {
        let slots = slots
            .into_iter()
            .map(|(label, weight)| {
                Ok(SlotDef {
                    label: label.into(),
                    weight: weight.into_value()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let def = RepeatingDivisionDef {
            name: name.into(),
            unit_in: unit_in.to_owned(),
            slots,
        };
        self.ensure_free(&def.name)?;
        def.check_shape()?;
        self.repeating_divisions.push(def);
        Ok(self)
    }

    fn identifier_names(&self) -> impl Iterator<Item = &str> {
        self.units
            .iter()
            .map(|u| u.name.as_str())
            .chain(self.exact_divisions.iter().map(|d| d.name.as_str()))
            .chain(self.repeating_divisions.iter().map(|d| d.name.as_str()))
    }

    fn ensure_free(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::definition("names cannot be empty"));
        }
        if self.identifier_names().any(|n| n == name) {
            return Err(Error::definition(format!(
                "the name \"{name}\" is already used by a unit or division"
            )));
        }
        Ok(())
    }

    // ── compilation ───────────────────────────────────────────────────

    /// Validate every declaration and derive the compiled system.
    ///
    /// Nothing is shared with the builder, which stays usable; compiling the
    /// same declarations twice yields identical working factors.
    pub fn compile(&self) -> Result<TimeSystem> {
        let mut seen = HashSet::new();
        for name in self.identifier_names() {
            if name.is_empty() {
                return Err(Error::definition("names cannot be empty"));
            }
            if !seen.insert(name) {
                return Err(Error::definition(format!(
                    "the name \"{name}\" is used by more than one unit or division"
                )));
            }
        }

        let mut units = UnitTable::link(&self.units)?;

        let mut exception_names = HashSet::new();
        let mut exceptions = Vec::with_capacity(self.exceptions.len());
        for def in &self.exceptions {
            if !exception_names.insert(def.name.as_str()) {
                return Err(Error::definition(format!(
                    "there cannot be two exceptions named \"{}\"",
                    def.name
                )));
            }
            exceptions.push(Exception::resolve(def, &units)?);
        }

        let exact = self
            .exact_divisions
            .iter()
            .map(|def| ExactDivision::resolve(def, &units, &exceptions))
            .collect::<Result<Vec<_>>>()?;
        let repeating = self
            .repeating_divisions
            .iter()
            .map(|def| RepeatingDivision::resolve(def, &units))
            .collect::<Result<Vec<_>>>()?;

        units.compile_factors(&exceptions)?;

        let mut names = HashMap::new();
        for (id, unit) in units.iter() {
            names.insert(unit.name().to_owned(), Entry::Unit(id));
        }
        for (i, div) in exact.iter().enumerate() {
            names.insert(div.name().to_owned(), Entry::Exact(i));
        }
        for (i, div) in repeating.iter().enumerate() {
            names.insert(div.name().to_owned(), Entry::Repeating(i));
        }
        let matcher = NameMatcher::new(names.keys().map(String::as_str))?;

        tracing::debug!(
            system = %self.name,
            units = self.units.len(),
            exceptions = exceptions.len(),
            exact_divisions = exact.len(),
            repeating_divisions = repeating.len(),
            "compiled time system"
        );

        Ok(TimeSystem {
            definition: self.clone(),
            units,
            exceptions,
            exact,
            repeating,
            names,
            matcher,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Compiled system
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Entry {
    Unit(UnitId),
    Exact(usize),
    Repeating(usize),
}

/// What a template identifier names.
#[derive(Debug, Clone, Copy)]
pub enum Identifier<'a> {
    Unit(UnitId),
    Exact(&'a ExactDivision),
    Repeating(&'a RepeatingDivision),
}

/// A compiled, immutable time system.
#[derive(Debug, Clone)]
pub struct TimeSystem {
    definition: TimeSystemBuilder,
    pub(crate) units: UnitTable,
    pub(crate) exceptions: Vec<Exception>,
    pub(crate) exact: Vec<ExactDivision>,
    pub(crate) repeating: Vec<RepeatingDivision>,
    names: HashMap<String, Entry>,
    matcher: NameMatcher,
}

impl TimeSystem {
    #[inline]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// The declarations this system was compiled from.
    #[inline]
    pub fn definition(&self) -> &TimeSystemBuilder {
        &self.definition
    }

    /// Give the declarations back, to extend them and compile again.
    pub fn into_builder(self) -> TimeSystemBuilder {
        self.definition
    }

    // ── units ─────────────────────────────────────────────────────────

    #[inline]
    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn base_unit(&self) -> &Unit {
        self.units.get(self.units.base())
    }

    pub fn unit_id(&self, name: &str) -> Result<UnitId> {
        self.units
            .id(name)
            .ok_or_else(|| Error::lookup(ItemKind::Unit, name))
    }

    pub fn unit(&self, name: &str) -> Result<&Unit> {
        Ok(self.units.get(self.unit_id(name)?))
    }

    /// Exception-averaged factor of `name` relative to its parent.
    pub fn working_factor(&self, name: &str) -> Result<&Value> {
        Ok(self.unit(name)?.working_factor())
    }

    /// Unit names from the base unit down to `name`.
    pub fn lineage(&self, name: &str) -> Result<Vec<&str>> {
        let id = self.unit_id(name)?;
        Ok(self
            .units
            .lineage(id)
            .into_iter()
            .map(|step| self.units.get(step).name())
            .collect())
    }

    /// Convert `value` expressed in `unit_name` into base units.
    pub fn unit_to_base(&self, value: impl IntoValue, unit_name: &str) -> Result<Value> {
        let id = self.unit_id(unit_name)?;
        Ok(self.units.to_base(id, &value.into_value()?))
    }

    /// Convert `value` expressed in base units into `unit_name`.
    pub fn base_to_unit(&self, value: impl IntoValue, unit_name: &str) -> Result<Value> {
        let id = self.unit_id(unit_name)?;
        Ok(self.units.from_base(id, &value.into_value()?))
    }

    // ── exceptions and divisions ──────────────────────────────────────

    #[inline]
    pub fn exceptions(&self) -> &[Exception] {
        &self.exceptions
    }

    pub fn exception(&self, name: &str) -> Result<&Exception> {
        self.exceptions
            .iter()
            .find(|e| e.name() == name)
            .ok_or_else(|| Error::lookup(ItemKind::Exception, name))
    }

    pub fn exact_division(&self, name: &str) -> Result<&ExactDivision> {
        match self.names.get(name) {
            Some(Entry::Exact(i)) => Ok(&self.exact[*i]),
            _ => Err(Error::lookup(ItemKind::ExactDivision, name)),
        }
    }

    pub fn repeating_division(&self, name: &str) -> Result<&RepeatingDivision> {
        match self.names.get(name) {
            Some(Entry::Repeating(i)) => Ok(&self.repeating[*i]),
            _ => Err(Error::lookup(ItemKind::RepeatingDivision, name)),
        }
    }

    /// Resolve a declared unit or division name.
    pub fn identifier(&self, name: &str) -> Option<Identifier<'_>> {
        self.entry(name).map(|entry| match entry {
            Entry::Unit(id) => Identifier::Unit(id),
            Entry::Exact(i) => Identifier::Exact(&self.exact[i]),
            Entry::Repeating(i) => Identifier::Repeating(&self.repeating[i]),
        })
    }

    pub(crate) fn entry(&self, name: &str) -> Option<Entry> {
        self.names.get(name).copied()
    }

    // ── templates ─────────────────────────────────────────────────────

    /// Split `template` into literal and identifier tokens, recognising the
    /// aliases of `nicknames` besides the declared names.
    ///
    /// # Examples
    ///
    /// ```
    /// use horolog::{Nicknames, TimeSystemBuilder, Token};
    ///
    /// let mut builder = TimeSystemBuilder::new("Clock");
    /// builder.add_base_unit("Minute")?.add_unit("Hour", 60, Some("Minute"))?;
    /// let clock = builder.compile()?;
    ///
    /// let tokens = clock.tokenize("Hour:Minute", &Nicknames::new())?;
    /// assert_eq!(
    ///     tokens,
    ///     [Token::Ident("Hour"), Token::Literal(":"), Token::Ident("Minute")]
    /// );
    /// # Ok::<(), horolog::Error>(())
    /// ```
    pub fn tokenize<'t>(&self, template: &'t str, nicknames: &Nicknames) -> Result<Vec<Token<'t>>> {
        if nicknames.is_empty() {
            return Ok(self.matcher.split(template));
        }
        let matcher = NameMatcher::new(
            self.names
                .keys()
                .map(String::as_str)
                .chain(nicknames.aliases()),
        )?;
        Ok(matcher.split(template))
    }
}
