// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Periodic exceptions: "every `interval_amount` of `interval_unit`, add
//! `add_amount` of `add_unit`".
//!
//! The Gregorian leap rules are three exceptions on the year:
//!
//! | Name | Every | Add |
//! |------|-------|-----|
//! | Leap Day 4 | 4 Year | +1 Day |
//! | Leap Day 100 | 100 Year | −1 Day |
//! | Leap Day 400 | 400 Year | +1 Day |
//!
//! Unit conversion only sees the amortized effect of an exception (see
//! [`crate::unit`]). Exact divisions instead ask whether an exception fires
//! for the instance of its interval unit containing a given date, through
//! [`Exception::is_active`].

use crate::error::{Error, Result};
use crate::unit::{UnitId, UnitTable};
use crate::value::{self, Value};
use num_traits::Zero;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An exception as declared by the caller, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExceptionDef {
    pub name: String,
    pub interval_amount: Value,
    pub interval_unit: String,
    /// May be negative (e.g. the 100-year rule removes a day).
    pub add_amount: Value,
    pub add_unit: String,
}

/// An exception whose units are resolved against a compiled unit table.
#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    name: String,
    interval_amount: Value,
    interval_unit: UnitId,
    add_amount: Value,
    add_unit: UnitId,
}

impl Exception {
    /// Resolve unit names and check that `add_unit` lies strictly below
    /// `interval_unit` on its lineage.
    pub(crate) fn resolve(def: &ExceptionDef, units: &UnitTable) -> Result<Self> {
        let lookup = |unit_name: &str| {
            units.id(unit_name).ok_or_else(|| {
                Error::definition(format!(
                    "exception \"{}\" refers to \"{unit_name}\", which is not a declared unit",
                    def.name
                ))
            })
        };
        let interval_unit = lookup(&def.interval_unit)?;
        let add_unit = lookup(&def.add_unit)?;

        if !value::is_positive(&def.interval_amount) {
            return Err(Error::definition(format!(
                "the interval of exception \"{}\" must be greater than 0",
                def.name
            )));
        }
        if !units.is_strictly_below(add_unit, interval_unit) {
            return Err(Error::definition(format!(
                "exception \"{}\" adds {} but a {} is not part of what a {} is made of; \
                 the added unit must lie between the base unit and the interval unit",
                def.name, def.add_unit, def.add_unit, def.interval_unit
            )));
        }

        Ok(Self {
            name: def.name.clone(),
            interval_amount: def.interval_amount.clone(),
            interval_unit,
            add_amount: def.add_amount.clone(),
            add_unit,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn interval_amount(&self) -> &Value {
        &self.interval_amount
    }

    #[inline]
    pub fn interval_unit(&self) -> UnitId {
        self.interval_unit
    }

    #[inline]
    pub fn add_amount(&self) -> &Value {
        &self.add_amount
    }

    #[inline]
    pub fn add_unit(&self) -> UnitId {
        self.add_unit
    }

    /// Whether the exception fires for the instance of the interval unit
    /// that contains the base-unit instant `t`.
    ///
    /// The test is exact: `floor(interval_unit.from_base(t)) mod
    /// interval_amount == 0`.
    pub fn is_active(&self, units: &UnitTable, t: &Value) -> bool {
        let count = units.from_base(self.interval_unit, t).floor();
        value::modulo(&count, &self.interval_amount).is_zero()
    }

    /// The amount added when the exception fires, in base units.
    pub fn added_in_base(&self, units: &UnitTable) -> Value {
        units.to_base(self.add_unit, &self.add_amount)
    }
}
