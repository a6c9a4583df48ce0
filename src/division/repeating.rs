// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Repeating divisions (days of the week).
//!
//! A repeating division is a cycle of labeled slots, each `weight` units of
//! `unit_in` long, starting at the origin of the base unit and repeating
//! forever. Exceptions never touch it: a leap day is just another weekday.

use super::{check_labels, Division};
use crate::error::{Error, Result};
use crate::unit::{UnitId, UnitTable};
use crate::value::{self, Value};
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One labeled slot of the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlotDef {
    pub label: String,
    /// Length of the slot in `unit_in` units.
    pub weight: Value,
}

/// A repeating division as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepeatingDivisionDef {
    pub name: String,
    pub unit_in: String,
    pub slots: Vec<SlotDef>,
}

impl RepeatingDivisionDef {
    pub(crate) fn check_shape(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(Error::definition(format!(
                "repeating division \"{}\" needs at least one slot",
                self.name
            )));
        }
        check_labels(&self.name, self.slots.iter().map(|s| s.label.as_str()))?;
        if let Some(slot) = self.slots.iter().find(|s| !value::is_positive(&s.weight)) {
            return Err(Error::definition(format!(
                "slot \"{}\" of \"{}\" must have a weight greater than 0",
                slot.label, self.name
            )));
        }
        Ok(())
    }
}

/// A compiled repeating division.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingDivision {
    name: String,
    unit_in: UnitId,
    labels: Vec<String>,
    weights: Vec<Value>,
}

impl Division for RepeatingDivision {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl RepeatingDivision {
    pub(crate) fn resolve(def: &RepeatingDivisionDef, units: &UnitTable) -> Result<Self> {
        def.check_shape()?;
        let unit_in = units.id(&def.unit_in).ok_or_else(|| {
            Error::definition(format!(
                "\"{}\" is counted in \"{}\", which is not a declared unit",
                def.name, def.unit_in
            ))
        })?;
        Ok(Self {
            name: def.name.clone(),
            unit_in,
            labels: def.slots.iter().map(|s| s.label.clone()).collect(),
            weights: def.slots.iter().map(|s| s.weight.clone()).collect(),
        })
    }

    #[inline]
    pub fn unit_in(&self) -> UnitId {
        self.unit_in
    }

    #[inline]
    pub fn weights(&self) -> &[Value] {
        &self.weights
    }

    /// Length of one full cycle in base units.
    pub fn period(&self, units: &UnitTable) -> Value {
        let total = self.weights.iter().fold(Value::zero(), |acc, w| acc + w);
        units.to_base(self.unit_in, &total)
    }

    /// Slot containing `t` (base → label).
    pub fn locate(&self, units: &UnitTable, t: &Value) -> usize {
        let mut remainder = value::modulo(t, &self.period(units));
        for (index, weight) in self.weights.iter().enumerate() {
            remainder -= units.to_base(self.unit_in, weight);
            if remainder.is_negative() {
                return index;
            }
        }
        // remainder < period, so the loop always returns.
        self.weights.len() - 1
    }

    /// Signed base-unit adjustment that moves `t` onto slot `target`
    /// (label → base).
    ///
    /// Moves forward when the current slot is before `target` and backward
    /// when it is after, by the weights of the slots in between. `target`
    /// must be a valid slot index.
    pub fn realign(&self, units: &UnitTable, t: &Value, target: usize) -> Value {
        let current = self.locate(units, t);
        let span = |range: std::ops::Range<usize>| {
            let total = self.weights[range].iter().fold(Value::zero(), |acc, w| acc + w);
            units.to_base(self.unit_in, &total)
        };
        match current.cmp(&target) {
            Ordering::Less => span(current..target),
            Ordering::Greater => -span(target..current),
            Ordering::Equal => Value::zero(),
        }
    }
}
