// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Exact divisions (months of a year).
//!
//! Offsets are computed per date: every subdivision starts at its declared
//! count of `dividing_into` units, then each correction whose exception is
//! active for that date adds the exception's amount to its label. February
//! therefore has 29 days in 2020, 28 in 2100 and 29 again in 2400, even
//! though the year itself is converted with its averaged length.
//!
//! Subdivisions are half-open: an instant exactly at the end of a span
//! belongs to the next span.

use super::{check_labels, Division};
use crate::error::{Error, ItemKind, Result};
use crate::exception::Exception;
use crate::unit::{UnitId, UnitTable};
use crate::value::{self, Value};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ── declarations ──────────────────────────────────────────────────────────

/// One labeled span, `count` units of `dividing_into` long.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubdivisionDef {
    pub label: String,
    pub count: u64,
}

/// "When `exception` fires, its amount goes to subdivision `label`."
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CorrectionDef {
    pub exception: String,
    pub label: String,
}

/// An exact division as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExactDivisionDef {
    pub name: String,
    /// The unit being split (Year).
    pub dividing_unit: String,
    /// The unit the spans are counted in (Day).
    pub dividing_into_unit: String,
    pub subdivisions: Vec<SubdivisionDef>,
    pub corrections: Vec<CorrectionDef>,
}

impl ExactDivisionDef {
    /// Checks that need nothing but the declaration itself.
    pub(crate) fn check_shape(&self) -> Result<()> {
        if self.subdivisions.len() < 2 {
            return Err(Error::definition(format!(
                "exact division \"{}\" must divide its unit into at least 2 subdivisions",
                self.name
            )));
        }
        check_labels(&self.name, self.subdivisions.iter().map(|s| s.label.as_str()))?;
        if let Some(s) = self.subdivisions.iter().find(|s| s.count == 0) {
            return Err(Error::definition(format!(
                "subdivision \"{}\" of \"{}\" must span at least one unit",
                s.label, self.name
            )));
        }
        if let Some(c) = self
            .corrections
            .iter()
            .find(|c| !self.subdivisions.iter().any(|s| s.label == c.label))
        {
            return Err(Error::definition(format!(
                "the correction of \"{}\" for \"{}\" targets \"{}\", which is not a subdivision of it",
                self.name, c.exception, c.label
            )));
        }
        Ok(())
    }
}

// ── compiled division ─────────────────────────────────────────────────────

/// Position of an instant inside an exact division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Zero-based subdivision index.
    pub index: usize,
    /// Base units taken by the subdivisions before `index`.
    pub consumed: Value,
}

/// A compiled exact division.
#[derive(Debug, Clone, PartialEq)]
pub struct ExactDivision {
    name: String,
    dividing: UnitId,
    dividing_into: UnitId,
    labels: Vec<String>,
    counts: Vec<u64>,
    /// `(exception index, label index)`
    corrections: Vec<(usize, usize)>,
}

impl Division for ExactDivision {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl ExactDivision {
    pub(crate) fn resolve(
        def: &ExactDivisionDef,
        units: &UnitTable,
        exceptions: &[Exception],
    ) -> Result<Self> {
        def.check_shape()?;

        let lookup = |unit_name: &str| {
            units.id(unit_name).ok_or_else(|| {
                Error::definition(format!(
                    "exact division \"{}\" refers to \"{unit_name}\", which is not a declared unit",
                    def.name
                ))
            })
        };
        let dividing = lookup(&def.dividing_unit)?;
        let dividing_into = lookup(&def.dividing_into_unit)?;
        if !units.is_strictly_below(dividing_into, dividing) {
            return Err(Error::definition(format!(
                "exact division \"{}\" counts a {} in {}, which is not smaller than it on its lineage",
                def.name, def.dividing_unit, def.dividing_into_unit
            )));
        }

        let labels: Vec<String> = def.subdivisions.iter().map(|s| s.label.clone()).collect();
        let mut corrections = Vec::with_capacity(def.corrections.len());
        for c in &def.corrections {
            let exception = exceptions
                .iter()
                .position(|e| e.name() == c.exception)
                .ok_or_else(|| {
                    Error::definition(format!(
                        "exact division \"{}\" corrects for \"{}\", which is not a declared exception",
                        def.name, c.exception
                    ))
                })?;
            let label = labels
                .iter()
                .position(|l| *l == c.label)
                .ok_or_else(|| Error::lookup(ItemKind::Identifier, c.label.clone()))?;
            corrections.push((exception, label));
        }

        // Every exception that changes the length of the dividing unit must
        // be absorbed by some subdivision.
        for (i, exception) in exceptions.iter().enumerate() {
            let alters_dividing = units.is_strictly_below(exception.add_unit(), dividing);
            if alters_dividing && !corrections.iter().any(|(e, _)| *e == i) {
                return Err(Error::definition(format!(
                    "exact division \"{}\" must say which subdivision absorbs the time added by \"{}\"",
                    def.name,
                    exception.name()
                )));
            }
        }

        Ok(Self {
            name: def.name.clone(),
            dividing,
            dividing_into,
            labels,
            counts: def.subdivisions.iter().map(|s| s.count).collect(),
            corrections,
        })
    }

    #[inline]
    pub fn dividing_unit(&self) -> UnitId {
        self.dividing
    }

    #[inline]
    pub fn dividing_into_unit(&self) -> UnitId {
        self.dividing_into
    }

    /// Declared span of each subdivision, in `dividing_into` units.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Corrected length of every subdivision, in base units, for the
    /// instance of the dividing unit containing `t`.
    pub fn offsets(&self, units: &UnitTable, exceptions: &[Exception], t: &Value) -> Vec<Value> {
        let mut offsets: Vec<Value> = self
            .counts
            .iter()
            .map(|&count| units.to_base(self.dividing_into, &Value::from_integer(BigInt::from(count))))
            .collect();

        for &(exception, label) in &self.corrections {
            let exception = &exceptions[exception];
            if exception.is_active(units, t) {
                offsets[label] += exception.added_in_base(units);
            }
        }
        offsets
    }

    /// Subdivision containing `t` (base → label).
    ///
    /// The dividing unit is converted with its averaged length, so the
    /// remainder can run past the corrected subdivision total; that tail
    /// belongs to the last subdivision.
    pub fn locate(&self, units: &UnitTable, exceptions: &[Exception], t: &Value) -> Slot {
        let offsets = self.offsets(units, exceptions, t);
        let last = offsets.len() - 1;
        let mut remainder = value::modulo(t, &units.size(self.dividing));
        let mut consumed = Value::zero();

        for (index, offset) in offsets.iter().enumerate().take(last) {
            remainder -= offset;
            if remainder.is_negative() {
                return Slot { index, consumed };
            }
            consumed += offset;
        }

        if remainder >= offsets[last] {
            tracing::warn!(
                division = %self.name,
                overflow = %(remainder - &offsets[last]),
                "remainder runs past the last subdivision"
            );
        }
        Slot {
            index: last,
            consumed,
        }
    }

    /// Base units to add to reach the start of subdivision `index`
    /// (label → base), for the instance of the dividing unit containing `t`.
    ///
    /// `index` must be a valid subdivision index.
    pub fn preceding(
        &self,
        units: &UnitTable,
        exceptions: &[Exception],
        t: &Value,
        index: usize,
    ) -> Value {
        self.offsets(units, exceptions, t)
            .iter()
            .take(index)
            .fold(Value::zero(), |acc, offset| acc + offset)
    }
}
