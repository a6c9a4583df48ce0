// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Unit graph and hierarchy compiler.
//!
//! Units form a tree rooted at the **base unit**. Each unit is declared with
//! a nominal factor relative to its parent (`Minute = 60 Second`,
//! `Day = 24 Hour`, `Year = 365 Day`). The tree is stored as an arena
//! ([`UnitTable`]) addressed by [`UnitId`]; parents are optional ids and
//! children are derived id lists rebuilt on every compilation.
//!
//! # Working factors
//!
//! Compilation replaces every nominal factor with a **working factor**: the
//! amortized length of the unit once every periodic exception whose interval
//! is measured in that unit is spread evenly over its interval. With the
//! Gregorian leap rules the 365-day year becomes 365.2425 days. All
//! conversions go through working factors, so they are averages, never
//! calendar-exact values for a specific date.
//!
//! | Operation | Definition |
//! |-----------|------------|
//! | `to_base(u, x)` | `x · ∏ working_factor` along the lineage of `u` |
//! | `from_base(u, x)` | `x / ∏ working_factor` along the lineage of `u` |

use crate::error::{Error, Result};
use crate::exception::Exception;
use crate::value::{self, Value};
use num_traits::{One, Zero};
use std::collections::{HashMap, VecDeque};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// Declarations
// ═══════════════════════════════════════════════════════════════════════════

/// A unit as declared by the caller, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitDef {
    pub name: String,
    /// Number of `parent` units in one of this unit. Ignored for the base unit.
    pub factor: Value,
    /// `None` marks the base unit.
    pub parent: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════
// Compiled units
// ═══════════════════════════════════════════════════════════════════════════

/// Stable index of a unit inside a compiled [`UnitTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

/// A compiled unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    name: String,
    nominal_factor: Value,
    working_factor: Value,
    parent: Option<UnitId>,
    children: Vec<UnitId>,
}

impl Unit {
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Factor relative to the parent as declared.
    #[inline]
    pub fn nominal_factor(&self) -> &Value {
        &self.nominal_factor
    }

    /// Exception-averaged factor relative to the parent (`1` for the base unit).
    #[inline]
    pub fn working_factor(&self) -> &Value {
        &self.working_factor
    }

    #[inline]
    pub fn parent(&self) -> Option<UnitId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[UnitId] {
        &self.children
    }

    #[inline]
    pub fn is_base(&self) -> bool {
        self.parent.is_none()
    }
}

/// Arena holding every unit of a compiled system.
#[derive(Debug, Clone)]
pub struct UnitTable {
    units: Vec<Unit>,
    by_name: HashMap<String, UnitId>,
    base: UnitId,
}

impl UnitTable {
    /// Index units by name and link the tree.
    ///
    /// Working factors start out equal to the nominal factors; call
    /// [`UnitTable::compile_factors`] once the exceptions are resolved.
    pub(crate) fn link(defs: &[UnitDef]) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(defs.len());
        for (i, def) in defs.iter().enumerate() {
            if by_name.insert(def.name.clone(), UnitId(i)).is_some() {
                return Err(Error::definition(format!(
                    "there cannot be two units named \"{}\"",
                    def.name
                )));
            }
            if !value::is_positive(&def.factor) {
                return Err(Error::definition(format!(
                    "the conversion factor of \"{}\" must be greater than 0",
                    def.name
                )));
            }
        }

        let mut units: Vec<Unit> = defs
            .iter()
            .map(|def| Unit {
                name: def.name.clone(),
                nominal_factor: def.factor.clone(),
                working_factor: def.factor.clone(),
                parent: None,
                children: Vec::new(),
            })
            .collect();

        let mut base = None;
        for (i, def) in defs.iter().enumerate() {
            match &def.parent {
                Some(parent_name) => {
                    let parent = *by_name.get(parent_name).ok_or_else(|| {
                        Error::definition(format!(
                            "\"{}\" is defined in terms of \"{parent_name}\", which is not a declared unit",
                            def.name
                        ))
                    })?;
                    units[i].parent = Some(parent);
                    units[parent.0].children.push(UnitId(i));
                }
                None => {
                    if let Some(UnitId(other)) = base {
                        return Err(Error::definition(format!(
                            "there cannot be two base units (\"{}\" and \"{}\")",
                            units[other].name, def.name
                        )));
                    }
                    base = Some(UnitId(i));
                }
            }
        }

        let base = base.ok_or_else(|| Error::definition("the system has no base unit"))?;
        units[base.0].working_factor = Value::one();

        let table = Self {
            units,
            by_name,
            base,
        };
        let reachable = table.traversal_order().len();
        if reachable != table.units.len() {
            return Err(Error::definition(
                "the unit hierarchy contains a cycle that does not reach the base unit",
            ));
        }
        Ok(table)
    }

    /// Derive the working factor of every unit from its nominal factor and
    /// the exceptions measured in it.
    ///
    /// Units are visited parent first, so each unit sees the final working
    /// factors of all of its ancestors. Fails when the exceptions shrink a
    /// unit to zero or less.
    pub(crate) fn compile_factors(&mut self, exceptions: &[Exception]) -> Result<()> {
        for id in self.traversal_order() {
            let Some(parent) = self.units[id.0].parent else {
                self.units[id.0].working_factor = Value::one();
                continue;
            };
            self.units[id.0].working_factor = self.units[id.0].nominal_factor.clone();

            let base_amount = self.size(id);
            let lineage = self.lineage(id);
            let mut amortized = Value::zero();
            let measured: Vec<&Exception> =
                exceptions.iter().filter(|e| e.interval_unit() == id).collect();

            for exception in &measured {
                // One `id` expressed in base units as if the exception fired.
                let mut amount = Value::one();
                for step in lineage.iter().rev() {
                    if *step == exception.add_unit() {
                        amount += exception.add_amount();
                    }
                    amount *= &self.units[step.0].working_factor;
                }
                amortized += (amount - &base_amount) / exception.interval_amount();
            }

            let working = self.from_base(parent, &(base_amount + amortized));
            if !value::is_positive(&working) {
                let names: Vec<&str> = measured.iter().map(|e| e.name()).collect();
                return Err(Error::definition(format!(
                    "the exceptions {names:?} leave \"{}\" with a length of {working} {}, it must stay greater than 0",
                    self.units[id.0].name, self.units[parent.0].name
                )));
            }
            tracing::debug!(unit = %self.units[id.0].name, working_factor = %working, "compiled unit");
            self.units[id.0].working_factor = working;
        }
        Ok(())
    }

    /// Breadth-first order from the base unit: parents before children.
    fn traversal_order(&self) -> Vec<UnitId> {
        let mut order = Vec::with_capacity(self.units.len());
        let mut queue = VecDeque::from([self.base]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.units[id.0].children.iter().copied());
        }
        order
    }

    // ── lookups ───────────────────────────────────────────────────────

    #[inline]
    pub fn base(&self) -> UnitId {
        self.base
    }

    #[inline]
    pub fn get(&self, id: UnitId) -> &Unit {
        &self.units[id.0]
    }

    #[inline]
    pub fn id(&self, name: &str) -> Option<UnitId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, &Unit)> {
        self.units.iter().enumerate().map(|(i, u)| (UnitId(i), u))
    }

    /// Path from the base unit to `id`, both ends included.
    pub fn lineage(&self, id: UnitId) -> Vec<UnitId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.units[current.0].parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// `true` when `lower` lies on the lineage of `upper`, closer to the
    /// base unit than `upper` itself.
    pub fn is_strictly_below(&self, lower: UnitId, upper: UnitId) -> bool {
        lower != upper && self.lineage(upper).contains(&lower)
    }

    // ── conversions ───────────────────────────────────────────────────

    /// Convert `amount` of `id` into base units.
    pub fn to_base(&self, id: UnitId, amount: &Value) -> Value {
        amount * self.size(id)
    }

    /// Convert an amount of base units into `id`.
    pub fn from_base(&self, id: UnitId, amount: &Value) -> Value {
        amount / self.size(id)
    }

    /// Length of one `id` in base units.
    pub fn size(&self, id: UnitId) -> Value {
        let mut size = Value::one();
        let mut current = id;
        while let Some(parent) = self.units[current.0].parent {
            size *= &self.units[current.0].working_factor;
            current = parent;
        }
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn def(name: &str, factor: i64, parent: Option<&str>) -> UnitDef {
        UnitDef {
            name: name.into(),
            factor: Value::from_integer(BigInt::from(factor)),
            parent: parent.map(Into::into),
        }
    }

    fn clock() -> Vec<UnitDef> {
        vec![
            def("Second", 1, None),
            def("Minute", 60, Some("Second")),
            def("Hour", 60, Some("Minute")),
            def("Day", 24, Some("Hour")),
        ]
    }

    fn int(v: i64) -> Value {
        Value::from_integer(BigInt::from(v))
    }

    #[test]
    fn test_link_builds_tree() {
        let table = UnitTable::link(&clock()).unwrap();
        let day = table.id("Day").unwrap();
        let names: Vec<&str> = table
            .lineage(day)
            .into_iter()
            .map(|id| table.get(id).name())
            .collect();
        assert_eq!(names, ["Second", "Minute", "Hour", "Day"]);
        assert!(table.get(table.base()).is_base());
        assert_eq!(table.get(table.id("Hour").unwrap()).children(), &[day]);
    }

    #[test]
    fn test_nominal_conversion_without_exceptions() {
        let mut table = UnitTable::link(&clock()).unwrap();
        table.compile_factors(&[]).unwrap();
        let day = table.id("Day").unwrap();
        assert_eq!(table.to_base(day, &int(2)), int(172_800));
        assert_eq!(table.from_base(day, &int(43_200)), Value::new(1.into(), 2.into()));
    }

    #[test]
    fn test_rejects_duplicate_units() {
        let mut defs = clock();
        defs.push(def("Hour", 60, Some("Minute")));
        assert!(matches!(UnitTable::link(&defs), Err(Error::Definition(_))));
    }

    #[test]
    fn test_rejects_two_base_units() {
        let mut defs = clock();
        defs.push(def("Tick", 1, None));
        assert!(matches!(UnitTable::link(&defs), Err(Error::Definition(_))));
    }

    #[test]
    fn test_rejects_missing_base_and_cycles() {
        let defs = vec![def("A", 2, Some("B")), def("B", 2, Some("A"))];
        assert!(matches!(UnitTable::link(&defs), Err(Error::Definition(_))));

        let mut defs = clock();
        defs.push(def("Loop1", 2, Some("Loop2")));
        defs.push(def("Loop2", 2, Some("Loop1")));
        assert!(matches!(UnitTable::link(&defs), Err(Error::Definition(_))));
    }

    #[test]
    fn test_rejects_dangling_parent_and_bad_factor() {
        let mut defs = clock();
        defs.push(def("Week", 7, Some("Dia")));
        assert!(matches!(UnitTable::link(&defs), Err(Error::Definition(_))));

        let mut defs = clock();
        defs.push(def("Week", 0, Some("Day")));
        assert!(matches!(UnitTable::link(&defs), Err(Error::Definition(_))));
    }

    #[test]
    fn test_rejects_exceptions_that_cancel_a_unit() {
        let defs = vec![def("Day", 1, None), def("Year", 1, Some("Day"))];
        let mut table = UnitTable::link(&defs).unwrap();
        let vanish = crate::exception::ExceptionDef {
            name: "Vanishing Day".into(),
            interval_amount: int(1),
            interval_unit: "Year".into(),
            add_amount: int(-1),
            add_unit: "Day".into(),
        };
        let exceptions = vec![Exception::resolve(&vanish, &table).unwrap()];
        let err = table.compile_factors(&exceptions).unwrap_err();
        assert!(matches!(&err, Error::Definition(msg) if msg.contains("Year") && msg.contains("Vanishing Day")));
    }

    #[test]
    fn test_strictly_below() {
        let table = UnitTable::link(&clock()).unwrap();
        let (second, hour, day) = (
            table.id("Second").unwrap(),
            table.id("Hour").unwrap(),
            table.id("Day").unwrap(),
        );
        assert!(table.is_strictly_below(second, day));
        assert!(table.is_strictly_below(hour, day));
        assert!(!table.is_strictly_below(day, day));
        assert!(!table.is_strictly_below(day, hour));
    }
}
