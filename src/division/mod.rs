// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Labeled subdivisions of time.
//!
//! Two independent kinds exist:
//!
//! - [`ExactDivision`] partitions one unit exactly into labeled spans of a
//!   smaller unit (months of a year, counted in days) and corrects those
//!   spans whenever a periodic exception fires for the date in question.
//! - [`RepeatingDivision`] is an endless cycle of labeled slots (days of the
//!   week) that ignores exceptions altogether.
//!
//! They share nothing but a name and an ordered label list, which is what
//! the [`Division`] trait exposes.

mod exact;
mod repeating;

pub use exact::{CorrectionDef, ExactDivision, ExactDivisionDef, Slot, SubdivisionDef};
pub use repeating::{RepeatingDivision, RepeatingDivisionDef, SlotDef};

use crate::error::{Error, Result};
use std::collections::HashSet;

/// Name and label access common to every division kind.
pub trait Division {
    fn name(&self) -> &str;

    /// Subdivision labels in order.
    fn labels(&self) -> &[String];

    fn label_index(&self, label: &str) -> Option<usize> {
        self.labels().iter().position(|l| l == label)
    }

    fn len(&self) -> usize {
        self.labels().len()
    }

    fn is_empty(&self) -> bool {
        self.labels().is_empty()
    }
}

/// Labels must be non-empty and unique within one division.
fn check_labels<'a>(division: &str, labels: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if label.is_empty() {
            return Err(Error::definition(format!(
                "division \"{division}\" has a subdivision with an empty label"
            )));
        }
        if !seen.insert(label) {
            return Err(Error::definition(format!(
                "division \"{division}\" defines the label \"{label}\" twice"
            )));
        }
    }
    Ok(())
}

/// Turn an index read from a value string into a checked slot index.
pub(crate) fn checked_index<D: Division + ?Sized>(division: &D, raw: &num_bigint::BigInt) -> Result<usize> {
    let out_of_range = || Error::IndexOutOfRange {
        division: division.name().to_owned(),
        index: i64::try_from(raw).unwrap_or(i64::MAX),
        len: division.len(),
    };
    let index = usize::try_from(raw).map_err(|_| out_of_range())?;
    if index >= division.len() {
        return Err(out_of_range());
    }
    Ok(index)
}
