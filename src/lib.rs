// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Horolog
//!
//! Declarative calendar and time-keeping systems with exact conversion
//! between a single base-unit count and human-readable strings.
//!
//! A time system is described, not coded: a tree of units rooted at a base
//! unit, periodic exceptions (leap days, leap seconds), and labeled
//! divisions (months, weekdays). Every instant is one exact rational number
//! of base units; templates such as `"Month/Day/Year"` render it and parse
//! it back.
//!
//! # Core types
//!
//! - [`TimeSystemBuilder`]: accumulates declarations.
//! - [`TimeSystem`]: compiled, immutable system answering every query.
//! - [`Value`]: exact rational amount (`num_rational::BigRational`).
//! - [`FormatOptions`]: one-based names, [`Nicknames`] and negative
//!   template for a conversion call.
//! - [`ExactDivision`] / [`RepeatingDivision`]: the two division kinds,
//!   sharing the [`Division`] trait.
//! - [`Error`]: every failure, as a `thiserror` enum.
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | `unit` | unit tree and working-factor derivation |
//! | `exception` | periodic exceptions |
//! | `division` | exact and repeating divisions |
//! | `format` | template and value tokenizing, nicknames, options |
//! | `system` | builder and compiled system |
//! | `convert` | base ↔ string conversions |
//!
//! # Example
//!
//! ```
//! use horolog::{FormatOptions, TimeSystemBuilder, Value};
//!
//! let mut gregorian = TimeSystemBuilder::new("Gregorian");
//! gregorian
//!     .add_base_unit("Second")?
//!     .add_unit("Minute", 60, Some("Second"))?
//!     .add_unit("Hour", 60, Some("Minute"))?
//!     .add_unit("Day", 24, Some("Hour"))?
//!     .add_unit("Year", 365, Some("Day"))?
//!     .add_exception("Leap Day 4", 4, "Year", 1, "Day")?
//!     .add_exception("Leap Day 100", 100, "Year", -1, "Day")?
//!     .add_exception("Leap Day 400", 400, "Year", 1, "Day")?
//!     .add_exact_division(
//!         "Month",
//!         "Year",
//!         "Day",
//!         [
//!             ("January", 31), ("February", 28), ("March", 31), ("April", 30),
//!             ("May", 31), ("June", 30), ("July", 31), ("August", 31),
//!             ("September", 30), ("October", 31), ("November", 30), ("December", 31),
//!         ],
//!         [
//!             ("Leap Day 4", "February"),
//!             ("Leap Day 100", "February"),
//!             ("Leap Day 400", "February"),
//!         ],
//!     )?;
//! let gregorian = gregorian.compile()?;
//!
//! let options = FormatOptions::new().one_based(["Month", "Day"]);
//! let t = gregorian.format_to_base("6/26/2021", "Month/Day/Year", 0, &options)?;
//! assert_eq!(t, Value::from_integer(63_791_806_392i64.into()));
//! assert_eq!(gregorian.base_to_format(&t, "Month/Day/Year", &options)?, "6/26/2021");
//!
//! // No February 29th in 2100.
//! let t = gregorian.format_to_base("2/29/2100", "Month/Day/Year", 0, &options)?;
//! assert_eq!(gregorian.base_to_format(&t, "Month/Day/Year", &options)?, "3/1/2100");
//! # Ok::<(), horolog::Error>(())
//! ```

mod convert;
pub mod division;
mod error;
mod exception;
pub mod format;
mod system;
mod unit;
mod value;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use division::{
    CorrectionDef, Division, ExactDivision, ExactDivisionDef, RepeatingDivision,
    RepeatingDivisionDef, Slot, SlotDef, SubdivisionDef,
};
pub use error::{Error, ItemKind, Result};
pub use exception::{Exception, ExceptionDef};
pub use format::{FormatOptions, Nickname, Nicknames, Token, ValueToken};
pub use system::{Identifier, TimeSystem, TimeSystemBuilder};
pub use unit::{Unit, UnitDef, UnitId, UnitTable};
pub use value::{parse_value, IntoValue, Value};
