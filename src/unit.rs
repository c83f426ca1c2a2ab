//! The pluggable unit algebra.
//!
//! The parsing core never computes calendar math itself. Every unit a parser
//! accepts is a [`UnitDefinition`]: a capability record of three functions
//! (add, round up, round down) over an opaque time type `T`, supplied by a
//! time-library adapter at configuration time. [`crate::units`] is the
//! bundled chrono adapter; any other backend plugs in the same way by
//! filling a [`ParserConfig`].

use std::collections::HashMap;
use std::fmt;

/// Controls boundary selection when a rounding unit is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundDirection {
    /// Snap to the first instant of the containing period.
    #[default]
    Down,
    /// Snap to the last representable instant of the containing period:
    /// one minimal unit of the adapter's precision before the next
    /// boundary, never the boundary itself.
    Up,
}

/// Runtime context threaded through every adapter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext<Z> {
    pub timezone: Z,
}

/// Adds a signed amount of a unit to a time value. Pure offset arithmetic;
/// no implicit rounding.
pub type AddFn<T, Z> = Box<dyn Fn(T, i64, &ParseContext<Z>) -> T + Send + Sync>;

/// Rounds a time value to one boundary of the unit's containing period.
pub type RoundFn<T, Z> = Box<dyn Fn(T, &ParseContext<Z>) -> T + Send + Sync>;

/// Produces the current instant. The only adapter call that reads the
/// outside world.
pub type NowFn<T, Z> = Box<dyn Fn(&ParseContext<Z>) -> T + Send + Sync>;

/// Time arithmetic for a single unit (day, week, month, ...).
///
/// Calendar irregularities (month-end clamping, leap days, DST) are
/// entirely the adapter's concern and should be documented per unit where
/// the definitions are built.
pub struct UnitDefinition<T, Z> {
    /// Human-readable unit name (e.g. `"day"`), for diagnostics only; the
    /// spelling accepted in expressions is the [`UnitTable`] key.
    pub name: String,
    pub add: AddFn<T, Z>,
    pub round_up: RoundFn<T, Z>,
    pub round_down: RoundFn<T, Z>,
}

impl<T, Z> UnitDefinition<T, Z> {
    pub(crate) fn round(&self, direction: RoundDirection) -> &RoundFn<T, Z> {
        match direction {
            RoundDirection::Down => &self.round_down,
            RoundDirection::Up => &self.round_up,
        }
    }
}

impl<T, Z> fmt::Debug for UnitDefinition<T, Z> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitDefinition").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Unit definitions keyed by the exact spelling accepted in expressions
/// (e.g. `"d"`, `"mo"`, `"Woche"`). Keys are matched case-sensitively.
pub type UnitTable<T, Z> = HashMap<String, UnitDefinition<T, Z>>;

/// Adapter-provided configuration for [`Parser::new`](crate::Parser::new).
pub struct ParserConfig<T, Z> {
    /// Produces the anchor instant every expression starts from.
    pub now: NowFn<T, Z>,
    /// Units this parser accepts. Must be non-empty.
    pub units: UnitTable<T, Z>,
    /// Default timezone, overridable per parse call.
    pub timezone: Z,
    /// Accepted spellings of the now-keyword, matched exactly and
    /// case-sensitively (supports i18n, e.g. `["now", "jetzt", "сейчас"]`).
    /// Must be non-empty.
    pub now_aliases: Vec<String>,
}

impl<T, Z: fmt::Debug> fmt::Debug for ParserConfig<T, Z> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("units", &self.units)
            .field("timezone", &self.timezone)
            .field("now_aliases", &self.now_aliases)
            .finish_non_exhaustive()
    }
}
