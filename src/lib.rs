//! Parse compact relative-time expressions like `now-7d/d` or `now/w-1d/mo`
//! into concrete points in time.
//!
//! The syntax is borrowed from a widespread log-query convention: an
//! expression anchors at "now", optionally rounds it to a period boundary,
//! optionally applies a signed offset in some unit, and optionally rounds
//! again. Rounding is directional: the caller decides whether boundaries
//! snap to the start of the containing period ([`RoundDirection::Down`],
//! for range starts) or to its last representable instant
//! ([`RoundDirection::Up`], for range ends).
//!
//! The parsing core is pure and computes no calendar math of its own: every
//! unit is a [`UnitDefinition`] (three functions over an opaque time type)
//! supplied by a time-library adapter. The [`units`] module is the bundled
//! chrono/chrono-tz adapter with the conventional unit table
//! (`ms s m h d w mo y`); other backends plug in by filling a
//! [`ParserConfig`] themselves.
//!
//! ```
//! use chrono_tz::Tz;
//! use nowish::{Parser, RoundDirection, units};
//!
//! let parser = Parser::new(units::config(Tz::UTC)).unwrap();
//!
//! let start = parser.parse("now-7d/d").unwrap();
//! let end = parser
//!     .parse_with("now-7d/d", RoundDirection::Up, &Default::default())
//!     .unwrap();
//! assert!(start < end);
//! ```
//!
//! Parsing fails in exactly two ways, kept deliberately distinct: the input
//! does not match the grammar ([`ParseError::InvalidStructure`]), or a
//! token's value is unknown to the configuration
//! ([`ParseError::InvalidValue`], tagged with the failing segment). Bad
//! configurations are a third, separate error raised by [`Parser::new`]
//! before any parsing happens.

#[macro_use]
mod macros;

mod error;
mod parser;
mod resolve;
mod structure;
mod unit;

pub mod units;

pub use error::{ConfigError, ParseError, Position};
pub use parser::{ParseOptions, Parser};
pub use structure::{RawOffset, RawTokens, parse_structure};
pub use unit::{AddFn, NowFn, ParseContext, ParserConfig, RoundDirection, RoundFn, UnitDefinition, UnitTable};
