//! Parser construction and evaluation.
//!
//! [`Parser::new`] validates a configuration once and closes over it; the
//! resulting parser is immutable and safely reusable across calls. Each
//! call runs the fixed pipeline
//!
//! ```text
//! input ──▶ parse_structure ──▶ resolve_expression ──▶ evaluate ──▶ T
//! ```
//!
//! with at most four adapter calls: `now`, the now-rounding, the offset
//! add, and the final rounding. There are no loops and no backtracking.

use std::fmt;

use crate::error::{ConfigError, ParseError};
use crate::resolve::{ResolvedExpression, resolve_expression};
use crate::structure::parse_structure;
use crate::unit::{ParseContext, ParserConfig, RoundDirection};

/// Per-call options for [`Parser::parse_with`]. Only the timezone can be
/// overridden; everything else is fixed at construction.
#[derive(Debug, Clone)]
pub struct ParseOptions<Z> {
    pub timezone: Option<Z>,
}

impl<Z> Default for ParseOptions<Z> {
    fn default() -> Self {
        Self { timezone: None }
    }
}

/// A reusable relative-time expression parser over an adapter's time type
/// `T` and timezone type `Z`.
pub struct Parser<T, Z> {
    config: ParserConfig<T, Z>,
}

impl<T, Z: fmt::Debug> fmt::Debug for Parser<T, Z> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser").field("config", &self.config).finish()
    }
}

impl<T, Z: Clone> Parser<T, Z> {
    /// Validate `config` and build a parser.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the alias list or the unit table is empty.
    /// Configuration problems surface here, at construction, never on the
    /// request-serving parse path.
    pub fn new(config: ParserConfig<T, Z>) -> Result<Self, ConfigError> {
        if config.now_aliases.is_empty() {
            return Err(ConfigError::EmptyNowAliases);
        }
        if config.units.is_empty() {
            return Err(ConfigError::EmptyUnits);
        }
        Ok(Self { config })
    }

    /// Parse `input` with round-down semantics in the configured timezone.
    ///
    /// # Errors
    ///
    /// See [`ParseError`].
    pub fn parse(&self, input: &str) -> Result<T, ParseError> {
        self.parse_with(input, RoundDirection::default(), &ParseOptions::default())
    }

    /// Parse `input`, choosing how period boundaries round and optionally
    /// overriding the timezone for this call only.
    ///
    /// # Errors
    ///
    /// See [`ParseError`].
    pub fn parse_with(
        &self,
        input: &str,
        direction: RoundDirection,
        options: &ParseOptions<Z>,
    ) -> Result<T, ParseError> {
        let tokens = parse_structure(input)?;
        let resolved = resolve_expression(&tokens, &self.config)?;

        let ctx = ParseContext {
            timezone: options.timezone.clone().unwrap_or_else(|| self.config.timezone.clone()),
        };

        Ok(self.evaluate(&resolved, direction, &ctx))
    }

    // The fixed five-step pipeline; each step feeds the next.
    fn evaluate(&self, expr: &ResolvedExpression<'_, T, Z>, direction: RoundDirection, ctx: &ParseContext<Z>) -> T {
        let mut time = (self.config.now)(ctx);

        if let Some(unit) = expr.now_rounding {
            time = unit.round(direction)(time, ctx);
        }

        if let Some(offset) = &expr.offset {
            time = (offset.unit.add)(time, offset.amount, ctx);

            if let Some(unit) = expr.final_rounding {
                time = unit.round(direction)(time, ctx);
            }
        }

        time
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use chrono_tz::Tz;

    use super::*;
    use crate::error::Position;
    use crate::unit::UnitTable;
    use crate::units::{self, Time};

    /// Friday 2024-03-15, mid-morning, with sub-second precision.
    fn reference_instant(tz: &Tz) -> Time {
        let utc = Tz::UTC.with_ymd_and_hms(2024, 3, 15, 10, 30, 45).unwrap() + Duration::milliseconds(123);
        utc.with_timezone(tz)
    }

    /// Default configuration with `now` pinned to the reference instant.
    fn fixed_parser() -> Parser<Time, Tz> {
        let mut config = units::config(Tz::UTC);
        config.now = Box::new(|ctx| reference_instant(&ctx.timezone));
        Parser::new(config).unwrap()
    }

    fn fmt(time: &Time) -> String {
        time.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
    }

    #[test]
    fn round_down_cases() {
        let parser = fixed_parser();
        let cases = [
            ("now", "2024-03-15T10:30:45.123"),
            ("now/d", "2024-03-15T00:00:00.000"),
            ("now/w", "2024-03-11T00:00:00.000"),
            ("now/mo", "2024-03-01T00:00:00.000"),
            ("now/y", "2024-01-01T00:00:00.000"),
            ("now-1d", "2024-03-14T10:30:45.123"),
            ("now+1d", "2024-03-16T10:30:45.123"),
            ("now-7d", "2024-03-08T10:30:45.123"),
            ("now+5h", "2024-03-15T15:30:45.123"),
            ("now-30m", "2024-03-15T10:00:45.123"),
            ("now-1mo", "2024-02-15T10:30:45.123"),
            ("now+1y", "2025-03-15T10:30:45.123"),
            ("now/d-1d", "2024-03-14T00:00:00.000"),
            ("now/d+1d", "2024-03-16T00:00:00.000"),
            ("now-7d/d", "2024-03-08T00:00:00.000"),
            ("now-1mo/mo", "2024-02-01T00:00:00.000"),
            ("now-25d/mo", "2024-02-01T00:00:00.000"),
            ("now+1mo/y", "2024-01-01T00:00:00.000"),
            ("now/w-1d/d", "2024-03-10T00:00:00.000"),
            ("now/mo+1mo/mo", "2024-04-01T00:00:00.000"),
        ];

        for (expr, expected) in cases {
            let time = parser.parse(expr).unwrap();
            assert_eq!(fmt(&time), expected, "round-down {expr}");
        }
    }

    #[test]
    fn round_up_cases() {
        let parser = fixed_parser();
        let cases = [
            ("now/d", "2024-03-15T23:59:59.999"),
            ("now/h", "2024-03-15T10:59:59.999"),
            ("now/w", "2024-03-17T23:59:59.999"),
            ("now/mo", "2024-03-31T23:59:59.999"),
            ("now-7d/d", "2024-03-08T23:59:59.999"),
            ("now-7d/w", "2024-03-10T23:59:59.999"),
        ];

        for (expr, expected) in cases {
            let time = parser.parse_with(expr, RoundDirection::Up, &ParseOptions::default()).unwrap();
            assert_eq!(fmt(&time), expected, "round-up {expr}");
        }
    }

    #[test]
    fn offsets_and_rounding_compose_left_to_right() {
        // now/w-1d/d: round to start of week, step back a day, round that
        // day down. Check each prefix so an intermediate regression cannot
        // hide behind a coincidentally-correct final value.
        let parser = fixed_parser();
        assert_eq!(fmt(&parser.parse("now/w").unwrap()), "2024-03-11T00:00:00.000");
        assert_eq!(fmt(&parser.parse("now/w-1d").unwrap()), "2024-03-10T00:00:00.000");
        assert_eq!(fmt(&parser.parse("now/w-1d/d").unwrap()), "2024-03-10T00:00:00.000");
    }

    #[test]
    fn oversized_offsets_saturate_instead_of_panicking() {
        // Grammar-valid input with an absurd amount parses to chrono's
        // representable bound rather than crashing the caller.
        let parser = fixed_parser();
        let max = DateTime::<Utc>::MAX_UTC.with_timezone(&Tz::UTC);
        let min = DateTime::<Utc>::MIN_UTC.with_timezone(&Tz::UTC);

        assert_eq!(parser.parse("now+99999999999999999ms").unwrap(), max);
        assert_eq!(parser.parse("now+999999999999999d").unwrap(), max);
        assert_eq!(parser.parse("now-999999999999999d").unwrap(), min);
    }

    #[test]
    fn zero_offset_is_a_no_op() {
        let parser = fixed_parser();
        assert_eq!(fmt(&parser.parse("now-0d").unwrap()), "2024-03-15T10:30:45.123");
    }

    #[test]
    fn timezone_override_applies_to_this_call_only() {
        let parser = fixed_parser();
        let berlin = ParseOptions { timezone: Some(Tz::Europe__Berlin) };

        // 10:30:45 UTC is 11:30:45 in Berlin (CET, +01:00 in March before
        // the switch); start of the Berlin day is an hour before UTC's.
        let local = parser.parse_with("now/d", RoundDirection::Down, &berlin).unwrap();
        assert_eq!(fmt(&local), "2024-03-15T00:00:00.000");
        assert_eq!(fmt(&local.with_timezone(&Tz::UTC)), "2024-03-14T23:00:00.000");

        // The configured default is untouched.
        assert_eq!(fmt(&parser.parse("now/d").unwrap()), "2024-03-15T00:00:00.000");
    }

    #[test]
    fn structural_failures_surface_unchanged() {
        let parser = fixed_parser();
        let err = parser.parse("now/d/mo").unwrap_err();
        assert_eq!(err, ParseError::InvalidStructure { value: "now/d/mo".to_owned() });
    }

    #[test]
    fn value_failures_carry_their_position() {
        let parser = fixed_parser();
        let cases = [
            ("tomorrow", "tomorrow", Position::NowKeyword),
            ("now/q", "q", Position::NowRounding),
            ("now-1q", "q", Position::Offset),
            ("now-1d/q", "q", Position::FinalRounding),
        ];

        for (expr, value, position) in cases {
            let err = parser.parse(expr).unwrap_err();
            assert_eq!(err, ParseError::InvalidValue { value: value.to_owned(), position }, "{expr}");
        }
    }

    #[test]
    fn empty_alias_list_fails_at_construction() {
        let mut config = units::config(Tz::UTC);
        config.now_aliases.clear();
        assert_eq!(Parser::new(config).unwrap_err(), ConfigError::EmptyNowAliases);
    }

    #[test]
    fn empty_unit_table_fails_at_construction() {
        let mut config = units::config(Tz::UTC);
        config.units = UnitTable::new();
        assert_eq!(Parser::new(config).unwrap_err(), ConfigError::EmptyUnits);
    }

    #[test]
    fn parser_debug_elides_the_closures() {
        let parser = fixed_parser();
        let rendered = format!("{parser:?}");
        assert!(rendered.contains("now_aliases"));
        assert!(!rendered.contains("Fn"));
    }

    #[test]
    fn localized_configuration_parses_localized_expressions() {
        let mut config = units::config(Tz::Europe__Berlin);
        config.now = Box::new(|ctx| reference_instant(&ctx.timezone));
        config.now_aliases.push("jetzt".to_owned());
        let woche = units::units().remove("w").unwrap();
        let tage = units::units().remove("d").unwrap();
        config.units.insert("Woche".to_owned(), woche);
        config.units.insert("Tage".to_owned(), tage);

        let parser = Parser::new(config).unwrap();
        let time = parser.parse("jetzt/Woche-2Tage").unwrap();
        assert_eq!(fmt(&time), "2024-03-09T00:00:00.000");
    }
}
