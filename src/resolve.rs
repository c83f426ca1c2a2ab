//! Semantic resolution.
//!
//! Turns the raw tokens from [`crate::structure`] into an executable
//! expression by validating each value against a parser's configuration and
//! replacing unit-name strings with borrowed [`UnitDefinition`]s.
//!
//! Segments are checked strictly left to right and the first failure wins,
//! so an error always points at the structurally leftmost problem. The
//! final rounding is only examined once the offset has resolved; the
//! grammar guarantees it never appears without one.

use crate::error::{ParseError, Position};
use crate::structure::RawTokens;
use crate::unit::{ParserConfig, UnitDefinition};

/// Expression tokens with unit names resolved against the unit table.
/// Borrows the definitions; the configuration keeps ownership.
#[derive(Debug)]
pub(crate) struct ResolvedExpression<'a, T, Z> {
    pub now_rounding: Option<&'a UnitDefinition<T, Z>>,
    pub offset: Option<ResolvedOffset<'a, T, Z>>,
    pub final_rounding: Option<&'a UnitDefinition<T, Z>>,
}

#[derive(Debug)]
pub(crate) struct ResolvedOffset<'a, T, Z> {
    pub amount: i64,
    pub unit: &'a UnitDefinition<T, Z>,
}

pub(crate) fn resolve_expression<'a, T, Z>(
    tokens: &RawTokens,
    config: &'a ParserConfig<T, Z>,
) -> Result<ResolvedExpression<'a, T, Z>, ParseError> {
    if !config.now_aliases.iter().any(|alias| alias == &tokens.now_keyword) {
        return Err(invalid(&tokens.now_keyword, Position::NowKeyword));
    }

    let now_rounding = match &tokens.now_rounding {
        Some(name) => Some(lookup(config, name, Position::NowRounding)?),
        None => None,
    };

    let mut offset = None;
    let mut final_rounding = None;

    if let Some(raw) = &tokens.offset {
        let unit = lookup(config, &raw.unit, Position::Offset)?;
        offset = Some(ResolvedOffset { amount: raw.amount, unit });

        if let Some(name) = &tokens.final_rounding {
            final_rounding = Some(lookup(config, name, Position::FinalRounding)?);
        }
    }

    Ok(ResolvedExpression { now_rounding, offset, final_rounding })
}

fn lookup<'a, T, Z>(
    config: &'a ParserConfig<T, Z>,
    name: &str,
    position: Position,
) -> Result<&'a UnitDefinition<T, Z>, ParseError> {
    config.units.get(name).ok_or_else(|| invalid(name, position))
}

fn invalid(value: &str, position: Position) -> ParseError {
    ParseError::InvalidValue { value: value.to_owned(), position }
}
