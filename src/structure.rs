//! Structural tokenizer.
//!
//! Splits an expression into raw string tokens, validating it against the
//! grammar but knowing nothing about which units or keywords a parser
//! accepts:
//!
//! ```text
//! expr := KEYWORD ( "/" UNIT )? ( SIGN DIGITS UNIT ( "/" UNIT )? )?
//! ```
//!
//! `KEYWORD` and `UNIT` are runs of Unicode letters and combining marks,
//! with no digits and no dashes. Digits are reserved for the offset amount and
//! `+`/`-` for its sign, so the token classes are disjoint and the grammar
//! has no ambiguity, while non-ASCII spellings (`сейчас`, `Woche`) tokenize
//! the same as ASCII ones. The whole input must match; a final rounding can
//! only follow an offset, so `now/d/mo` is rejected here, not downstream.

use crate::error::ParseError;

/// Untyped tokens split out of an expression. Unit names are still plain
/// strings at this stage; the resolver checks them against a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTokens {
    pub now_keyword: String,
    pub now_rounding: Option<String>,
    pub offset: Option<RawOffset>,
    /// Only ever present together with `offset`; the grammar has no slot
    /// for a trailing rounding otherwise.
    pub final_rounding: Option<String>,
}

/// A signed offset before unit resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOffset {
    pub amount: i64,
    pub unit: String,
}

/// Extract tokens from an expression. Validates grammar, not values.
///
/// # Errors
///
/// [`ParseError::InvalidStructure`] when the input does not match the
/// grammar end-to-end (including the empty string).
pub fn parse_structure(input: &str) -> Result<RawTokens, ParseError> {
    let rx = regex!(
        r"^([\p{L}\p{M}]+)(?:/([\p{L}\p{M}]+))?(?:([+-])([0-9]+)([\p{L}\p{M}]+)(?:/([\p{L}\p{M}]+))?)?$"
    );

    let fail = || ParseError::InvalidStructure { value: input.to_owned() };
    let caps = rx.captures(input).ok_or_else(fail)?;

    let offset = match (caps.get(3), caps.get(4), caps.get(5)) {
        (Some(sign), Some(digits), Some(unit)) => {
            // A digit run that overflows i64 cannot produce a usable
            // amount, so it fails the DIGITS production.
            let magnitude: i64 = digits.as_str().parse().map_err(|_| fail())?;
            let amount = if sign.as_str() == "-" { -magnitude } else { magnitude };
            Some(RawOffset { amount, unit: unit.as_str().to_owned() })
        }
        _ => None,
    };

    Ok(RawTokens {
        // Group 1 is non-optional; it participates in every match.
        now_keyword: caps[1].to_owned(),
        now_rounding: caps.get(2).map(|m| m.as_str().to_owned()),
        offset,
        final_rounding: caps.get(6).map(|m| m.as_str().to_owned()),
    })
}
