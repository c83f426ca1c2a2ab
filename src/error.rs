//! Parse and configuration errors.
//!
//! Two distinct failure families that must never be confused:
//!
//! - [`ParseError`]: bad *input*. Raised per call, carries the offending
//!   token so callers can surface it to whoever typed the expression.
//! - [`ConfigError`]: bad *configuration*. Raised once, at
//!   [`Parser::new`](crate::Parser::new), never on the parse path.

use std::fmt;

use thiserror::Error;

/// Segment of the expression grammar that failed value validation.
///
/// The four slots of `now[/unit][±N unit[/unit]]`, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    NowKeyword,
    NowRounding,
    Offset,
    FinalRounding,
}

impl Position {
    /// Stable tag used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Position::NowKeyword => "now-keyword",
            Position::NowRounding => "now-rounding",
            Position::Offset => "offset",
            Position::FinalRounding => "final-rounding",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an expression cannot be parsed. Fatal to the current call;
/// there are no partial results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The raw input does not match the expression grammar at all. Reported
    /// by the tokenizer; such input never reaches value resolution.
    #[error("invalid expression: '{value}'")]
    InvalidStructure { value: String },

    /// The structure is valid, but a token's value is not known to the
    /// parser's configuration (unknown now-keyword, or a unit missing from
    /// the unit table). `position` names the grammar segment that failed.
    #[error("invalid {position}: '{value}'")]
    InvalidValue { value: String, position: Position },
}

/// Raised by [`Parser::new`](crate::Parser::new) when the supplied
/// configuration cannot produce a working parser.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("now_aliases must not be empty")]
    EmptyNowAliases,
    #[error("units must not be empty")]
    EmptyUnits,
}
