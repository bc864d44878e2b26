use std::fmt::{Debug, Display, Formatter};

use nom::IResult;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::error::{ErrorKind, FromExternalError, ParseError};
use nom::sequence::pair;

use crate::internal::common::error::AvailError;

pub enum ParserError<I> {
    Custom(String),
    Nom(I, ErrorKind),
}

impl<I: Debug> Debug for ParserError<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom(error) => f.write_fmt(format_args!("Semantic error at {error}")),
            Self::Nom(input, error) => f.write_fmt(format_args!(
                "Parser error at '{input:?}': expecting {error:?}"
            )),
        }
    }
}

impl<I> ParseError<I> for ParserError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        ParserError::Nom(input, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I: Display, E: Display> FromExternalError<I, E> for ParserError<I> {
    fn from_external_error(input: I, _: ErrorKind, error: E) -> Self {
        ParserError::Custom(format!("'{input}': {error}"))
    }
}

pub(crate) fn format_parse_error<I: Debug>(error: nom::Err<ParserError<I>>) -> AvailError {
    match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => AvailError::ParseError(format!("{e:?}")),
        nom::Err::Incomplete(_) => AvailError::ParseError("Incomplete input".to_string()),
    }
}

pub type NomResult<'a, Ret> = IResult<&'a str, Ret, ParserError<&'a str>>;

/// Runs `parser` and fails unless it consumed the whole input.
pub(crate) fn consume_all<'a, O, F>(parser: F, input: &'a str) -> crate::Result<O>
where
    F: FnMut(&'a str) -> NomResult<'a, O>,
{
    all_consuming(parser)(input)
        .map(|(_, output)| output)
        .map_err(format_parse_error)
}

/// Signed decimal integer without separators, e.g. `12` or `-3`.
/// Values that do not fit into `i64` are rejected.
pub(crate) fn p_i64(input: &str) -> NomResult<i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |number: &str| {
        number.parse::<i64>()
    })(input)
}

#[cfg(test)]
mod tests {
    use super::{consume_all, p_i64};

    #[test]
    fn test_parse_i64() {
        assert_eq!(consume_all(p_i64, "0").unwrap(), 0);
        assert_eq!(consume_all(p_i64, "1019").unwrap(), 1019);
        assert_eq!(consume_all(p_i64, "-4").unwrap(), -4);
    }

    #[test]
    fn test_parse_i64_invalid() {
        assert!(consume_all(p_i64, "").is_err());
        assert!(consume_all(p_i64, "x").is_err());
        assert!(consume_all(p_i64, "-").is_err());
        assert!(consume_all(p_i64, "1_000").is_err());
        assert!(consume_all(p_i64, "12 ").is_err());
    }

    #[test]
    fn test_parse_i64_overflow() {
        assert!(consume_all(p_i64, "9223372036854775807").is_ok());
        assert!(consume_all(p_i64, "9223372036854775808").is_err());
    }
}
