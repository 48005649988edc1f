use crate::errors::ArgumentError;
use crate::session::SourceLocation;
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_till1};
use nom::character::complete::{char, digit1, hex_digit1};
use nom::combinator::{all_consuming, cut, map, map_res, opt, recognize};
use nom::error::ErrorKind;
use nom::sequence::{pair, preceded, separated_pair};
use nom::IResult;

/// Splits a raw input line into its command token and the remaining arguments.
///
/// Returns `None` for empty or whitespace-only lines.
pub fn tokenize(line: &str) -> Option<(&str, CommandArguments)> {
    let mut tokens = line.split_whitespace();
    let command = tokens.next()?;
    Some((command, CommandArguments::new(tokens)))
}

/// Positional cursor over the tokens following the command token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArguments {
    tokens: Vec<String>,
    position: usize,
}

impl CommandArguments {
    pub fn new<I, S>(tokens: I) -> CommandArguments
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandArguments {
            tokens: tokens.into_iter().map(Into::into).collect(),
            position: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.position < self.tokens.len()
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    pub fn try_next_string(&mut self) -> Option<String> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    pub fn next_string(&mut self, expected: &'static str) -> Result<String, ArgumentError> {
        self.try_next_string()
            .ok_or(ArgumentError::Missing { expected })
    }

    /// Reads an integer literal: decimal (optionally negative), or hexadecimal
    /// prefixed with `0x` or `$`.
    pub fn next_integer<T>(&mut self, expected: &'static str) -> Result<T, ArgumentError>
    where
        T: TryFrom<i64>,
    {
        let token = self.next_string(expected)?;
        // a MapRes failure means the digits were well formed but overflowed i64
        let parsed = all_consuming(parse_literal_i64)(token.as_str())
            .map(|(_, value)| value)
            .map_err(|e| {
                matches!(e, nom::Err::Error(ref inner) | nom::Err::Failure(ref inner)
                    if inner.code == ErrorKind::MapRes)
            });
        let value = match parsed {
            Ok(value) => value,
            Err(true) => return Err(ArgumentError::OutOfRange { token }),
            Err(false) => return Err(ArgumentError::Invalid { expected, token }),
        };
        T::try_from(value).map_err(|_| ArgumentError::OutOfRange { token })
    }

    /// Reads a `file:line` source location.
    pub fn next_location(&mut self) -> Result<SourceLocation, ArgumentError> {
        const EXPECTED: &str = "a location <file>:<line>";

        let token = self.next_string(EXPECTED)?;
        let parsed = all_consuming(parse_location)(token.as_str())
            .map(|(_, location)| location)
            .ok();
        match parsed {
            Some(location) => Ok(location),
            None => Err(ArgumentError::Invalid {
                expected: EXPECTED,
                token,
            }),
        }
    }

    /// Consumes every remaining token, joined by single spaces.
    pub fn rest(&mut self, expected: &'static str) -> Result<String, ArgumentError> {
        if !self.has_next() {
            return Err(ArgumentError::Missing { expected });
        }
        let rest = self.tokens[self.position..].join(" ");
        self.position = self.tokens.len();
        Ok(rest)
    }

    pub fn rest_vec(&mut self) -> Vec<String> {
        let rest = self.tokens[self.position..].to_vec();
        self.position = self.tokens.len();
        rest
    }
}

//
// literal parsers
//

fn parse_literal_i64(input: &str) -> IResult<&str, i64> {
    alt((parse_hex_literal_i64, parse_decimal_literal_i64))(input)
}

// once the prefix matched the literal is hex, so digit errors must not fall
// through to the decimal parser
fn parse_hex_literal_i64(input: &str) -> IResult<&str, i64> {
    preceded(
        alt((tag_no_case("0x"), tag("$"))),
        cut(map_res(hex_digit1, |digits: &str| i64::from_str_radix(digits, 16))),
    )(input)
}

fn parse_decimal_literal_i64(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |digits: &str| {
        digits.parse::<i64>()
    })(input)
}

fn parse_location(input: &str) -> IResult<&str, SourceLocation> {
    map(
        separated_pair(
            take_till1(|c: char| c == ':'),
            char(':'),
            map_res(digit1, |digits: &str| digits.parse::<u32>()),
        ),
        |(file, line): (&str, u32)| SourceLocation {
            file: file.to_string(),
            line,
        },
    )(input)
}
