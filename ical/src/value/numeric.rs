// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integer parsers used by the recurrence rule parts.

use chumsky::Parser;
use chumsky::extra::ParserExtra;
use chumsky::label::LabelError;
use chumsky::prelude::*;

use crate::value::miscellaneous::ValueExpected;

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// integer    = (["+"] / "-") 1*DIGIT
/// ```
pub(crate) fn value_integer<'src, I, E>() -> impl Parser<'src, I, i32, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    sign()
        .or_not()
        .then(digits())
        .try_map_with(|(sign, digits), e| {
            let capacity = sign.map_or(0, |_| 1) + digits.len();
            let mut int_str = String::with_capacity(capacity);
            if let Some(s) = sign {
                int_str.push(s);
            }
            int_str.push_str(&digits);

            let n = match lexical::parse_partial::<i32, _>(&int_str) {
                Ok((v, n)) if n == int_str.len() => return Ok(v),
                Ok((_, n)) => n,
                Err(_) => 0,
            };
            Err(E::Error::expected_found(
                [ValueExpected::I32],
                int_str.chars().nth(n).map(Into::into),
                e.span(),
            ))
        })
}

/// Integer multiple values parser.
///
/// BY* rule parts carry a COMMA-separated list of at least one integer.
pub(crate) fn values_integer<'src, I, E>() -> impl Parser<'src, I, Vec<i32>, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_integer().separated_by(just(',')).at_least(1).collect()
}

/// Unsigned integer as used by COUNT and INTERVAL.
///
/// ```txt
/// 1*DIGIT
/// ```
pub(crate) fn value_unsigned<'src, I, E>() -> impl Parser<'src, I, u32, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    digits().try_map_with(|digits, e| {
        let n = match lexical::parse_partial::<u32, _>(&digits) {
            Ok((v, n)) if n == digits.len() => return Ok(v),
            Ok((_, n)) => n,
            Err(_) => 0,
        };
        Err(E::Error::expected_found(
            [ValueExpected::U32],
            digits.chars().nth(n).map(Into::into),
            e.span(),
        ))
    })
}

fn digits<'src, I, E>() -> impl Parser<'src, I, String, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    select! { c @ '0'..='9' => c }
        .repeated()
        .at_least(1)
        .collect::<String>()
}

const fn sign<'src, I, E>() -> impl Parser<'src, I, char, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    select! { c @ ('+' | '-') => c }
}

#[cfg(test)]
mod tests {
    use crate::value::miscellaneous::parse_complete;

    use super::*;

    #[test]
    fn parses_integer() {
        fn parse(src: &str) -> Result<i32, String> {
            parse_complete(value_integer::<'_, _, extra::Err<_>>(), src)
        }

        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 5545 Section 3.3.8
            ("1234567890", 1_234_567_890),
            ("-1234567890", -1_234_567_890),
            ("+1234567890", 1_234_567_890),
            // extra tests
            ( "0", 0),
            ("+0", 0),
            ("-0", 0),
            ("-31", -31),
            ("+2147483647",  2_147_483_647), // i32 max
            ("-2147483648", -2_147_483_648), // i32 min
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse(src).unwrap(), expected, "Failed for {src}");
        }

        let fail_cases = [
            "+2147483648",          // i32 max + 1
            "12345678901234567890", // overflow, too long
            "+",                    // missing digits
            "",                     // empty string
            "12a34",                // invalid character
            "1.5",                  // not an integer
        ];
        for src in fail_cases {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_integer_list() {
        fn parse(src: &str) -> Result<Vec<i32>, String> {
            parse_complete(values_integer::<'_, _, extra::Err<_>>(), src)
        }

        assert_eq!(parse("1").unwrap(), vec![1]);
        assert_eq!(parse("1,-1,+15").unwrap(), vec![1, -1, 15]);

        for src in ["", ",", "1,", ",1", "1,,2", "1;2", "MO"] {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_unsigned() {
        fn parse(src: &str) -> Result<u32, String> {
            parse_complete(value_unsigned::<'_, _, extra::Err<_>>(), src)
        }

        assert_eq!(parse("0").unwrap(), 0);
        assert_eq!(parse("010").unwrap(), 10);
        assert_eq!(parse("4294967295").unwrap(), u32::MAX);

        for src in ["", "+1", "-1", "4294967296", "1x"] {
            assert!(parse(src).is_err(), "Parse {src} should fail");
        }
    }
}
