use std::str;

use memchr::memchr;

use crate::decimal::Decimal;
use crate::error::ParseError;

pub const DELIMITER: u8 = b';';

/// One `key;value` record borrowed from a reader line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRecord<'a> {
    pub key: &'a str,
    pub value: Decimal,
}

/// Split a line (terminator already removed) at its first `;`.
///
/// Bytes are taken as-is: no trimming and no case folding, so `" 1.0"` or a
/// trailing `\r` makes the value invalid. The value must be a plain decimal
/// (see [`Decimal::parse`]).
pub fn parse_line(line: &[u8]) -> Result<RawRecord<'_>, ParseError> {
    let semi = memchr(DELIMITER, line).ok_or(ParseError::MissingDelimiter)?;
    let (key, rest) = (&line[..semi], &line[semi + 1..]);
    if key.is_empty() {
        return Err(ParseError::EmptyKey);
    }
    let key = str::from_utf8(key).map_err(|_| ParseError::InvalidUtf8)?;
    Ok(RawRecord {
        key,
        value: parse_value(rest)?,
    })
}

fn parse_value(bytes: &[u8]) -> Result<Decimal, ParseError> {
    Decimal::parse(bytes)
        .ok_or_else(|| ParseError::InvalidNumber(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_key_and_value() {
        let r = parse_line(b"Hamburg;12.0").unwrap();
        assert_eq!(r.key, "Hamburg");
        assert_eq!(r.value, Decimal::from(12));

        let r = parse_line("São Paulo;-3.5".as_bytes()).unwrap();
        assert_eq!(r.key, "São Paulo");
        assert_eq!(r.value, Decimal::new(-35, 1));
    }

    #[test]
    fn only_first_delimiter_splits() {
        assert_eq!(
            parse_line(b"a;b;1.0"),
            Err(ParseError::InvalidNumber("b;1.0".into()))
        );
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse_line(b"no delimiter"), Err(ParseError::MissingDelimiter));
        assert_eq!(parse_line(b""), Err(ParseError::MissingDelimiter));
        assert_eq!(parse_line(b";1.0"), Err(ParseError::EmptyKey));
        assert_eq!(parse_line(b"k;"), Err(ParseError::InvalidNumber(String::new())));
        assert_eq!(parse_line(b"k;abc"), Err(ParseError::InvalidNumber("abc".into())));
        assert_eq!(parse_line(b"\xff;1.0"), Err(ParseError::InvalidUtf8));
    }

    #[test]
    fn does_not_trim() {
        assert!(parse_line(b"k; 1.0").is_err());
        assert!(parse_line(b"k;1.0\r").is_err());
        assert_eq!(parse_line(b" k;1.0").unwrap().key, " k");
    }

    #[test]
    fn rejects_non_decimal_values() {
        assert!(parse_line(b"k;NaN").is_err());
        assert!(parse_line(b"k;inf").is_err());
        assert!(parse_line(b"k;1e3").is_err());
        assert_eq!(parse_line(b"k;-0.10").unwrap().value, Decimal::new(-1, 1));
    }
}
