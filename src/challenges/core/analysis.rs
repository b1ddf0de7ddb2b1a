//! Challenge payload parsing helpers.
//!
//! Every puzzle page or protocol message has a fixed layout known in advance.
//! These helpers carve typed tokens out of that text and report which token
//! was missing when the layout does not match.

use std::str::FromStr;

use regex::Regex;
use thiserror::Error;

/// Outcomes when a challenge payload does not have the expected layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChallengeParseError {
    #[error("payload is not valid utf-8")]
    NotUtf8,
    #[error("expected {expected} lines, found {found}")]
    LineCount { expected: String, found: usize },
    #[error("unable to locate {0}")]
    MissingToken(&'static str),
    #[error("invalid value for {token}: {value:?}")]
    InvalidToken { token: &'static str, value: String },
}

/// Interpret a payload as UTF-8 text.
pub fn payload_text(payload: &[u8]) -> Result<&str, ChallengeParseError> {
    std::str::from_utf8(payload).map_err(|_| ChallengeParseError::NotUtf8)
}

/// Return the first capture group of `pattern` in `haystack`.
pub fn capture_token<'h>(
    pattern: &Regex,
    haystack: &'h str,
    token: &'static str,
) -> Result<&'h str, ChallengeParseError> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ChallengeParseError::MissingToken(token))
}

/// Parse a captured token, ignoring interior and surrounding whitespace.
pub fn parse_token<T: FromStr>(raw: &str, token: &'static str) -> Result<T, ChallengeParseError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .parse()
        .map_err(|_| ChallengeParseError::InvalidToken {
            token,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_reports_missing_token_name() {
        let re = Regex::new(r"=\s+(-?\d+)").unwrap();
        assert_eq!(capture_token(&re, "U0 = -7", "zero element"), Ok("-7"));
        assert_eq!(
            capture_token(&re, "U0 is seven", "zero element"),
            Err(ChallengeParseError::MissingToken("zero element"))
        );
    }

    #[test]
    fn parse_token_strips_sign_spacing() {
        assert_eq!(parse_token::<i64>("- 13", "c"), Ok(-13));
        assert_eq!(parse_token::<i64>("+ 4", "b"), Ok(4));
        assert!(matches!(
            parse_token::<u64>("-3", "n"),
            Err(ChallengeParseError::InvalidToken { token: "n", .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_eq!(payload_text(&[0xff, 0xfe]), Err(ChallengeParseError::NotUtf8));
    }
}
