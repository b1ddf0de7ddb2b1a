//! Linear recurrence puzzle.
//!
//! The page describes `U(n+1) = [ A + U(n) ] ± [ n * B ]`, the value of `U(0)`
//! and the index to compute. The answer goes back as a query parameter on a
//! second URL, with the cookies issued by the first request.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::challenges::core::{
    ChallengeHttpClient, ChallengeParseError, ChallengeRequest, CookieJar, capture_token,
    execute_request, parse_token, payload_text,
};

use super::{ProtocolError, Puzzle, PuzzleError};

static A_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\s+(-?\d+)\s+\+").unwrap());
static B_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\s+(-?\d+)\s+\]").unwrap());
static SIGN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\s+(\S)\s+\[").unwrap());
static ZERO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"=\s+(-?\d+)").unwrap());
static N_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r">(-?\d+)<").unwrap());

/// Operator joining the two bracketed terms of the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl TryFrom<char> for Sign {
    type Error = ProtocolError;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        match symbol {
            '+' => Ok(Sign::Plus),
            '-' => Ok(Sign::Minus),
            other => Err(ProtocolError::UnknownSign(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionChallenge {
    pub zero_element: i64,
    pub a: i64,
    pub b: i64,
    pub sign: Sign,
    pub n: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionSolution {
    pub term: i64,
}

/// Extract the recurrence parameters from the three-line challenge page.
pub fn parse_progression(payload: &[u8]) -> Result<ProgressionChallenge, PuzzleError> {
    let text = payload_text(payload)?;
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() != 3 {
        return Err(ChallengeParseError::LineCount {
            expected: "3".into(),
            found: lines.len(),
        }
        .into());
    }

    let a = parse_token(capture_token(&A_RE, lines[0], "A")?, "A")?;
    let b = parse_token(capture_token(&B_RE, lines[0], "B")?, "B")?;
    let sign_token = capture_token(&SIGN_RE, lines[0], "sign")?;
    let symbol = sign_token
        .chars()
        .next()
        .ok_or(ChallengeParseError::MissingToken("sign"))?;
    let sign = Sign::try_from(symbol)?;
    let zero_element = parse_token(capture_token(&ZERO_RE, lines[1], "zero element")?, "zero element")?;
    let n = parse_token(capture_token(&N_RE, lines[2], "N")?, "N")?;

    Ok(ProgressionChallenge {
        zero_element,
        a,
        b,
        sign,
        n,
    })
}

/// Iterate the recurrence `n` times from `U(0)`.
///
/// Arithmetic wraps on overflow.
pub fn solve_progression(challenge: &ProgressionChallenge) -> ProgressionSolution {
    let mut u = challenge.zero_element;
    for k in 0..challenge.n {
        let base = challenge.a.wrapping_add(u);
        let step = (k as i64).wrapping_mul(challenge.b);
        u = match challenge.sign {
            Sign::Plus => base.wrapping_add(step),
            Sign::Minus => base.wrapping_sub(step),
        };
    }
    ProgressionSolution { term: u }
}

/// HTTP puzzle: GET the challenge, GET the submit URL with `?result=`.
pub struct ArithmeticProgressionPuzzle {
    client: Arc<dyn ChallengeHttpClient>,
    challenge_url: Url,
    submit_url: Url,
}

impl ArithmeticProgressionPuzzle {
    pub fn new(client: Arc<dyn ChallengeHttpClient>, challenge_url: Url, submit_url: Url) -> Self {
        Self {
            client,
            challenge_url,
            submit_url,
        }
    }
}

#[async_trait]
impl Puzzle for ArithmeticProgressionPuzzle {
    type Session = CookieJar;
    type Challenge = ProgressionChallenge;
    type Solution = ProgressionSolution;

    fn name(&self) -> &'static str {
        "arithmetic-progression"
    }

    async fn open(&self) -> Result<CookieJar, PuzzleError> {
        Ok(CookieJar::new())
    }

    async fn fetch(&self, session: &mut CookieJar) -> Result<Bytes, PuzzleError> {
        let request = ChallengeRequest::get(self.challenge_url.clone());
        let response = execute_request(self.client.as_ref(), session, request).await?;
        Ok(response.body)
    }

    fn parse(&self, payload: &[u8]) -> Result<ProgressionChallenge, PuzzleError> {
        parse_progression(payload)
    }

    fn solve(&self, challenge: &ProgressionChallenge) -> Result<ProgressionSolution, PuzzleError> {
        Ok(solve_progression(challenge))
    }

    async fn submit(
        &self,
        session: &mut CookieJar,
        solution: &ProgressionSolution,
    ) -> Result<Option<Bytes>, PuzzleError> {
        let request = ChallengeRequest::get(self.submit_url.clone())
            .with_query("result", &solution.term.to_string());
        let response = execute_request(self.client.as_ref(), session, request).await?;
        Ok(Some(response.body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "U<sub>n+1</sub> = [ 2 + U<sub>n</sub> ] + [ n * 3 ]<br />\n\
                        U<sub>0</sub> = 1<br />\n\
                        You must find U<sub>3</sub><br /><br />";

    fn challenge(zero_element: i64, a: i64, b: i64, sign: Sign, n: u64) -> ProgressionChallenge {
        ProgressionChallenge {
            zero_element,
            a,
            b,
            sign,
            n,
        }
    }

    #[test]
    fn parses_challenge_page() {
        let parsed = parse_progression(PAGE.as_bytes()).unwrap();
        assert_eq!(parsed, challenge(1, 2, 3, Sign::Plus, 3));
    }

    #[test]
    fn parses_negative_coefficients_and_minus_sign() {
        let page = "U<sub>n+1</sub> = [ -10 + U<sub>n</sub> ] - [ n * -4 ]<br />\n\
                    U<sub>0</sub> = -7<br />\n\
                    You must find U<sub>619325</sub><br /><br />";
        let parsed = parse_progression(page.as_bytes()).unwrap();
        assert_eq!(parsed, challenge(-7, -10, -4, Sign::Minus, 619_325));
    }

    #[test]
    fn wrong_line_count_is_a_format_error() {
        let err = parse_progression(b"only one line").unwrap_err();
        assert!(matches!(
            err,
            PuzzleError::Format(ChallengeParseError::LineCount { found: 1, .. })
        ));
    }

    #[test]
    fn missing_token_is_named() {
        let page = "U<sub>n+1</sub> = [ 2 + U<sub>n</sub> ] + [ n * 3 ]\nU0 is one\nfind U<sub>3</sub>";
        let err = parse_progression(page.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PuzzleError::Format(ChallengeParseError::MissingToken("zero element"))
        ));
    }

    #[test]
    fn negative_index_is_rejected() {
        let page = "U<sub>n+1</sub> = [ 2 + U<sub>n</sub> ] + [ n * 3 ]\nU0 = 1\nfind U<sub>-3</sub>";
        let err = parse_progression(page.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PuzzleError::Format(ChallengeParseError::InvalidToken { token: "N", .. })
        ));
    }

    #[test]
    fn unknown_sign_is_a_protocol_error() {
        assert_eq!(Sign::try_from('*'), Err(ProtocolError::UnknownSign('*')));

        let page = "U<sub>n+1</sub> = [ 2 + U<sub>n</sub> ] * [ n * 3 ]<br />\n\
                    U<sub>0</sub> = 1<br />\n\
                    You must find U<sub>3</sub><br /><br />";
        let err = parse_progression(page.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            PuzzleError::Protocol(ProtocolError::UnknownSign('*'))
        ));
    }

    #[test]
    fn worked_example() {
        let solution = solve_progression(&challenge(1, 2, 3, Sign::Plus, 3));
        assert_eq!(solution.term, 16);
    }

    #[test]
    fn zero_index_returns_zero_element() {
        let solution = solve_progression(&challenge(42, 5, 7, Sign::Minus, 0));
        assert_eq!(solution.term, 42);
    }

    #[test]
    fn matches_closed_form() {
        // U(n) = U(0) + n*A ± B*n(n-1)/2
        for &(z, a, b) in &[(1i64, 2i64, 3i64), (-7, -10, 4), (100, 0, -9)] {
            for n in [1u64, 2, 10, 1000] {
                let ni = n as i64;
                let tri = b * ni * (ni - 1) / 2;
                let plus = solve_progression(&challenge(z, a, b, Sign::Plus, n));
                let minus = solve_progression(&challenge(z, a, b, Sign::Minus, n));
                assert_eq!(plus.term, z + ni * a + tri);
                assert_eq!(minus.term, z + ni * a - tri);
            }
        }
    }
}
