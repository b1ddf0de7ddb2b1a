//! Second-degree equation puzzle over a raw TCP connection.
//!
//! Each round the server pushes a few lines of text whose second-to-last line
//! reads `<label>: <A>x² ± <B>x ± <C> = <D>`. The client replies with the real
//! roots on a single line. After the last round the server sends a closing
//! message with the flag.

use std::cmp::Ordering;

use async_trait::async_trait;
use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::net::TcpStream;

use crate::challenges::core::{ChallengeParseError, LineConnection, parse_token, payload_text};

use super::{Puzzle, PuzzleError};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[+-]?\s?[0-9]+").unwrap());

/// Coefficients of `a·x² + b·x + c = 0`, with `a ≠ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadraticChallenge {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

/// Real roots; with two, the `+√D` branch comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roots {
    None,
    One(f64),
    Two(f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticSolution {
    pub roots: Roots,
}

impl QuadraticSolution {
    /// Render the answer line expected by the server, without the newline.
    pub fn wire_line(&self) -> String {
        match self.roots {
            Roots::None => "Not possible".to_string(),
            Roots::One(x) => format!("x: {}", format_root(x)),
            Roots::Two(x1, x2) => format!("x1: {} ; x2: {}", format_root(x1), format_root(x2)),
        }
    }
}

/// Extract the coefficients from one server message.
///
/// The right-hand side constant is folded into `c`.
pub fn parse_quadratic(payload: &[u8]) -> Result<QuadraticChallenge, PuzzleError> {
    let text = payload_text(payload)?;
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() < 2 {
        return Err(ChallengeParseError::LineCount {
            expected: "at least 2".into(),
            found: lines.len(),
        }
        .into());
    }

    let (_, equation) = lines[lines.len() - 2]
        .split_once(": ")
        .ok_or(ChallengeParseError::MissingToken("equation"))?;

    let tokens: Vec<&str> = NUMBER_RE
        .find_iter(equation)
        .take(4)
        .map(|m| m.as_str())
        .collect();
    if tokens.len() != 4 {
        return Err(ChallengeParseError::InvalidToken {
            token: "equation",
            value: equation.to_string(),
        }
        .into());
    }

    let a: i64 = parse_token(tokens[0], "a")?;
    let b: i64 = parse_token(tokens[1], "b")?;
    let c: i64 = parse_token(tokens[2], "c")?;
    let rhs: i64 = parse_token(tokens[3], "right-hand side")?;

    if a == 0 {
        return Err(ChallengeParseError::InvalidToken {
            token: "a",
            value: tokens[0].to_string(),
        }
        .into());
    }

    let c = c
        .checked_sub(rhs)
        .ok_or_else(|| ChallengeParseError::InvalidToken {
            token: "c",
            value: equation.to_string(),
        })?;

    Ok(QuadraticChallenge { a, b, c })
}

/// Compute the real roots.
///
/// The discriminant is exact (`i128`) whenever `4ac` fits; only the roots are
/// floating point.
pub fn solve_quadratic(challenge: &QuadraticChallenge) -> QuadraticSolution {
    let two_a = 2.0 * challenge.a as f64;
    let minus_b = -(challenge.b as f64);

    let roots = match discriminant(challenge) {
        (Ordering::Greater, value) => {
            let sqrt_d = value.sqrt();
            Roots::Two((minus_b + sqrt_d) / two_a, (minus_b - sqrt_d) / two_a)
        }
        (Ordering::Equal, _) => Roots::One(minus_b / two_a),
        (Ordering::Less, _) => Roots::None,
    };

    QuadraticSolution { roots }
}

/// Sign and magnitude of `b² - 4ac`.
///
/// `4ac` overflows `i128` only for coefficients near `i64::MIN`/`i64::MAX`;
/// those fall back to `f64`.
fn discriminant(challenge: &QuadraticChallenge) -> (Ordering, f64) {
    let a = i128::from(challenge.a);
    let b = i128::from(challenge.b);
    let c = i128::from(challenge.c);

    let exact = (4 * a)
        .checked_mul(c)
        .and_then(|four_ac| (b * b).checked_sub(four_ac));
    if let Some(value) = exact {
        return (value.cmp(&0), value as f64);
    }

    let (a, b, c) = (challenge.a as f64, challenge.b as f64, challenge.c as f64);
    let value = b * b - 4.0 * a * c;
    let sign = if value > 0.0 {
        Ordering::Greater
    } else if value == 0.0 {
        Ordering::Equal
    } else {
        Ordering::Less
    };
    (sign, value)
}

/// Three decimals, trailing zeros and dot removed.
pub fn format_root(value: f64) -> String {
    let fixed = format!("{value:.3}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Multi-round TCP puzzle.
pub struct QuadraticPuzzle {
    addr: String,
    rounds: usize,
    read_buffer: usize,
}

impl QuadraticPuzzle {
    pub fn new(addr: impl Into<String>, rounds: usize, read_buffer: usize) -> Self {
        Self {
            addr: addr.into(),
            rounds,
            read_buffer,
        }
    }
}

#[async_trait]
impl Puzzle for QuadraticPuzzle {
    type Session = LineConnection<TcpStream>;
    type Challenge = QuadraticChallenge;
    type Solution = QuadraticSolution;

    fn name(&self) -> &'static str {
        "quadratic"
    }

    fn rounds(&self) -> usize {
        self.rounds
    }

    async fn open(&self) -> Result<Self::Session, PuzzleError> {
        Ok(LineConnection::<TcpStream>::connect(self.addr.as_str(), self.read_buffer).await?)
    }

    async fn fetch(&self, session: &mut Self::Session) -> Result<Bytes, PuzzleError> {
        Ok(session.read_chunk().await?)
    }

    fn parse(&self, payload: &[u8]) -> Result<QuadraticChallenge, PuzzleError> {
        parse_quadratic(payload)
    }

    fn solve(&self, challenge: &QuadraticChallenge) -> Result<QuadraticSolution, PuzzleError> {
        Ok(solve_quadratic(challenge))
    }

    async fn submit(
        &self,
        session: &mut Self::Session,
        solution: &QuadraticSolution,
    ) -> Result<Option<Bytes>, PuzzleError> {
        session.send_line(&solution.wire_line()).await?;
        Ok(None)
    }

    fn has_closing_message(&self) -> bool {
        true
    }

    async fn finish(&self, session: &mut Self::Session) -> Result<Option<Bytes>, PuzzleError> {
        let closing = session.read_chunk().await?;
        if let Err(err) = session.shutdown().await {
            log::debug!("quadratic: shutdown after closing message failed: {err}");
        }
        Ok(Some(closing))
    }
}
