//! Puzzle registry.
//!
//! Each submodule implements one puzzle kind end to end: how to open a
//! session, fetch and parse the challenge, compute the answer, and submit it.

pub mod arithmetic_progression;
pub mod qr_code;
pub mod quadratic;

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::challenges::core::{ChallengeParseError, TransportError};
use crate::external_deps::barcode::DecodeError;

/// One puzzle kind, driven round by round by the pipeline.
///
/// The session type is opaque to the pipeline: a cookie jar for HTTP puzzles,
/// an open connection for stream puzzles.
#[async_trait]
pub trait Puzzle: Send + Sync {
    type Session: Send;
    type Challenge: Debug + Send + Sync;
    type Solution: Debug + Send + Sync;

    fn name(&self) -> &'static str;

    /// Number of fetch/solve/submit cycles to run on one session.
    fn rounds(&self) -> usize {
        1
    }

    /// Create the session for a new run.
    async fn open(&self) -> Result<Self::Session, PuzzleError>;

    /// Retrieve the raw challenge payload.
    async fn fetch(&self, session: &mut Self::Session) -> Result<Bytes, PuzzleError>;

    /// Extract a typed challenge from the raw payload.
    fn parse(&self, payload: &[u8]) -> Result<Self::Challenge, PuzzleError>;

    /// Compute the answer.
    fn solve(&self, challenge: &Self::Challenge) -> Result<Self::Solution, PuzzleError>;

    /// Send the answer, returning the server's response if one is read at this point.
    async fn submit(
        &self,
        session: &mut Self::Session,
        solution: &Self::Solution,
    ) -> Result<Option<Bytes>, PuzzleError>;

    /// Whether the server sends a closing message after the last round.
    /// Only then does the pipeline enter its closing stage and call [`Puzzle::finish`].
    fn has_closing_message(&self) -> bool {
        false
    }

    /// Read the server's closing message after the last round.
    async fn finish(&self, session: &mut Self::Session) -> Result<Option<Bytes>, PuzzleError> {
        let _ = session;
        Ok(None)
    }
}

/// Unexpected protocol shapes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown sign symbol {0:?}")]
    UnknownSign(char),
}

/// Failure kinds a puzzle stage can raise.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("format error: {0}")]
    Format(#[from] ChallengeParseError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Identifies the available puzzle kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleKind {
    ArithmeticProgression,
    Quadratic,
    QrCode,
}

impl PuzzleKind {
    pub const ALL: [PuzzleKind; 3] = [
        PuzzleKind::ArithmeticProgression,
        PuzzleKind::Quadratic,
        PuzzleKind::QrCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PuzzleKind::ArithmeticProgression => "arithmetic-progression",
            PuzzleKind::Quadratic => "quadratic",
            PuzzleKind::QrCode => "qr-code",
        }
    }
}

impl std::fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PuzzleKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PuzzleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("unknown puzzle kind '{value}'"))
    }
}
