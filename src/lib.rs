//! # challenge-runner
//!
//! Fetch, solve, and submit remote programming puzzles while keeping the
//! server-assigned session alive between requests.
//!
//! ## Features
//!
//! - Generic fetch → parse → solve → submit pipeline with multi-round support
//! - Cookie replay for HTTP puzzles, persistent connection for stream puzzles
//! - Linear recurrence and second-degree equation solvers
//! - Defaced QR code repair (finder pattern reconstruction) and decoding
//!
//! ## Example
//!
//! ```no_run
//! use challenge_runner::{PuzzleKind, PuzzleRunner};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = PuzzleRunner::new()?;
//!     let report = runner.run(PuzzleKind::ArithmeticProgression).await?;
//!     println!("{}", report.final_message().unwrap_or_default());
//!     Ok(())
//! }
//! ```

mod runner;

pub mod challenges;
pub mod config;
pub mod external_deps;
pub mod modules;

pub use crate::runner::{PuzzleRunner, PuzzleRunnerBuilder, RunnerError, RunnerResult};

pub use crate::config::{ConfigError, RunnerConfig, RunnerConfigBuilder};

pub use crate::challenges::core::{
    ChallengeHttpClient,
    ChallengeHttpResponse,
    ChallengeParseError,
    ChallengeRequest,
    CookieJar,
    FinderLayout,
    LineConnection,
    ReplayableSession,
    ReqwestChallengeHttpClient,
    TransportError,
    execute_request,
    repair_finder_patterns,
};

pub use crate::challenges::pipeline::{
    ChallengePipeline,
    PipelineError,
    PipelineReport,
    PipelineStage,
    RoundReport,
};

pub use crate::challenges::solvers::{
    ProtocolError,
    Puzzle,
    PuzzleError,
    PuzzleKind,
    arithmetic_progression::{ArithmeticProgressionPuzzle, ProgressionChallenge, Sign},
    qr_code::{QrChallenge, QrCodePuzzle, QrSolution},
    quadratic::{QuadraticChallenge, QuadraticPuzzle, QuadraticSolution, Roots},
};

pub use crate::external_deps::barcode::{BarcodeDecoder, DecodeError, RqrrBarcodeDecoder};

pub use crate::modules::{EventDispatcher, EventHandler, LoggingHandler, PipelineEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
