//! Round orchestration pipeline.
//!
//! Drives any [`Puzzle`] through `Fetching → Parsing → Solving → Submitting`
//! for the configured number of rounds on a single session, then reads the
//! closing message for puzzles that have one. There is no retry: the first failure ends the run
//! and is reported with the stage and round it happened in.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;

use crate::challenges::solvers::{Puzzle, PuzzleError};
use crate::modules::events::{
    EventDispatcher, FailureEvent, FinishedEvent, PipelineEvent, RoundEvent, StageEvent,
};

/// States of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Fetching,
    Parsing,
    Solving,
    Submitting,
    /// Reading the server's closing message after the last round.
    Closing,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_advance_to(&self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Fetching, Parsing)
            | (Parsing, Solving)
            | (Solving, Submitting)
            | (Submitting, Fetching)
            | (Submitting, Closing)
            | (Submitting, Done)
            | (Closing, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Fetching => "fetching",
            PipelineStage::Parsing => "parsing",
            PipelineStage::Solving => "solving",
            PipelineStage::Submitting => "submitting",
            PipelineStage::Closing => "reading closing message",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Pipeline failure, tagged with where it happened.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("puzzle '{0}' is configured with zero rounds")]
    NoRounds(&'static str),
    #[error("{puzzle}: {stage} failed in round {round}: {source}")]
    Stage {
        puzzle: &'static str,
        stage: PipelineStage,
        round: usize,
        #[source]
        source: PuzzleError,
    },
}

impl PipelineError {
    /// Stage the run was in when it failed.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            PipelineError::NoRounds(_) => None,
        }
    }

    pub fn puzzle_error(&self) -> Option<&PuzzleError> {
        match self {
            PipelineError::Stage { source, .. } => Some(source),
            PipelineError::NoRounds(_) => None,
        }
    }
}

/// Summary of one completed round.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: usize,
    pub challenge: String,
    pub solution: String,
    pub response: Option<Bytes>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub puzzle: &'static str,
    pub rounds: Vec<RoundReport>,
    pub closing: Option<Bytes>,
}

impl PipelineReport {
    /// The last thing the server said: the closing message when there is one,
    /// otherwise the response to the final submission.
    pub fn final_message(&self) -> Option<String> {
        self.closing
            .as_ref()
            .or_else(|| self.rounds.last().and_then(|round| round.response.as_ref()))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[derive(Debug)]
struct StageTracker {
    stage: PipelineStage,
    round: usize,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Fetching,
            round: 1,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "invalid transition {:?} -> {:?}",
            self.stage,
            next
        );
        self.stage = next;
    }
}

/// Runs one puzzle from session creation to the closing message.
pub struct ChallengePipeline<P: Puzzle> {
    puzzle: P,
    events: Arc<EventDispatcher>,
}

impl<P: Puzzle> ChallengePipeline<P> {
    /// Create a pipeline that logs its events.
    pub fn new(puzzle: P) -> Self {
        Self {
            puzzle,
            events: Arc::new(EventDispatcher::with_logging()),
        }
    }

    /// Replace the event dispatcher.
    pub fn with_events(mut self, events: Arc<EventDispatcher>) -> Self {
        self.events = events;
        self
    }

    pub fn puzzle(&self) -> &P {
        &self.puzzle
    }

    /// Execute every round on one session.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let name = self.puzzle.name();
        let rounds = self.puzzle.rounds();
        if rounds == 0 {
            return Err(PipelineError::NoRounds(name));
        }

        let started = Instant::now();
        let mut tracker = StageTracker::new();

        match self.drive(&mut tracker, rounds).await {
            Ok(report) => {
                tracker.advance(PipelineStage::Done);
                self.events.dispatch(PipelineEvent::Finished(FinishedEvent {
                    puzzle: name,
                    rounds: report.rounds.len(),
                    message: report.final_message(),
                    elapsed: started.elapsed(),
                    timestamp: Utc::now(),
                }));
                Ok(report)
            }
            Err(source) => {
                let stage = tracker.stage;
                tracker.advance(PipelineStage::Failed);
                self.events.dispatch(PipelineEvent::Failure(FailureEvent {
                    puzzle: name,
                    round: tracker.round,
                    stage,
                    error: source.to_string(),
                    timestamp: Utc::now(),
                }));
                Err(PipelineError::Stage {
                    puzzle: name,
                    stage,
                    round: tracker.round,
                    source,
                })
            }
        }
    }

    async fn drive(
        &self,
        tracker: &mut StageTracker,
        rounds: usize,
    ) -> Result<PipelineReport, PuzzleError> {
        let name = self.puzzle.name();
        let mut reports = Vec::with_capacity(rounds);

        self.announce(tracker);
        let mut session = self.puzzle.open().await?;

        for round in 1..=rounds {
            if round > 1 {
                tracker.round = round;
                self.enter(tracker, PipelineStage::Fetching);
            }
            let round_started = Instant::now();

            let payload = self.puzzle.fetch(&mut session).await?;

            self.enter(tracker, PipelineStage::Parsing);
            let challenge = self.puzzle.parse(&payload)?;

            self.enter(tracker, PipelineStage::Solving);
            let solution = self.puzzle.solve(&challenge)?;

            self.enter(tracker, PipelineStage::Submitting);
            let response = self.puzzle.submit(&mut session, &solution).await?;

            let report = RoundReport {
                round,
                challenge: format!("{challenge:?}"),
                solution: format!("{solution:?}"),
                response,
            };
            self.events.dispatch(PipelineEvent::Round(RoundEvent {
                puzzle: name,
                round,
                total_rounds: rounds,
                challenge: report.challenge.clone(),
                solution: report.solution.clone(),
                elapsed: round_started.elapsed(),
                timestamp: Utc::now(),
            }));
            reports.push(report);
        }

        let closing = if self.puzzle.has_closing_message() {
            self.enter(tracker, PipelineStage::Closing);
            self.puzzle.finish(&mut session).await?
        } else {
            None
        };

        Ok(PipelineReport {
            puzzle: name,
            rounds: reports,
            closing,
        })
    }

    fn enter(&self, tracker: &mut StageTracker, stage: PipelineStage) {
        tracker.advance(stage);
        self.announce(tracker);
    }

    fn announce(&self, tracker: &StageTracker) {
        self.events.dispatch(PipelineEvent::Stage(StageEvent {
            puzzle: self.puzzle.name(),
            round: tracker.round,
            stage: tracker.stage,
            timestamp: Utc::now(),
        }));
    }
}
