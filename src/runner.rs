//! High level runner.
//!
//! Wires the configured endpoints, the HTTP transport, and the barcode decoder
//! into the puzzle implementations and drives the selected one through the
//! round pipeline.

use std::sync::Arc;

use thiserror::Error;

use crate::challenges::core::{ChallengeHttpClient, ReqwestChallengeHttpClient, TransportError};
use crate::challenges::pipeline::{ChallengePipeline, PipelineError, PipelineReport};
use crate::challenges::solvers::{
    Puzzle, PuzzleKind, arithmetic_progression::ArithmeticProgressionPuzzle,
    qr_code::QrCodePuzzle, quadratic::QuadraticPuzzle,
};
use crate::config::{ConfigError, RunnerConfig};
use crate::external_deps::barcode::{BarcodeDecoder, RqrrBarcodeDecoder};
use crate::modules::events::{EventDispatcher, EventHandler};

/// Result alias used across the orchestration layer.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// High-level error surfaced by the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("transport initialisation failed: {0}")]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Fluent builder for [`PuzzleRunner`].
#[derive(Default)]
pub struct PuzzleRunnerBuilder {
    config: Option<RunnerConfig>,
    client: Option<Arc<dyn ChallengeHttpClient>>,
    decoder: Option<Arc<dyn BarcodeDecoder>>,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl PuzzleRunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the reqwest transport, e.g. with a stub in tests.
    pub fn with_http_client(mut self, client: Arc<dyn ChallengeHttpClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn BarcodeDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Register an extra event handler next to the logging one.
    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn build(self) -> RunnerResult<PuzzleRunner> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let client: Arc<dyn ChallengeHttpClient> = match self.client {
            Some(client) => client,
            None => Arc::new(ReqwestChallengeHttpClient::with_user_agent(
                config.user_agent.as_deref(),
            )?),
        };
        let decoder: Arc<dyn BarcodeDecoder> = match self.decoder {
            Some(decoder) => decoder,
            None => Arc::new(RqrrBarcodeDecoder::new()),
        };

        let mut events = EventDispatcher::with_logging();
        for handler in self.handlers {
            events.register_handler(handler);
        }

        Ok(PuzzleRunner {
            config,
            client,
            decoder,
            events: Arc::new(events),
        })
    }
}

/// Main runner.
pub struct PuzzleRunner {
    config: RunnerConfig,
    client: Arc<dyn ChallengeHttpClient>,
    decoder: Arc<dyn BarcodeDecoder>,
    events: Arc<EventDispatcher>,
}

impl PuzzleRunner {
    /// Construct a runner with default configuration.
    pub fn new() -> RunnerResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> PuzzleRunnerBuilder {
        PuzzleRunnerBuilder::new()
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run one puzzle to completion.
    pub async fn run(&self, kind: PuzzleKind) -> RunnerResult<PipelineReport> {
        match kind {
            PuzzleKind::ArithmeticProgression => {
                self.run_puzzle(self.arithmetic_progression()).await
            }
            PuzzleKind::Quadratic => self.run_puzzle(self.quadratic()).await,
            PuzzleKind::QrCode => self.run_puzzle(self.qr_code()).await,
        }
    }

    pub fn arithmetic_progression(&self) -> ArithmeticProgressionPuzzle {
        ArithmeticProgressionPuzzle::new(
            self.client.clone(),
            self.config.progression_url.clone(),
            self.config.progression_submit_url.clone(),
        )
    }

    pub fn quadratic(&self) -> QuadraticPuzzle {
        QuadraticPuzzle::new(
            self.config.quadratic_addr.clone(),
            self.config.quadratic_rounds,
            self.config.read_buffer_size,
        )
    }

    pub fn qr_code(&self) -> QrCodePuzzle {
        QrCodePuzzle::new(
            self.client.clone(),
            self.decoder.clone(),
            self.config.qr_url.clone(),
        )
        .with_layout(self.config.finder_layout)
    }

    async fn run_puzzle<P: Puzzle>(&self, puzzle: P) -> RunnerResult<PipelineReport> {
        log::info!("starting {} ({} round(s))", puzzle.name(), puzzle.rounds());
        let pipeline = ChallengePipeline::new(puzzle).with_events(self.events.clone());
        Ok(pipeline.run().await?)
    }
}
