use std::process::ExitCode;

use challenge_runner::{PuzzleKind, PuzzleRunner, RunnerConfig, RunnerError, VERSION};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(kind) = std::env::args().nth(1) else {
        eprintln!("challenge-runner {VERSION}");
        eprintln!(
            "usage: challenge-runner <{}>",
            PuzzleKind::ALL.map(|kind| kind.as_str()).join("|")
        );
        return ExitCode::from(2);
    };

    let kind: PuzzleKind = match kind.parse() {
        Ok(kind) => kind,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::from(2);
        }
    };

    let runner = match RunnerConfig::from_env()
        .map_err(RunnerError::from)
        .and_then(|config| PuzzleRunner::builder().with_config(config).build())
    {
        Ok(runner) => runner,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match runner.run(kind).await {
        Ok(report) => {
            if let Some(message) = report.final_message() {
                println!("{message}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
