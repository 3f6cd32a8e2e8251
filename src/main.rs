mod activity;
mod check;
mod cli;
mod combine;
mod config;
mod counter;
mod error;
mod limits;
mod resolution;
mod trigger;

use anyhow::Result;
use std::io::IsTerminal;
use clap::error::ErrorKind;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use activity::TautulliClient;
use check::{CheckOutcome, TranscodeCheck};
use cli::Invocation;
use config::{Credentials, LimiterConfig};
use limits::LimitSpec;
use trigger::KillScript;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "limit_transcodes=debug"
    } else {
        "limit_transcodes=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let invocation = match cli::parse_invocation(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprint!("{}", e);
            anyhow::bail!("invalid command line");
        }
    };

    init_tracing(invocation.cli.verbose);

    if let Err(e) = run(invocation).await {
        if e.interrupted_check() {
            eprintln!("The check finished with errors and may not have been done properly.");
        }
        return Err(e.into());
    }
    Ok(())
}

async fn run(invocation: Invocation) -> Result<(), error::CheckError> {
    let Invocation { cli, forwarded } = invocation;

    let pairs = match cli.limit_pairs() {
        Ok(pairs) => pairs,
        Err(e) => {
            for (res, limit) in cli.resolutions.iter().zip(&cli.limitations) {
                eprintln!("  resolution {} / limitation {}", res, limit);
            }
            return Err(e);
        }
    };

    let credentials = Credentials::from_env()?;
    let config = LimiterConfig::load(cli.config.as_deref())?;
    let spec = LimitSpec::parse(&pairs)?;
    debug!("Checking {} limit(s), combine ratio {}", spec.pairs().len(), cli.combine);

    let source = TautulliClient::new(&credentials, &config.api_path)?;
    let trigger = KillScript::from_command(&config.kill_command)?;
    let check = TranscodeCheck::new(source, trigger, cli.combine);

    match check.run(&spec, &forwarded).await? {
        CheckOutcome::WithinLimits => {
            println!("All transcodes are within limits.");
        }
        CheckOutcome::KillTriggered { breach, output } => {
            debug!("kill script exit code {:?}", output.exit_code);
            println!("Limit reached ({}), kill script launched.", breach);
        }
    }
    Ok(())
}
