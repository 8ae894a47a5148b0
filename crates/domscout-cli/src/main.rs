//! Domscout CLI
//!
//! Usage:
//!   domscout discover --url <URL>           Scan a page
//!   domscout discover --env qa --smart      Scan a named environment
//!   domscout config                         Show effective configuration

use clap::Parser;
use domscout_cli::{
    handlers, init_logging, load_config, render, Cli, CliError, CliResult, Commands,
    DiscoverArgs, Reporter, Verbosity,
};
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    init_logging(verbosity);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Discover(ref args) => run_discover(&cli, config, args, verbosity),
        Commands::Config(ref args) => {
            print!("{}", handlers::execute_config(&config, args)?);
            Ok(())
        }
    }
}

fn run_discover(
    cli: &Cli,
    config: domscout::DiscoveryConfig,
    args: &DiscoverArgs,
    verbosity: Verbosity,
) -> CliResult<()> {
    let (config, request) = handlers::prepare_discover(config, args)?;
    info!(url = %request.url, smart = request.smart, "starting discovery");

    let use_color = cli.color.should_color();
    let mut reporter = Reporter::new(use_color, verbosity.is_quiet());

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("failed to start async runtime: {e}")))?;

    reporter.start(&format!("Scanning {}", request.url));
    let result = runtime.block_on(handlers::execute_discover(config, &request));
    reporter.finish();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            reporter.failure(&format!("discovery of {} failed", request.url));
            return Err(e);
        }
    };

    println!("{}", render(&outcome, args.format, use_color)?);
    reporter.success(&format!("{} element(s) discovered", outcome.len()));
    Ok(())
}
