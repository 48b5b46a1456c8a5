//! Policy generator CLI

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use policygen_driver::{BundleGenerator, Driver, DriverOptions, ExitPolicy, Mode, StdinSource};

#[derive(Parser, Debug)]
#[command(name = "policygen")]
#[command(about = "Generate resources from generator configs or a KRM ResourceList")]
#[command(version)]
struct Args {
    /// Generator config files. Without any, a ResourceList is read from stdin.
    #[arg(value_name = "GENERATOR_CONFIG")]
    configs: Vec<PathBuf>,

    /// Print the stack trace with error messages
    #[arg(long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    // stdout carries the generated resources, so logs go to stderr
    let default_filter = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let policy = ExitPolicy::new(args.debug);
    let mode = Mode::select(args.configs);
    let driver = Driver::new(BundleGenerator::new(), DriverOptions::new());

    let mut stdin = StdinSource::new();
    let mut stdout = io::stdout().lock();

    if let Err(e) = driver.run(mode, &mut stdin, &mut stdout) {
        tracing::debug!(error = ?e, "run failed");
        policy.fail(e);
    }
}
