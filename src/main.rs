use clap::Parser;
use smarttrader::cli::{log_level, run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(cli.config.as_deref())));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(cli)
}
