use anyhow::Result;
use auditor::cli::Cli;
use auditor::config::Config;
use auditor::run;
use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = match Config::load(cli.config.as_deref()) {
        Ok(Some(config)) => config.merge_with_cli(&cli),
        Ok(None) => cli,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
            std::process::exit(1);
        }
    };

    let default_filter = if args.verbose {
        "auditor=debug"
    } else {
        "auditor=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", "Error:".bright_red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
