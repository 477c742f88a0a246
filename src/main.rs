use clap::Parser;
use tracing_subscriber::EnvFilter;

use region_index::{cli, web};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("region_index=debug,info")
    } else {
        EnvFilter::new("region_index=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Create(args) => {
            cli::store::run_create(args, cli.format)?;
        }
        cli::Commands::Load(args) => {
            cli::load::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Query(args) => {
            cli::query::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Registry(args) => {
            cli::registry::run(args, cli.format)?;
        }
        cli::Commands::Consolidate(args) => {
            cli::store::run_consolidate(args, cli.format)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
