use clap::Parser;

use deployhook::cli::{self, Cli, Commands, RunArgs};
use deployhook::error::Result;
use deployhook::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.load_config()?;

    let log_level_override = if cli.log_level.is_some() || cli.verbose || cli.quiet {
        Some(cli.log_level_to_str())
    } else {
        None
    };
    logging::init(log_level_override, cli.log_format_override(), Some(&config))?;

    match cli.command.clone().unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(_) => cli::run_server(config).await,
        Commands::Validate => cli::validate_config(config).await,
        Commands::Version => cli::show_version().await,
    }
}
