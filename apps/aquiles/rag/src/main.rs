//! Aquiles-RAG
//!
//! Stores text chunks with their embeddings in Redis Stack and answers
//! nearest-neighbour queries over them.

use clap::Parser;
use core_config::Environment;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::Result;

mod cli;
mod config;
mod server;

use cli::{Cli, Commands};
use config::{AquilesConfig, config_path};

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    init_tracing(&Environment::from_env());

    match cli.command {
        Commands::Serve { host, port } => server::run(host, port).await?,

        Commands::Configs(args) => {
            let path = config_path()?;
            let mut config = AquilesConfig::load(&path)?;
            args.apply(&mut config);
            config.save(&path)?;
            println!("Configuration saved to {}", path.display());
        }
    }

    Ok(())
}
