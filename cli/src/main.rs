use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use textbin::config::{parse_url, ClientConfig};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "textbin", version)]
#[command(about = "Create, read and browse TextBin documents", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "TEXTBIN_CONFIG")]
    config: Option<PathBuf>,

    /// Root URL of the document API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Public site URL used for share links
    #[arg(long, global = true)]
    site_url: Option<String>,

    /// File holding saved documents
    #[arg(long, global = true)]
    bookmarks: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a document and save it locally
    Create(commands::CreateArgs),

    /// Read a document by its read code
    Read(commands::ReadArgs),

    /// Edit a document by its update code
    Edit(commands::EditArgs),

    /// Delete a document (needs both its update code and read code)
    Delete(commands::DeleteArgs),

    /// Browse public documents
    List(commands::ListArgs),

    /// Manage locally saved documents
    #[command(subcommand)]
    Saved(commands::SavedCommand),

    /// Print the suggested tags
    Tags,
}

impl Cli {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config =
            ClientConfig::load(self.config.as_deref()).context("Failed to load configuration")?;
        if let Some(url) = &self.api_url {
            config.api_url = parse_url("api_url", url)?;
        }
        if let Some(url) = &self.site_url {
            config.site_url = parse_url("site_url", url)?;
        }
        if let Some(path) = &self.bookmarks {
            config.bookmarks_path = path.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "textbin=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.client_config()?;
    tracing::debug!("Using document API at {}", config.api_url);
    let ctx = commands::AppContext::new(config);

    match cli.command {
        Commands::Create(args) => commands::create(&ctx, args).await?,
        Commands::Read(args) => commands::read(&ctx, args).await?,
        Commands::Edit(args) => commands::edit(&ctx, args).await?,
        Commands::Delete(args) => commands::delete(&ctx, args).await?,
        Commands::List(args) => commands::list(&ctx, args).await?,
        Commands::Saved(command) => commands::saved(&ctx, command)?,
        Commands::Tags => output::print_tags(),
    }

    Ok(())
}
