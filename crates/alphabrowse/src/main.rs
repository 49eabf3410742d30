use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;

mod backend;
mod browse;
mod error;
mod http;
mod mcp;
mod nearby;
mod prelude;
mod service;
mod settings;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Alphabetic heading browse over a Solr browse index"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Configuration file (defaults to ~/.config/alphabrowse/config.toml)
    #[clap(long, env = "ALPHABROWSE_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Solr core URL, overriding the configuration file
    #[clap(long, env = "ALPHABROWSE_SOLR_URL", global = true)]
    solr_url: Option<String>,

    /// Request timeout in seconds, overriding the configuration file
    #[clap(long, env = "ALPHABROWSE_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Whether to display additional information.
    #[clap(long, env = "ALPHABROWSE_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Browse headings alphabetically from a starting term
    Browse(crate::browse::BrowseOptions),

    /// List titles shelved near a call number
    Nearby(crate::nearby::NearbyOptions),

    /// List the configured browse types
    Types,

    /// Serve the browse API and MCP over HTTP
    Serve(crate::http::ServeOptions),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();

    let level = if app.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
    color_eyre::install()?;

    match app.command {
        SubCommands::Browse(options) => crate::browse::run(options, app.global).await,
        SubCommands::Nearby(options) => crate::nearby::run(options, app.global).await,
        SubCommands::Types => crate::browse::run_types(app.global).await,
        SubCommands::Serve(options) => crate::http::run(options, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
