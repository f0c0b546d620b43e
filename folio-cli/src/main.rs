use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod session;
mod storage;
mod terminal;

use session::SessionOptions;

#[derive(Parser)]
#[command(name = "folio", about = "Reader session client")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reader server URL (overrides config)
    #[arg(long, global = true, env = "FOLIO_BASE_URL")]
    base_url: Option<String>,

    /// Session token for this process only
    #[arg(long, global = true, env = "FOLIO_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Look up a word in the dictionary
    Define(commands::define::DefineArgs),
    /// Sign in and store the session token
    Login(commands::login::LoginArgs),
    /// Sign out and clear the session
    Logout(commands::logout::LogoutArgs),
    /// Fetch a server-rendered page using the session cookie
    Page(commands::page::PageArgs),
    /// Stream realtime events until Ctrl-C
    Watch(commands::watch::WatchArgs),
    /// Show the signed-in reader
    Whoami(commands::whoami::WhoamiArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opts = SessionOptions {
        base_url: cli.base_url,
        token: cli.token,
    };

    match cli.command {
        Commands::Config(args) => commands::config::run(args),
        Commands::Define(args) => commands::define::run(args, &opts).await,
        Commands::Login(args) => commands::login::run(args, &opts).await,
        Commands::Logout(args) => commands::logout::run(args, &opts).await,
        Commands::Page(args) => commands::page::run(args, &opts).await,
        Commands::Watch(args) => commands::watch::run(args, &opts).await,
        Commands::Whoami(args) => commands::whoami::run(args, &opts).await,
    }
}
