mod cmd;
mod output;
mod root;

use buddy_core::command::HexoCli;
use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, deploy::Mode, post::PostSubcommand, theme::ThemeSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "hexo-buddy",
    about = "Manage a Hexo blog from the terminal: posts, config, themes and deployment",
    version,
    propagate_version = true
)]
struct Cli {
    /// Hexo project root (default: nearest directory holding _config.yml)
    #[arg(long, global = true, env = "HEXO_BUDDY_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// How to invoke the Hexo CLI, split on whitespace
    #[arg(
        long,
        global = true,
        env = "HEXO_BUDDY_HEXO",
        default_value = HexoCli::DEFAULT_INVOCATION
    )]
    hexo: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show post, theme and language overview
    Status,

    /// List, create, inspect and delete posts
    Post {
        #[command(subcommand)]
        subcommand: PostSubcommand,
    },

    /// Read and update _config.yml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// List installed themes and switch the active one
    Theme {
        #[command(subcommand)]
        subcommand: ThemeSubcommand,
    },

    /// Show or set the dashboard language (zh-CN, en-US)
    Lang {
        /// Language code to store; omit to show the current one
        code: Option<String>,
    },

    /// Render the static site without publishing
    Generate,

    /// Generate the static site, then publish it
    Deploy,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Generate | Commands::Deploy => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::Post { subcommand } => cmd::post::run(&root, subcommand, &cli.hexo, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Theme { subcommand } => cmd::theme::run(&root, subcommand, cli.json),
        Commands::Lang { code } => cmd::lang::run(&root, code.as_deref(), cli.json),
        Commands::Generate => cmd::deploy::run(&root, &cli.hexo, Mode::Generate, cli.json),
        Commands::Deploy => cmd::deploy::run(&root, &cli.hexo, Mode::Deploy, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
