//! CLI entry point for hexo-plugins

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hexo-plugins")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Tag plugins and renderers for Hexo-style static sites", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the source directory into the public directory
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Render a single file
    #[command(alias = "r")]
    Render {
        /// Source file (.md, .scss, ...)
        file: PathBuf,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List registered tags or renderers
    List {
        /// What to list (tag, renderer)
        #[arg(default_value = "tag")]
        r#type: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "hexo_plugins=debug,info"
    } else {
        "hexo_plugins=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    match cli.command {
        Commands::Generate { watch } => {
            let hexo = hexo_plugins::Hexo::new(&base_dir)?;
            tracing::info!("Generating static files...");

            if let Err(e) = hexo.generate().await {
                if !watch {
                    return Err(e);
                }
                tracing::error!("Generation failed: {:#}", e);
            }

            if watch {
                hexo_plugins::commands::generate::watch(&hexo).await?;
            }
        }

        Commands::Render { file, output } => {
            let hexo = hexo_plugins::Hexo::new(&base_dir)?;
            let file = if file.is_absolute() {
                file
            } else {
                base_dir.join(file)
            };
            hexo_plugins::commands::render::run(&hexo, &file, output.as_deref())?;
        }

        Commands::List { r#type, json } => {
            let hexo = hexo_plugins::Hexo::new(&base_dir)?;
            hexo_plugins::commands::list::run(&hexo, &r#type, json)?;
        }

        Commands::Clean => {
            let hexo = hexo_plugins::Hexo::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            hexo.clean()?;
        }

        Commands::Version => {
            println!("hexo-plugins version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
