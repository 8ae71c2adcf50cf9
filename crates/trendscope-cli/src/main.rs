mod collect;
mod query;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trendscope_core::{CreatedWindow, SortKey};

#[derive(Debug, Parser)]
#[command(name = "trendscope")]
#[command(about = "Collect and query YouTube trending channels per region")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one collection cycle
    Collect {
        /// Restrict the cycle to these regions (repeatable, e.g. --region US)
        #[arg(long = "region")]
        regions: Vec<String>,
        /// Fetch and normalize without writing to the data directory
        #[arg(long)]
        dry_run: bool,
    },
    /// Add profiles for trending channels missing from the region directories
    Directory {
        /// Restrict the refresh to these regions; defaults to every collected region
        #[arg(long = "region")]
        regions: Vec<String>,
        /// Report what would be added without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a channel's stored history as JSON
    History {
        channel_id: String,
        /// Print only the latest day-over-day growth
        #[arg(long)]
        growth: bool,
    },
    /// Show the most common hashtags
    Hashtags {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// List channels across every region directory
    Channels {
        #[arg(long, default_value_t = SortKey::Subscribers)]
        sort: SortKey,
        /// Only channels created within this window (week, month, 90days)
        #[arg(long)]
        created: Option<CreatedWindow>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("trendscope: no command given; see --help");
        return Ok(());
    };

    let config = trendscope_core::load_app_config()?;
    init_tracing(&config.log_level);

    let store = trendscope_store::Store::open(&config.data_dir).await?;

    match command {
        Commands::Collect { regions, dry_run } => {
            collect::run_collect(&config, &store, &regions, dry_run).await?;
        }
        Commands::Directory { regions, dry_run } => {
            collect::run_directory(&config, &store, &regions, dry_run).await?;
        }
        Commands::History { channel_id, growth } => {
            query::run_history(&store, &channel_id, growth).await?;
        }
        Commands::Hashtags { limit } => query::run_hashtags(&store, limit).await?,
        Commands::Channels {
            sort,
            created,
            limit,
        } => query::run_channels(&store, sort, created, limit).await?,
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
