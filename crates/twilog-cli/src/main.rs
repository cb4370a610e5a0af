mod crawl;
mod stats;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::crawl::CrawlOptions;

#[derive(Debug, Parser)]
#[command(name = "twilog")]
#[command(about = "Archive posts, likes and profile metrics of configured accounts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl every enabled target and upsert the derived facts
    Crawl {
        /// Restrict the crawl to one screen name from the targets file
        #[arg(long)]
        target: Option<String>,

        /// Replay the last cached fetch instead of calling the feed API
        #[arg(long)]
        from_cache: bool,

        /// Fetch and parse, but log fact counts instead of writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply pending database migrations
    Migrate,
    /// Recompute stats from stored history and print them as JSON
    Stats {
        #[arg(long)]
        target: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("twilog: no command given; see `twilog --help`");
        return Ok(());
    };

    let config = twilog_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = twilog_db::PoolConfig::from_app_config(&config);
    let pool = twilog_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Crawl {
            target,
            from_cache,
            dry_run,
        } => {
            let options = CrawlOptions {
                target,
                from_cache,
                dry_run,
            };
            crawl::run_crawl(&pool, &config, &options).await?;
        }
        Commands::Migrate => {
            let applied = twilog_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Stats { target } => stats::run_stats(&pool, &target).await?,
    }

    Ok(())
}
