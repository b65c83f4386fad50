use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use dukafeed_feed::{build_feed, resolve_assignments, FeedConfig};

#[derive(Debug, Parser)]
#[command(name = "dukafeed-cli")]
#[command(about = "Duka merchant feed utilities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render the merchant feed to a file, the pre-rendered counterpart of
    /// the /feed.xml endpoint for static deployments.
    Generate {
        /// Output path for the rendered document.
        #[arg(long, default_value = "dist/feed.xml")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate { out } => generate(&out).await,
    }
}

async fn generate(out: &Path) -> anyhow::Result<()> {
    let config = dukafeed_core::load_app_config()?;
    let pool_config = dukafeed_db::PoolConfig::from_app_config(&config);
    let pool = dukafeed_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("connecting to catalog database")?;

    let products = dukafeed_db::list_feed_products(&pool)
        .await
        .context("reading active products")?;

    // Same degradation as the server: missing categories are not fatal.
    let assignments = match load_assignments(&pool, &products).await {
        Ok(assignments) => assignments,
        Err(e) => {
            tracing::warn!(error = %e, "category read failed, feed will omit categories");
            HashMap::new()
        }
    };

    let feed_config = FeedConfig::from_app_config(&config);
    let body = build_feed(&products, &assignments, &feed_config)
        .context("rendering merchant feed")?;

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    std::fs::write(out, &body).with_context(|| format!("writing {}", out.display()))?;

    tracing::info!(
        products = products.len(),
        bytes = body.len(),
        path = %out.display(),
        "feed rendered"
    );
    Ok(())
}

async fn load_assignments(
    pool: &sqlx::PgPool,
    products: &[dukafeed_core::FeedProduct],
) -> Result<HashMap<String, Vec<dukafeed_core::Category>>, dukafeed_db::DbError> {
    let categories = dukafeed_db::list_categories(pool).await?;
    let links = dukafeed_db::list_category_links(pool).await?;
    Ok(resolve_assignments(products, &categories, &links))
}
