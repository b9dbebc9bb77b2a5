use anyhow::{Context, Result};
use materna::config::Config;
use materna::content::{AffirmationRepository, SEED_AFFIRMATIONS};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;

    info!("Opening database...");
    let repo = AffirmationRepository::open(&config.database_url)
        .await
        .context("Failed to open affirmation database")?;

    let existing = repo.count().await?;
    if existing > 0 {
        info!("Database already has {} affirmations.", existing);
        info!("Delete the database file to reseed from scratch.");
        return Ok(());
    }

    info!("Seeding affirmations...");
    let inserted = repo.insert_many(&SEED_AFFIRMATIONS).await?;
    info!("Successfully seeded {} affirmations", inserted);

    info!("Category breakdown:");
    for (category, count) in repo.category_counts().await? {
        info!("  {}: {} affirmations", category, count);
    }

    Ok(())
}
