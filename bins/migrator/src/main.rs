//! Schema migration runner.
//!
//! Reads the same layered configuration as the server (`config/*.toml`
//! plus `POSTBOARD__*` variables) and applies one command:
//!
//!   migrator [up|down|status|fresh|refresh]
//!
//! `up` is the default. `down` reverts the latest migration only.

use anyhow::{Context, bail};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use postboard_db::{connect_with, migration::Migrator};
use postboard_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sea_orm_migration=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());

    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect_with(&config.database).await?;

    match command.as_str() {
        "up" => Migrator::up(&db, None).await?,
        "down" => Migrator::down(&db, Some(1)).await?,
        "status" => Migrator::status(&db).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "refresh" => Migrator::refresh(&db).await?,
        other => bail!("unknown command '{other}', expected up, down, status, fresh or refresh"),
    }

    info!(command = %command, "Migration command finished");
    Ok(())
}
