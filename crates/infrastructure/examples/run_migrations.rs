//! Bring the database schema up to date without starting the server.
//!
//! `cargo run -p infrastructure --example run_migrations -- [config_dir]`
use infrastructure::{ServiceConfig, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_dir = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let config = ServiceConfig::load(&config_dir)?;
    let url = config
        .database
        .url
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

    println!("Running migrations...");
    database::run_migrations(&url).await?;
    println!("✅ Migrations applied successfully.");
    Ok(())
}
