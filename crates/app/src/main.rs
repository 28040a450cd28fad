use anyhow::{Context, Result};
use app::config::{Cli, Command, normalize_sqlite_url, prepare_sqlite_file};
use clap::Parser;
use services::{AppServices, Clock};
use storage::assets::BankCatalog;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command() {
        Command::Books => list_books(&cli),
        Command::Serve => serve(&cli).await,
    }
}

fn list_books(cli: &Cli) -> Result<()> {
    let catalog = BankCatalog::load_dir(&cli.bank_dir)
        .with_context(|| format!("loading banks from {}", cli.bank_dir.display()))?;
    for bank in catalog.banks() {
        println!("{:<16} {:>4}  {}", bank.book(), bank.len(), bank.title());
    }
    Ok(())
}

async fn serve(cli: &Cli) -> Result<()> {
    // Open + migrate SQLite at startup so the library crates never touch the filesystem layout.
    let db_url = normalize_sqlite_url(&cli.db_url);
    prepare_sqlite_file(&db_url)?;

    let services = AppServices::new_sqlite(
        &db_url,
        &cli.bank_dir,
        cli.verse_config(),
        Clock::System,
    )
    .await
    .context("starting services")?;

    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("binding {}", cli.bind))?;
    tracing::info!(addr = %cli.bind, db = %db_url, "listening");

    app::serve(listener, services, cli.session_ttl(), shutdown_signal()).await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
