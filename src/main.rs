use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forkful::routes::AppState;
use serde::Deserialize;
use sqlx::migrate::MigrateDatabase;
use std::path::PathBuf;

/// forkful - recipe sharing backend
#[derive(Parser)]
#[command(name = "forkful")]
#[command(about = "Recipe sharing, favorites and shopping list aggregation", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Load the ingredient reference list from a JSON file
    ImportIngredients {
        /// Path to a JSON array of {"name", "measurement_unit"} objects
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = forkful::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    forkful::observability::init_observability("forkful", &config.observability.log_level)?;

    match cli.command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::ImportIngredients { file } => import_ingredients_command(config, file).await,
    }
}

#[tracing::instrument(skip(config))]
async fn serve_command(
    config: forkful::config::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting forkful server...");

    let host = host_override.unwrap_or(config.server.host);
    let port = port_override.unwrap_or(config.server.port);

    let pool = forkful::db::create_pool(&config.database.url, config.database.max_connections)
        .await
        .context("failed to connect to database")?;

    let media_root = PathBuf::from(&config.media.root);
    tokio::fs::create_dir_all(&media_root)
        .await
        .with_context(|| format!("failed to create media root {}", media_root.display()))?;

    let state = AppState {
        pool,
        jwt_secret: config.jwt.secret,
        jwt_lifetime_seconds: (config.jwt.expiration_days as u64) * 24 * 60 * 60,
        base_url: config.server.base_url,
        media_root,
    };

    let app = forkful::router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: forkful::config::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating: {}", config.database.url);
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let pool = forkful::db::create_pool(&config.database.url, 1).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: forkful::config::Config) -> Result<()> {
    tracing::info!("Resetting database...");

    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
        tracing::info!("Database dropped successfully");
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate_command(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}

#[derive(Debug, Deserialize)]
struct IngredientImport {
    name: String,
    measurement_unit: String,
}

#[tracing::instrument(skip(config))]
async fn import_ingredients_command(config: forkful::config::Config, file: PathBuf) -> Result<()> {
    tracing::info!("Importing ingredients from {}", file.display());

    let raw = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let items: Vec<IngredientImport> =
        serde_json::from_str(&raw).context("failed to parse ingredient JSON")?;

    let pool = forkful::db::create_pool(&config.database.url, 1).await?;

    let pairs: Vec<(String, String)> = items
        .into_iter()
        .map(|item| (item.name, item.measurement_unit))
        .collect();
    let inserted = forkful::queries::ingredients::bulk_insert(&pool, &pairs).await?;

    tracing::info!("Imported {} ingredients", inserted);

    Ok(())
}
