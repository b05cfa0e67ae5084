//! guampa-server - collaborative document translation service
//!
//! `serve` (the default) runs the HTTP server; `add-user` and
//! `import-document` load users and source documents into the database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use guampa_common::config::{ConfigOverrides, ServerConfig, TomlConfig};
use guampa_common::db::init_database;
use guampa_common::segment::split_sentences;
use guampa_server::db::{self, NewDocument};
use guampa_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for guampa-server
#[derive(Parser, Debug)]
#[command(name = "guampa-server")]
#[command(about = "Collaborative document translation server")]
#[command(version)]
struct Args {
    /// Bootstrap TOML config file
    #[arg(short, long, env = "GUAMPA_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding guampa.db
    #[arg(short, long, env = "GUAMPA_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// SQLite database file (overrides root folder)
    #[arg(short, long, env = "GUAMPA_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve(ServeArgs),

    /// Create a user account
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        fullname: String,
        #[arg(long)]
        password: String,
    },

    /// Split a text file into sentences and store it as a document
    ImportDocument {
        /// Plain UTF-8 text file
        file: PathBuf,
        #[arg(long)]
        title: String,
        /// Username of the uploading user
        #[arg(long)]
        owner: Option<String>,
        #[arg(long, default_value = "")]
        source_language: String,
        /// Tag to attach; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "GUAMPA_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "GUAMPA_PORT")]
    port: Option<u16>,

    /// Directory with the browser client
    #[arg(long, env = "GUAMPA_APP_DIR")]
    app_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml, config_source) = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    let command = args.command.unwrap_or(Command::Serve(ServeArgs::default()));
    let serve_args = match &command {
        Command::Serve(serve) => Some(serve),
        _ => None,
    };
    let overrides = ConfigOverrides {
        root_folder: args.root_folder,
        database_path: args.database,
        host: serve_args.and_then(|s| s.host.clone()),
        port: serve_args.and_then(|s| s.port),
        app_dir: serve_args.and_then(|s| s.app_dir.clone()),
    };
    let config = ServerConfig::resolve(&overrides, &toml);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("guampa-server v{}", env!("CARGO_PKG_VERSION"));
    config_source.log();
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;

    match command {
        Command::Serve(_) => serve(config, pool).await,
        Command::AddUser {
            username,
            fullname,
            password,
        } => {
            let user = db::create_user(&pool, &username, &fullname, &password)
                .await
                .with_context(|| format!("Failed to create user '{}'", username))?;
            info!("Created user '{}' (id {})", user.username, user.id);
            Ok(())
        }
        Command::ImportDocument {
            file,
            title,
            owner,
            source_language,
            tags,
        } => {
            let owner_id = match owner {
                Some(name) => Some(
                    db::lookup_username(&pool, &name)
                        .await?
                        .with_context(|| format!("Unknown owner '{}'", name))?
                        .id,
                ),
                None => None,
            };
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let doc = NewDocument {
                title,
                owner_id,
                source_language,
                sentences: split_sentences(&text),
                tags,
            };
            let id = db::import_document(&pool, &doc)
                .await
                .context("Failed to import document")?;
            info!("Document stored with id {}", id);
            Ok(())
        }
    }
}

async fn serve(config: ServerConfig, pool: sqlx::SqlitePool) -> Result<()> {
    if !config.app_dir.join("index.html").exists() {
        tracing::warn!(
            "No index.html under {}; only the JSON API will be useful",
            config.app_dir.display()
        );
    }

    let state = AppState::new(pool, config.app_dir.clone());
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("guampa-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
