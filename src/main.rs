use clap::{Parser, Subcommand};
use geolens::client::{
    ApiClient, GeoClient, Home, LocalStorage, Navigation, Route, Session, gate,
};
use geolens::config::{CONFIG, Config};
use geolens::router::{GeolensState, geolens_router};
use geolens::service::seed::{SEED_EMAIL, SEED_NAME, SEED_PASSWORD, seed_user};
use mimalloc::MiMalloc;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "geolens")]
#[command(version, about = "IP geolocation lookups behind a login", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding the client-local storage (overrides GEOLENS_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the geolens API (overrides GEOLENS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<Url>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen port (overrides PORT / GEOLENS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Insert a user into the credential store (no-op if the email exists)
    Seed {
        #[arg(long, default_value = SEED_NAME)]
        name: String,
        #[arg(long, default_value = SEED_EMAIL)]
        email: String,
        #[arg(long, default_value = SEED_PASSWORD)]
        password: String,
    },
    /// Log in and store the session locally
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Drop the local session and history
    Logout,
    /// Show the identity behind the stored token
    Whoami,
    /// Check that the API is up
    Ping,
    /// Show own location, history and map (default)
    Home,
    /// Look up an IPv4 address
    Lookup {
        #[arg(value_name = "IP")]
        ip: String,
    },
    /// Forget the last query and show own location again
    Clear,
    /// Manage lookup history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List past lookups, most recent first
    List,
    /// Make a past lookup the active one
    Show { index: usize },
    /// Select or unselect an entry
    Toggle { index: usize },
    /// Delete every selected entry
    RemoveSelected,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut cfg: Config = CONFIG.clone();
    if let Some(dir) = cli.data_dir {
        cfg.data_dir = dir;
    }
    if let Some(url) = cli.api_url {
        cfg.api_url = url;
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    match cli.command.unwrap_or(Commands::Home) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                cfg.port = port;
            }
            serve(cfg).await
        }
        Commands::Seed {
            name,
            email,
            password,
        } => {
            let storage = geolens::db::connect(&cfg.database_url).await?;
            if seed_user(&storage, &name, &email, &password).await? {
                println!("Seeded user: {email}");
            } else {
                println!("User {email} already exists");
            }
            Ok(())
        }
        Commands::Ping => {
            let pong = api_client(&cfg)?.ping().await?;
            println!("ok: {}", pong.ok);
            Ok(())
        }
        command => run_client(cfg, command).await,
    }
}

async fn serve(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        database_url = %cfg.database_url,
        addr = %cfg.bind_addr(),
        token_ttl_hours = cfg.token_ttl_hours,
        loglevel = %cfg.loglevel
    );
    if cfg.uses_dev_secret() {
        warn!("GEOLENS_JWT_SECRET is not set; signing tokens with the development secret");
    }

    let storage = geolens::db::connect(&cfg.database_url).await?;
    let app = geolens_router(GeolensState::new(storage, &cfg));

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

/// Client commands: every one passes through the session gate first.
async fn run_client(cfg: Config, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    let storage = LocalStorage::in_dir(&cfg.data_dir);
    let session = Session::restore(&storage);
    let route = match command {
        Commands::Login { .. } => Route::Login,
        _ => Route::Home,
    };

    match gate(session.is_some(), route) {
        Navigation::Redirect(Route::Login) => {
            println!("Not logged in. Run `geolens login --email <EMAIL> --password <PASSWORD>`.");
            return Ok(());
        }
        Navigation::Redirect(Route::Home) => {
            let email = session.as_ref().map(Session::email).unwrap_or_default();
            println!("Already logged in as {email}. Run `geolens logout` first.");
            return Ok(());
        }
        Navigation::Render(_) => {}
    }

    let geo = || GeoClient::new(cfg.geo_base_url.clone(), cfg.proxy.as_ref());

    match command {
        Commands::Login { email, password } => {
            match api_client(&cfg)?.login(&email, &password).await {
                Ok(resp) => {
                    let session = Session::establish(&storage, resp)?;
                    println!("Logged in as {}", session.email());
                }
                Err(e) => println!("! {}", e.user_message()),
            }
        }
        Commands::Logout => {
            Session::teardown(&storage)?;
            println!("Logged out");
        }
        Commands::Whoami => {
            let token = session.map(|s| s.token).unwrap_or_default();
            match api_client(&cfg)?.me(&token).await {
                Ok(me) => println!("{} <{}> (id {})", me.name, me.email, me.id),
                Err(e) => println!("! {}", e.user_message()),
            }
        }
        Commands::Home => {
            print_home(session.as_ref(), &Home::open(geo()?, storage).await);
        }
        Commands::Lookup { ip } => {
            let mut home = Home::new(geo()?, storage);
            home.search(&ip).await;
            print_home(session.as_ref(), &home);
        }
        Commands::Clear => {
            let mut home = Home::new(geo()?, storage);
            home.clear().await;
            print_home(session.as_ref(), &home);
        }
        Commands::History { action } => {
            let mut home = Home::new(geo()?, storage);
            match action {
                HistoryAction::List => {}
                HistoryAction::Show { index } => home.load_from_history(index),
                HistoryAction::Toggle { index } => home.toggle(index),
                HistoryAction::RemoveSelected => home.remove_selected(),
            }
            print_home(session.as_ref(), &home);
        }
        Commands::Serve { .. } | Commands::Seed { .. } | Commands::Ping => {}
    }
    Ok(())
}

fn api_client(cfg: &Config) -> Result<ApiClient, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(proxy_url) = cfg.proxy.as_ref() {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }
    Ok(ApiClient::new(builder.build()?, cfg.api_url.clone()))
}

fn print_home(session: Option<&Session>, home: &Home) {
    println!("Logged as: {}", session.map(Session::email).unwrap_or(""));
    println!("{home}");
}
