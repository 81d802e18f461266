use anyhow::{Context, Result};
use axum::extract::FromRef;
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;
use crate::inventory::{FilterState, FuzzyMatcher};
use crate::models::Vehicle;
use crate::sessions::SessionStore;

// Declare modules
mod catalog;
mod config;
mod error;
mod finance;
mod inventory;
mod leads;
mod models;
mod routes;
mod sessions;

// Shared application state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http_client: Arc<Client>,
    pub catalog: Arc<Vec<Vehicle>>,
    // Filter defaults spanning the loaded catalog
    pub defaults: Arc<FilterState>,
    pub sessions: Arc<SessionStore>,
    pub matcher: FuzzyMatcher,
}

impl AppState {
    pub fn new(settings: Settings, http_client: Client, catalog: Vec<Vehicle>) -> Self {
        let defaults = FilterState::defaults_for(&catalog);
        let sessions = SessionStore::new(settings.session_capacity, settings.session_ttl_secs);
        let matcher = FuzzyMatcher::new(settings.fuzzy_threshold);
        AppState {
            settings: Arc::new(settings),
            http_client: Arc::new(http_client),
            catalog: Arc::new(catalog),
            defaults: Arc::new(defaults),
            sessions: Arc::new(sessions),
            matcher,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "showroom=info,tower_http=info".into()))
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing showroom inventory server...");

    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    // Picks up HTTP_PROXY/HTTPS_PROXY from the environment
    let http_client = Client::builder()
        .user_agent(concat!("showroom/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(15))
        .build()
        .context("Failed to build shared reqwest client")?;

    let catalog = catalog::load(&settings, &http_client)
        .await
        .context("Failed to load vehicle inventory")?;
    if catalog.is_empty() {
        tracing::warn!("Catalog is empty; every search will show the empty-state prompt.");
    }

    let app_state = AppState::new(settings, http_client, catalog);

    let app = routes::create_router(app_state.clone())
        .nest_service("/static", ServeDir::new(&app_state.settings.static_dir))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = match app_state.settings.server_address.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(
                "Invalid server address format in configuration ('{}'): {}",
                app_state.settings.server_address,
                e
            );
            return Err(anyhow::anyhow!(
                "Invalid server address format: {}",
                app_state.settings.server_address
            ));
        }
    };

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
