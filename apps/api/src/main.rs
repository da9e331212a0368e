use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coach_api::agents::{AgentRunner, LlmAgentRunner};
use coach_api::chat::confirm::WriteConfirmer;
use coach_api::chat::pending::PendingWrites;
use coach_api::chat::session::SessionStore;
use coach_api::config::Config;
use coach_api::db::{create_pool, run_migrations};
use coach_api::llm_client::{self, LlmClient};
use coach_api::routes::build_router;
use coach_api::state::AppState;
use coach_api::store::postgres::PgStore;
use coach_api::store::CareerStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let store: Option<Arc<dyn CareerStore>> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            if config.run_migrations {
                run_migrations(&pool).await?;
            }
            Some(Arc::new(PgStore::new(pool)))
        }
        None => {
            warn!("No database configured; data endpoints will return 503");
            None
        }
    };

    // Initialize agents
    let agents: Option<Arc<dyn AgentRunner>> = match (&config.anthropic_api_key, config.enable_ai) {
        (Some(key), true) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(LlmAgentRunner::new(llm, store.clone())))
        }
        _ => {
            info!("AI disabled; /chat will return 503");
            None
        }
    };

    if let Some(ttl) = config.pending_write_ttl {
        info!("Pending writes expire after {}s", ttl.as_secs());
    }

    // Build app state
    let state = AppState {
        store,
        agents,
        confirmer: Arc::new(WriteConfirmer::new(PendingWrites::new(
            config.pending_write_ttl,
        ))),
        sessions: Arc::new(SessionStore::new()),
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr} (ai={})", config.enable_ai);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
