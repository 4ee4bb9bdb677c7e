//! Booking HTTP server.
//!
//! Wires the reservation coordinator to in-memory stores, optionally
//! bridging cache invalidation and idempotency through Redis when
//! `REDIS_URL` is set.

use chrono::Utc;
use marquee_core::{
    CacheInvalidator, CoordinatorConfig, IdempotencyCache, MemoryBookingLedger,
    MemoryIdempotencyCache, MemoryInventoryStore, Money, MovieId, NoopCacheInvalidator,
    RedisCacheInvalidator, RedisIdempotencyCache, ReservationCoordinator, SeatLabel, Show, ShowId,
    UserId,
};
use marquee_web::{AppState, Config, StaticTokenIdentity, build_router, metrics};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting booking HTTP server");

    let config = Config::from_env();
    metrics::register_business_metrics();

    // Inventory and ledger run in-process; cache collaborators go through
    // Redis when configured.
    let inventory = Arc::new(MemoryInventoryStore::new());
    let ledger = Arc::new(MemoryBookingLedger::new());

    let (cache, idempotency): (Arc<dyn CacheInvalidator>, Arc<dyn IdempotencyCache>) =
        match &config.redis.url {
            Some(url) => {
                info!(redis_url = %url, "Cache bridge enabled");
                let client = redis::Client::open(url.as_str())?;
                (
                    Arc::new(RedisCacheInvalidator::new(client.clone())),
                    Arc::new(RedisIdempotencyCache::new(client)),
                )
            }
            None => {
                info!("No REDIS_URL set; cache invalidation disabled");
                (
                    Arc::new(NoopCacheInvalidator),
                    Arc::new(MemoryIdempotencyCache::new()),
                )
            }
        };

    if config.server.seed_demo_show {
        let show = demo_show();
        info!(show_id = %show.id, seats = show.seats.len(), "Seeding demo show");
        inventory.insert_show(show).await?;
    }

    let mut identity = StaticTokenIdentity::new();
    if let Some(token) = &config.server.demo_token {
        let demo_user = UserId::new();
        info!(user_id = %demo_user, "Demo token registered");
        identity = identity.with_token(token.clone(), demo_user);
    }

    let coordinator = Arc::new(ReservationCoordinator::new(
        inventory,
        ledger.clone(),
        cache,
        idempotency,
        CoordinatorConfig::default(),
    ));

    let state = AppState::new(coordinator, ledger, Arc::new(identity));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// A small two-row show for local experimentation.
fn demo_show() -> Show {
    let labels: Vec<SeatLabel> = ["A", "B"]
        .iter()
        .flat_map(|row| (1..=8).map(move |n| SeatLabel::new(format!("{row}{n}"))))
        .collect();
    Show::new(
        ShowId::new(),
        MovieId::new(),
        "Grand Odeon 3",
        "Springfield",
        Utc::now() + chrono::Duration::hours(4),
        Money::from_cents(20_000),
        labels,
    )
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
