use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_core::jwt::TokenCodec;
use feed_service::assets::AssetStore;
use feed_service::handlers::AppState;
use feed_service::realtime::FeedBroadcaster;
use feed_service::schema::build_schema;
use feed_service::services::{AccountService, PostService};
use feed_service::store::{MemoryStore, PgStore, PostStore, UserStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match feed_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let codec = TokenCodec::new(&config.auth.jwt_secret);
    let assets = AssetStore::new(&config.assets);
    let events = FeedBroadcaster::new(config.feed.event_capacity);

    // Select the document-store backend
    let (users, posts): (Arc<dyn UserStore>, Arc<dyn PostStore>) =
        match config.store.backend.as_str() {
            "memory" => {
                tracing::warn!("using in-memory store; data will not survive a restart");
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store)
            }
            "postgres" => {
                let store = match PgStore::connect(
                    &config.store.database_url,
                    config.store.max_connections,
                )
                .await
                {
                    Ok(store) => store,
                    Err(e) => {
                        tracing::error!("Database pool creation failed: {}", e);
                        eprintln!("ERROR: Failed to connect to database: {}", e);
                        std::process::exit(1);
                    }
                };

                if let Err(e) = store.ensure_schema().await {
                    tracing::error!("Schema bootstrap failed: {}", e);
                    eprintln!("ERROR: Failed to ensure database schema: {}", e);
                    std::process::exit(1);
                }

                tracing::info!("Connected to database");
                let store = Arc::new(store);
                (store.clone(), store)
            }
            other => {
                eprintln!("ERROR: Unknown STORE_BACKEND '{}'", other);
                std::process::exit(1);
            }
        };

    let accounts = AccountService::new(users.clone(), codec.clone());
    let post_service = PostService::new(
        posts,
        users,
        assets.clone(),
        events.clone(),
        config.feed.page_size,
    );
    let schema = build_schema(accounts.clone(), post_service.clone(), events);

    let state = AppState {
        accounts,
        posts: post_service,
        assets,
        codec,
        schema,
    };

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(|cfg| state.configure(cfg))
    })
    .bind(&bind_address)?
    .run()
    .await
}
