use actix_cors::Cors;
use actix_middleware::{CorrelationIdMiddleware, JwtVerifier, TokenVerifier};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use posts_service::config::StoreBackend;
use posts_service::db::{InMemoryPostStore, PgPostStore, PostStore};
use posts_service::services::PostMutationService;
use posts_service::{routes, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn PostStore>> {
    match config.store {
        StoreBackend::Postgres => {
            let store = PgPostStore::connect(&config.database)
                .await
                .context("Failed to create database pool")?;
            store
                .migrate()
                .await
                .context("Failed to run database migrations")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory post store; posts are lost on restart");
            Ok(Arc::new(InMemoryPostStore::new()))
        }
    }
}

/// Posts Service
///
/// Serves `/api/posts` plus `/api/health`, `/api/health/ready` and `/metrics`.
/// Listens on POSTS_SERVICE_HOST:POSTS_SERVICE_PORT (default 0.0.0.0:5000).
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting posts-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let verifier: Arc<dyn TokenVerifier> = Arc::new(
        JwtVerifier::from_secret(&config.auth.jwt_secret)
            .context("Failed to initialize JWT verifier")?,
    );

    let store = build_store(&config).await?;
    let service = web::Data::new(PostMutationService::new(store));

    let bind_address = config.bind_address();
    tracing::info!("Starting HTTP server at {}", bind_address);

    let http_service = service.clone();
    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(http_service.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(CorrelationIdMiddleware)
            .configure(routes::configure(verifier.clone()))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    service.shutdown().await;
    tracing::info!("posts-service stopped");
    Ok(())
}
