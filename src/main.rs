use http::{Method, header};
use paginate::{
    application::paginate::{registry::ModelRegistry, use_case::PaginateUseCase},
    config::{Config, ModelSettings, RegistrySettings},
    domain::{pagination::resolver::PaginationResolver, record::repository::RecordStore},
    infrastructure::{
        database::pool::create_pool,
        repositories::{
            fixtures::{load_fixtures, seed_if_empty},
            memory_record_store::InMemoryRecordStore,
            sqlx_record_store::SqlxRecordStore,
        },
    },
    presentation::http::{routes::create_router, state::AppState},
};
use sqlx::PgPool;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Uses RUST_LOG if set, otherwise sensible defaults
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,paginate=debug,tower_http=debug"))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;
    let settings = RegistrySettings::load(&config.models_file)?;
    if settings.models.is_empty() {
        tracing::warn!("No models configured in {}", config.models_file);
    }

    let db = match &config.database_url {
        Some(url) => Some(create_pool(url, config.database_max_connections).await?),
        None => {
            tracing::info!("DATABASE_URL not set, keeping records in memory");
            None
        }
    };

    let mut registry = ModelRegistry::new();
    for model in settings.models.values() {
        let store = build_store(model, db.as_ref()).await?;
        let resolver = PaginationResolver::new(model.definition(), model.resolver_config());
        registry.register(PaginateUseCase::new(resolver, store));
    }

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let state = AppState { registry, db };
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Pagination service listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn build_store(
    model: &ModelSettings,
    db: Option<&PgPool>,
) -> anyhow::Result<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match db {
        Some(pool) => {
            let store = SqlxRecordStore::new(pool.clone(), model.table())?;
            store.ensure_table().await?;
            Box::new(store)
        }
        None => Box::new(InMemoryRecordStore::default()),
    };

    if let Some(path) = &model.fixtures {
        let seeded = seed_if_empty(store.as_ref(), load_fixtures(path)?).await?;
        tracing::info!(model = %model.name, seeded, "Applied fixtures from {}", path);
    }
    Ok(store)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, initiating graceful shutdown");
        }
    }
}
