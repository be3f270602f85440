use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use channel_service::{
    config::{AssetBackend, StoreBackend},
    handlers::{self, HealthState, UploadSettings},
    metrics,
    middleware::JwtAuthMiddleware,
    repository::{postgres, Repositories},
    storage::{AssetStore, LocalAssetStore, S3AssetStore},
    Config, Services,
};
use db_pool::{create_pool, DbConfig};
use s3_utils::S3Client;
use std::io;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    if std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Failed to load configuration: {:#}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    tracing::info!(env = %config.app.env, "Starting channel-service");

    let (repos, health) = match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            (
                Repositories::memory(),
                HealthState {
                    backend: "memory",
                    pool: None,
                },
            )
        }
        StoreBackend::Postgres => {
            let url = config.database.url.clone().unwrap_or_default();
            let db_config = DbConfig::new("channel-service", url);
            db_config.log_config();
            let pool = create_pool(db_config)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to database: {}", e);
                    io::Error::new(io::ErrorKind::Other, "Database connection failed")
                })?;

            if config.database.run_migrations {
                postgres::migrate(&pool).await.map_err(|e| {
                    tracing::error!("Failed to run migrations: {}", e);
                    io::Error::new(io::ErrorKind::Other, "Database migration failed")
                })?;
                tracing::info!("Database migrations applied");
            }

            (
                Repositories::postgres(pool.clone()),
                HealthState {
                    backend: "postgres",
                    pool: Some(pool),
                },
            )
        }
    };

    let assets: Arc<dyn AssetStore> = match config.storage.backend {
        AssetBackend::Local => Arc::new(LocalAssetStore::new(
            &config.storage.local_root,
            &config.storage.local_base_url,
        )),
        AssetBackend::S3 => {
            let client = S3Client::new().await;
            if let Err(e) = client.health_check().await {
                tracing::warn!("S3 health check failed: {}", e);
            }
            Arc::new(S3AssetStore::new(client.operations()))
        }
    };

    let uploads = UploadSettings::new(&config.storage.upload_dir);
    tokio::fs::create_dir_all(&uploads.dir).await?;

    let services = Services::new(repos, assets, config.pagination);
    let services = web::Data::new(services);
    let uploads = web::Data::new(uploads);
    let health = web::Data::new(health);
    let jwt_secret = config.auth.jwt_secret.clone();
    let cors_origin = config.app.cors_origin.clone();

    let addr = format!("{}:{}", config.app.host, config.app.http_port);
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials(),
            None => Cors::permissive(),
        };

        App::new()
            .app_data(services.clone())
            .app_data(uploads.clone())
            .app_data(health.clone())
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .wrap(cors)
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(handlers::health))
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .configure(handlers::configure)
    })
    .bind(&addr)?
    .run()
    .await
}
