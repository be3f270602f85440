/// HTTP handlers for Channel Service
///
/// Every route lives under `/api/v1`. Successful responses use the shared
/// `ApiResponse` envelope; failures are rendered by `AppError`.
pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod upload;
pub mod videos;

use actix_web::{http::StatusCode, web, HttpResponse};
use error_types::ApiResponse;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::pipeline::Page;
use crate::services::Services;

pub use upload::UploadSettings;

/// Mount every `/api/v1` route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(
            web::scope("/api/v1")
                .configure(videos::register_routes)
                .configure(comments::register_routes)
                .configure(likes::register_routes)
                .configure(subscriptions::register_routes)
                .configure(tweets::register_routes)
                .configure(playlists::register_routes)
                .configure(dashboard::register_routes),
        );
}

/// Malformed bodies, queries and paths are validation errors
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _| AppError::validation(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _| AppError::validation(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _| AppError::validation(err.to_string()).into())
}

/// 200 with the success envelope
pub(crate) fn ok<T: Serialize>(data: T, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data, message))
}

pub(crate) fn respond<T: Serialize>(status: StatusCode, data: T, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::new(status.as_u16(), data, message))
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::validation(format!("Invalid {what} id")))
}

/// `page` / `limit` query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn to_page(&self, services: &Services) -> Result<Page> {
        Page::from_query(self.page, self.limit, &services.pagination)
    }
}

/// Storage backing the health endpoint
#[derive(Clone)]
pub struct HealthState {
    pub backend: &'static str,
    pub pool: Option<PgPool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthReport {
    status: &'static str,
    service: &'static str,
    store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pool: Option<PoolReport>,
}

#[derive(Serialize)]
struct PoolReport {
    idle: i64,
    active: i64,
    max: i64,
}

/// GET /health
pub async fn health(state: web::Data<HealthState>) -> HttpResponse {
    let pool = state.pool.as_ref().map(|pool| {
        let snapshot = db_pool::pool_snapshot(pool);
        PoolReport {
            idle: snapshot.idle,
            active: snapshot.active,
            max: snapshot.max,
        }
    });

    HttpResponse::Ok().json(HealthReport {
        status: "ok",
        service: "channel-service",
        store: state.backend,
        pool,
    })
}
