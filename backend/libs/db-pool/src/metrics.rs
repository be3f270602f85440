//! Prometheus gauges for the database connection pool

use prometheus::{register_int_gauge_vec, IntGaugeVec};
use sqlx::PgPool;

lazy_static::lazy_static! {
    /// Database connection pool size by state (idle/active/max)
    static ref DB_POOL_CONNECTIONS: IntGaugeVec = register_int_gauge_vec!(
        "db_pool_connections",
        "Database pool connection count by state",
        &["service", "state"]
    ).expect("Prometheus metrics registration should succeed at startup");
}

/// Point-in-time pool occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub idle: i64,
    pub active: i64,
    pub max: i64,
}

pub fn pool_snapshot(pool: &PgPool) -> PoolSnapshot {
    let size = pool.size() as i64;
    let idle = pool.num_idle() as i64;
    PoolSnapshot {
        idle,
        active: size - idle,
        max: pool.options().get_max_connections() as i64,
    }
}

/// Update connection pool metrics (called periodically)
pub(crate) fn update_pool_metrics(pool: &PgPool, service: &str) {
    let snapshot = pool_snapshot(pool);

    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "idle"])
        .set(snapshot.idle);
    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "active"])
        .set(snapshot.active);
    DB_POOL_CONNECTIONS
        .with_label_values(&[service, "max"])
        .set(snapshot.max);
}
