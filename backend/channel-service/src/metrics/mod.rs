//! Prometheus metrics for channel-service.
//!
//! Exposes relation, asset and authorization collectors and an HTTP handler
//! for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Toggle outcomes segmented by relation kind (video_like, subscription, ...).
    pub static ref RELATION_TOGGLE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "relation_toggle_total",
        "Relation toggles segmented by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("failed to register relation_toggle_total");

    /// Object store calls (store/remove) by result.
    pub static ref ASSET_OPERATION_TOTAL: IntCounterVec = register_int_counter_vec!(
        "asset_operation_total",
        "Object store operations segmented by operation and result",
        &["operation", "result"]
    )
    .expect("failed to register asset_operation_total");

    /// Mutations rejected by the ownership guard.
    pub static ref OWNERSHIP_DENIED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "ownership_denied_total",
        "Mutations rejected because the caller does not own the resource",
        &["resource"]
    )
    .expect("failed to register ownership_denied_total");
}

pub fn record_toggle(kind: &str, outcome: &str) {
    RELATION_TOGGLE_TOTAL.with_label_values(&[kind, outcome]).inc();
}

pub fn record_asset_operation<T, E>(operation: &str, result: &Result<T, E>) {
    let label = if result.is_ok() { "ok" } else { "error" };
    ASSET_OPERATION_TOTAL
        .with_label_values(&[operation, label])
        .inc();
}

pub fn record_ownership_denied(resource: &str) {
    OWNERSHIP_DENIED_TOTAL.with_label_values(&[resource]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
