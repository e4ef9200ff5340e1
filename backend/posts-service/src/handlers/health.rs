/// Liveness and readiness endpoints
use crate::services::PostMutationService;
use actix_middleware::CorrelationId;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    latency_ms: u64,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    store: ComponentCheck,
    timestamp: String,
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "posts-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn readiness_check(
    service: web::Data<PostMutationService>,
    correlation_id: CorrelationId,
) -> HttpResponse {
    let start = Instant::now();
    let result = service.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (ready, store) = match result {
        Ok(()) => (
            true,
            ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "Post store reachable".to_string(),
                latency_ms,
            },
        ),
        Err(e) => {
            tracing::warn!(
                correlation_id = %correlation_id.0,
                error = %e,
                "readiness check failed"
            );
            (
                false,
                ComponentCheck {
                    status: ComponentStatus::Unhealthy,
                    message: format!("Post store unreachable: {}", e),
                    latency_ms,
                },
            )
        }
    };

    let response = ReadinessResponse {
        ready,
        status: store.status,
        store,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
