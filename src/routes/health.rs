use axum::Json;

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct HealthStatus {
    status: &'static str,
}

/// Health check endpoint
///
/// Returns a static ok status if the API is up and running
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus)
    )
)]
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}
