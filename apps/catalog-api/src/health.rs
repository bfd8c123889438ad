//! Readiness checks backed by a live database ping.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_helpers::server::{run_health_checks, HealthCheckFuture};
use database::postgres::{check_health_detailed, DatabaseConnection};

/// Creates a router with the /ready endpoint.
///
/// When the app runs against PostgreSQL the endpoint pings the database;
/// in-memory mode has no external dependencies, so the service is always
/// ready.
pub fn ready_router(db: Option<DatabaseConnection>) -> Router {
    Router::new()
        .route("/ready", get(ready_handler))
        .with_state(db)
}

async fn ready_handler(State(db): State<Option<DatabaseConnection>>) -> Response {
    let mut checks: Vec<(&str, HealthCheckFuture<'_>)> = Vec::new();
    if let Some(db) = db.as_ref() {
        checks.push((
            "database",
            Box::pin(async move {
                let status = check_health_detailed(db).await;
                if status.healthy {
                    Ok(())
                } else {
                    Err(status.message)
                }
            }),
        ));
    }

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
