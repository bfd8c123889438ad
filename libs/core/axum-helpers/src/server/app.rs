use super::shutdown::{ShutdownCoordinator, coordinated_shutdown, shutdown_signal};
use crate::errors::handlers::not_found;
use crate::http::cors::{create_cors_layer, create_permissive_cors_layer};
use crate::http::security::security_headers;
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info, warn};
use utoipa::OpenApi;

/// Serves `router` on the configured address until SIGTERM or ctrl-c.
///
/// # Errors
/// Fails when the listener cannot bind or the server errors while
/// running.
pub async fn create_app(router: Router, server_config: &ServerConfig) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;

    info!("Server starting on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| error!("Server error: {e:?}"))?;

    Ok(())
}

/// Wraps the domain routes with everything an exposed API needs.
///
/// `apis` lands under `/api` with its state already applied. Around it
/// this mounts the OpenAPI docs for `T` (Swagger UI, ReDoc, RapiDoc and
/// Scalar), a 404 fallback, request tracing, security headers, CORS and
/// response compression. Health endpoints are the app's business; merge
/// in `health_router()` separately.
///
/// CORS comes from `CORS_ALLOWED_ORIGIN`, a comma-separated origin
/// list. Unset means a permissive policy, which suits local development
/// and deployments fronted by a gateway; a warning makes the fallback
/// visible.
///
/// # Errors
/// Fails when `CORS_ALLOWED_ORIGIN` is set but holds values that do not
/// parse as header values.
pub async fn create_router<T>(apis: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors_layer = cors_layer_from_env()?;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Builds the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// Comma-separated origins when set; permissive fallback when unset.
fn cors_layer_from_env() -> io::Result<CorsLayer> {
    let Some(origins_str) = std::env::var("CORS_ALLOWED_ORIGIN")
        .ok()
        .filter(|s| !s.trim().is_empty())
    else {
        warn!("CORS_ALLOWED_ORIGIN not set, falling back to a permissive CORS policy");
        return Ok(create_permissive_cors_layer());
    };

    let allowed_origins: Vec<axum::http::HeaderValue> = origins_str
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<axum::http::HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
            )
        })?;

    if allowed_origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "CORS_ALLOWED_ORIGIN cannot be empty",
        ));
    }

    info!("CORS configured with allowed origins: {}", origins_str);
    Ok(create_cors_layer(allowed_origins))
}

/// [`create_app`] plus a cleanup future that runs on shutdown.
///
/// When the shutdown signal arrives, in-flight requests drain and
/// `cleanup` gets up to `shutdown_timeout` to release resources, which
/// is where database connections are closed.
///
/// # Example
/// ```ignore
/// use std::time::Duration;
/// use axum_helpers::server::{close_postgres, create_production_app};
///
/// let cleanup = async move { close_postgres(db, "catalog").await };
/// create_production_app(router, &config, Duration::from_secs(30), cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let (coordinator, _rx) = ShutdownCoordinator::new();
    let shutdown_handle = coordinator.clone();

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        shutdown_handle.wait_for_signal().await;

        info!("Running cleanup with a {shutdown_timeout:?} budget");
        if tokio::time::timeout(shutdown_timeout, cleanup).await.is_err() {
            warn!("Cleanup did not finish within {shutdown_timeout:?}, shutting down anyway");
        } else {
            info!("Cleanup finished");
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(coordinated_shutdown(coordinator))
        .await
        .inspect_err(|e| error!("Server error: {e:?}"));

    // Serve has returned, so in-flight requests are drained
    cleanup_handle.await.ok();

    serve_result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_falls_back_to_permissive_when_unset() {
        temp_env::with_var_unset("CORS_ALLOWED_ORIGIN", || {
            assert!(cors_layer_from_env().is_ok());
        });
    }

    #[test]
    fn test_cors_accepts_comma_separated_origins() {
        temp_env::with_var(
            "CORS_ALLOWED_ORIGIN",
            Some("http://localhost:3000, https://app.example.com"),
            || {
                assert!(cors_layer_from_env().is_ok());
            },
        );
    }

    #[test]
    fn test_cors_rejects_unparseable_origin() {
        temp_env::with_var("CORS_ALLOWED_ORIGIN", Some("not a header\nvalue"), || {
            let err = cors_layer_from_env().unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        });
    }
}
