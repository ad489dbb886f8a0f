//! VetDesk Clinic API
//!
//! Clinic subscription, invoicing and collaborator microservice.
//!
//! ## REST Endpoints
//!
//! - `GET /api/v1/clinics/{clinic_id}/trial-status` - Trial status of a clinic
//! - `POST /api/v1/clinics` - Create a clinic on trial, caller becomes owner
//! - `POST /api/v1/clinics/{clinic_id}/subscription/activate` - Activate paid subscription
//! - `POST /api/v1/clinics/{clinic_id}/invoices/next-number` - Allocate an invoice number
//! - `POST /api/v1/clinics/{clinic_id}/invoices` - Create invoice
//! - `GET /api/v1/clinics/{clinic_id}/invoices` - List invoices
//! - `GET /api/v1/clinics/{clinic_id}/invoices/{invoice_id}` - Get invoice
//! - `PUT /api/v1/clinics/{clinic_id}/collaborators/{user_id}/roles` - Assign roles
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check
//! - `GET /metrics` - Prometheus metrics

mod config;
mod error;
mod extract;
mod handlers;
mod rate_limit;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::connect_info::IntoMakeServiceWithConnectInfo;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vetdesk_billing_core::{BillingService, SystemClock};
use vetdesk_db::pg::Repositories;

use crate::config::Config;
use crate::handlers::{health, ready};
use crate::rate_limit::IpRateLimiter;
use crate::state::AppState;

/// How often idle rate limit buckets are dropped
const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("clinic_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting VetDesk Clinic API");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        http_port = config.http_port,
        trial_length_days = config.billing.trial_length_days,
        notification_days = config.billing.notification_days,
        "Configuration loaded"
    );

    // Initialize metrics
    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Create database pool and apply migrations
    let pool = vetdesk_db::create_pool_with_options(&config.database_url, &config.pool).await?;
    vetdesk_db::run_migrations(&pool).await?;
    tracing::info!("Database pool created");

    // Create repositories and billing service
    let repos = Repositories::new(pool.clone());
    let billing = BillingService::new(repos.into(), config.billing.clone(), Arc::new(SystemClock));

    // Create application state
    let state = AppState::new(billing, pool, config.clone());
    tokio::spawn(prune_rate_limits(state.rate_limiter.clone()));

    // Build HTTP router
    let app = build_router(state, metrics_handle);

    let http_addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    if let Err(e) = run_http_server(app, http_addr).await {
        tracing::error!(error = ?e, "HTTP server error");
        return Err(e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    // API v1 clinic routes
    let api_v1 = Router::new()
        // Clinic and subscription routes
        .route("/clinics", post(handlers::create_clinic))
        .route(
            "/clinics/{clinic_id}/trial-status",
            get(handlers::get_trial_status),
        )
        .route(
            "/clinics/{clinic_id}/subscription/activate",
            post(handlers::activate_subscription),
        )
        // Invoice routes
        .route(
            "/clinics/{clinic_id}/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route(
            "/clinics/{clinic_id}/invoices/next-number",
            post(handlers::next_invoice_number),
        )
        .route(
            "/clinics/{clinic_id}/invoices/{invoice_id}",
            get(handlers::get_invoice),
        )
        // Collaborator routes
        .route(
            "/clinics/{clinic_id}/collaborators/{user_id}/roles",
            put(handlers::set_roles),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    // Combine all routes
    Router::new()
        .nest("/api/v1", api_v1)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .merge(metrics_route) // Metrics route without timeout
        .with_state(state)
}

async fn run_http_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let service: IntoMakeServiceWithConnectInfo<Router, SocketAddr> =
        app.into_make_service_with_connect_info();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn prune_rate_limits(limiter: Arc<IpRateLimiter>) {
    let mut interval = tokio::time::interval(RATE_LIMIT_PRUNE_INTERVAL);
    loop {
        interval.tick().await;
        limiter.prune();
        tracing::trace!(tracked_clients = limiter.tracked_clients(), "Pruned rate limit buckets");
    }
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Most clinic operations are a single round trip to Postgres
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5];

    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("clinic_operation_duration_seconds".to_string()),
        latency_buckets,
    )?;

    let handle = builder.install_recorder()?;

    // Register metrics with descriptions
    metrics::describe_counter!(
        "clinic_invoice_numbers_allocated_total",
        "Total invoice numbers allocated"
    );
    metrics::describe_counter!(
        "clinic_invoice_number_conflicts_total",
        "Invoice numbers skipped because another invoice already used them"
    );
    metrics::describe_counter!(
        "clinic_trial_checks_total",
        "Trial status evaluations by result"
    );
    metrics::describe_counter!(
        "clinic_subscriptions_activated_total",
        "Total subscriptions activated"
    );
    metrics::describe_counter!(
        "clinic_rate_limited_total",
        "Requests rejected by the per-IP rate limiter"
    );
    metrics::describe_histogram!(
        "clinic_operation_duration_seconds",
        "Clinic operation latency in seconds by operation type"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = ?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
