//! Dispatch admin console - delivery order administration.
//!
//! This binary serves the admin console on port 3001.
//!
//! # Architecture
//!
//! - Axum web framework with Askama server-side templates
//! - Firestore REST API as the document store (no local database)
//! - Firebase Identity Toolkit for email/password authentication
//! - Server-side sessions established only for `admin`-role profiles
//!
//! The store backend is selected by `STORE_BACKEND`: `firestore` for the
//! real thing, `memory` for credential-free local development.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dispatch_admin::authn::{FirebaseAuthClient, IdentityProvider, MemoryIdentity};
use dispatch_admin::config::{AdminConfig, StoreBackend};
use dispatch_admin::state::AppState;
use dispatch_admin::store::{DocumentStore, FirestoreStore, MemoryStore};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dispatch_admin=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Select the store and identity backends
    let (store, provider): (Arc<dyn DocumentStore>, Arc<dyn IdentityProvider>) =
        match config.store_backend {
            StoreBackend::Firestore => {
                let store = FirestoreStore::new(&config.firebase, config.store_timeout)
                    .expect("Failed to create Firestore client");
                let provider = FirebaseAuthClient::new(&config.firebase, config.store_timeout)
                    .expect("Failed to create identity client");
                tracing::info!(project = %config.firebase.project_id, "Using Firestore backend");
                (Arc::new(store), Arc::new(provider))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory backend; data is lost on restart");
                (Arc::new(MemoryStore::new()), Arc::new(MemoryIdentity::new()))
            }
        };

    // Build application state and router
    let state = AppState::new(config.clone(), store, provider);
    let app = dispatch_admin::app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("admin console listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
