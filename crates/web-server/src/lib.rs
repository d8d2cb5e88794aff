use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    routing::get,
    Router,
};
use configuration::ServerSettings;
use database::MessageStore;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod cors;
pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }
}

/// Assembles the API routes, the static-file fallback and the middleware stack.
pub fn build_router(state: Arc<AppState>, settings: &ServerSettings) -> Router {
    // GETs that match no route are looked up in the static directory; anything
    // still unmatched, whatever the method, gets the JSON 404.
    let static_files = ServeDir::new(&settings.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(handlers::not_found.into_service());

    // A known path with an unsupported method is answered like an unknown
    // path rather than with an empty 405.
    Router::new()
        .route("/", get(handlers::root).fallback(handlers::not_found))
        .route(
            "/api/health",
            get(handlers::health_check).fallback(handlers::not_found),
        )
        .route(
            "/api/messages",
            get(handlers::list_messages)
                .post(handlers::create_message)
                .fallback(handlers::not_found),
        )
        .route(
            "/api/products",
            get(handlers::list_catalog_items).fallback(handlers::not_found),
        )
        .fallback_service(static_files)
        .with_state(state)
        .layer(cors::cors_layer(&settings.cors_origin))
        // Logs method, URI, status and latency for every request.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(DefaultBodyLimit::max(1024 * 1024))
}

/// Serves `app` on `listener` until `shutdown` resolves, then waits for
/// in-flight requests to finish.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// The main function to configure and run the web server.
///
/// Shutdown order on SIGINT/SIGTERM: stop accepting connections, drain
/// in-flight requests, close the store, return.
pub async fn run_server(settings: &ServerSettings, store: Arc<dyn MessageStore>) -> anyhow::Result<()> {
    let app = build_router(Arc::new(AppState::new(store.clone())), settings);

    let listener = TcpListener::bind(settings.bind_address()).await?;
    let addr = listener.local_addr()?;
    tracing::info!(
        static_dir = %settings.static_dir.display(),
        cors_origin = %settings.cors_origin,
        "Web server listening on http://{}",
        addr
    );

    let served = serve(listener, app, shutdown_signal()).await;
    store.close().await;
    served?;

    tracing::info!("Web server stopped.");
    Ok(())
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl-C handler.");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler.");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received, draining in-flight requests.");
}
