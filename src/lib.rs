pub mod config;
pub mod err;
pub mod models;
pub mod render;
pub mod routes;
pub mod store;

use axum::handler::Handler;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tokio::signal;

pub use config::Config;
pub use store::AttendanceStore;

pub fn router(store: AttendanceStore) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/script.js", get(routes::script))
        .route("/submit", post(routes::submit_attendance))
        .route("/update-status", post(routes::update_status))
        .route("/attendance", get(routes::list_attendance))
        .route("/attendance.json", get(routes::list_attendance_json))
        .route("/attendance/:id", get(routes::show_attendance))
        .fallback(err::handler404.into_service())
        .layer(Extension(store))
}

/// Opens the store, brings its schema up to date, then serves until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = AttendanceStore::connect(&config.database_path, config.max_connections).await?;
    store.migrate().await?;
    log::info!("Attendance schema is up to date");

    let addr = config.address();
    log::info!("Starting attendance server on http://{}", addr);
    axum::Server::try_bind(&addr)?
        .serve(router(store.clone()).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    store.close().await;
    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                log::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
