//! HTTP surface for CourseHub.
//!
//! JSON endpoints over the core repositories, with HTTP Basic credentials
//! resolved into a `Principal` and checked against per-route access policies.

use std::time::Duration;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use coursehub_core::{bootstrap, open_db, AccountError, DbError};
use log::{error, info};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::CorsLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError, ConfigNote};
pub use routes::build_router;
pub use state::{AppState, SharedState};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] AccountError),

    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opens the database, runs bootstrap, and serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: Config) -> Result<(), ServerError> {
    info!(
        "event=server_start module=http status=start db_path={}",
        config.db_path.display()
    );
    let conn = open_db(&config.db_path)?;
    bootstrap(&conn, config.superuser.as_ref())?;
    let state = AppState::new(conn);

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let app = build_router(state).layer(cors);

    let address = config.address();
    let listener = TcpListener::bind(&address).await?;
    info!("event=server_start module=http status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=http status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = ctrl_c().await {
            error!("event=shutdown_signal module=http status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
        info!("event=shutdown_signal module=http status=ok signal=ctrl_c");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown_signal module=http status=ok signal=sigterm");
            }
            Err(err) => {
                error!("event=shutdown_signal module=http status=error signal=sigterm error={err}");
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
