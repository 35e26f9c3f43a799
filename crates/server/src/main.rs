use std::{net::SocketAddr, sync::Arc};

use algo_store::{load_seed_file, AlgoStore, SharedStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use server_api::{apply_algo_command, apply_product_command, list_algos, ApiContext};
use shared::{
    domain::{Algo, AlgoCommand, ProductCommand, UnknownCommand},
    error::{ApiError, ErrorCode},
    protocol::{algos_route, healthz_route, Ack},
};
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod simulator;

use app_state::AppState;
use config::{load_settings, Settings};

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let store = SharedStore::new(open_store(&settings)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let simulator = simulator::spawn(store.clone(), settings.simulator_config(), shutdown_rx);

    let state = AppState {
        api: ApiContext { store },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    simulator.await?;
    info!("server stopped");
    Ok(())
}

fn open_store(settings: &Settings) -> anyhow::Result<AlgoStore> {
    match &settings.seed_file {
        Some(path) => load_seed_file(path).map_err(|error| {
            error!(%path, %error, "failed to load algo seed file");
            error.into()
        }),
        None => {
            info!("seeding built-in demo algos");
            Ok(AlgoStore::demo())
        }
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(healthz_route(), get(healthz))
        .route(algos_route(), get(http_list_algos))
        .route("/algos/:name/:action", post(http_algo_command))
        .route("/algos/:name/:product_id/:action", post(http_product_command))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_algos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Algo>>, HttpError> {
    let algos = list_algos(&state.api).map_err(http_error)?;
    Ok(Json(algos))
}

async fn http_algo_command(
    State(state): State<Arc<AppState>>,
    Path((name, action)): Path<(String, String)>,
) -> Result<Json<Ack>, HttpError> {
    let command = action.parse::<AlgoCommand>().map_err(unknown_route)?;
    let ack = apply_algo_command(&state.api, &name, command).map_err(http_error)?;
    Ok(Json(ack))
}

async fn http_product_command(
    State(state): State<Arc<AppState>>,
    Path((name, product_id, action)): Path<(String, String, String)>,
) -> Result<Json<Ack>, HttpError> {
    let command = action.parse::<ProductCommand>().map_err(unknown_route)?;
    let ack =
        apply_product_command(&state.api, &name, &product_id, command).map_err(http_error)?;
    Ok(Json(ack))
}

fn http_error(error: ApiError) -> HttpError {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}

fn unknown_route(error: UnknownCommand) -> HttpError {
    http_error(ApiError::new(ErrorCode::NotFound, error.to_string()))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
