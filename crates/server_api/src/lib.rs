use algo_store::SharedStore;
use shared::{
    domain::{Algo, AlgoCommand, AlgoState, ProductCommand, ProductId, ProductState},
    error::{ApiError, ErrorCode},
    protocol::Ack,
};
use tracing::{debug, info};

#[derive(Clone, Default)]
pub struct ApiContext {
    pub store: SharedStore,
}

pub fn list_algos(ctx: &ApiContext) -> Result<Vec<Algo>, ApiError> {
    debug!("serving request algos");
    ctx.store.snapshot().map_err(internal)
}

pub fn stop_algo(ctx: &ApiContext, algo_name: &str) -> Result<Ack, ApiError> {
    apply_algo_command(ctx, algo_name, AlgoCommand::Stop)
}

pub fn pause_algo(ctx: &ApiContext, algo_name: &str) -> Result<Ack, ApiError> {
    apply_algo_command(ctx, algo_name, AlgoCommand::Pause)
}

pub fn unpause_algo(ctx: &ApiContext, algo_name: &str) -> Result<Ack, ApiError> {
    apply_algo_command(ctx, algo_name, AlgoCommand::Unpause)
}

pub fn pause_product(
    ctx: &ApiContext,
    algo_name: &str,
    product_id: ProductId,
) -> Result<Ack, ApiError> {
    set_product_state(ctx, algo_name, product_id, ProductState::Paused)
}

pub fn unpause_product(
    ctx: &ApiContext,
    algo_name: &str,
    product_id: ProductId,
) -> Result<Ack, ApiError> {
    set_product_state(ctx, algo_name, product_id, ProductState::Running)
}

/// Overwrites the algorithm's state. Unknown names are ignored.
pub fn apply_algo_command(
    ctx: &ApiContext,
    algo_name: &str,
    command: AlgoCommand,
) -> Result<Ack, ApiError> {
    set_algo_state(ctx, algo_name, command.target_state())
}

/// `raw_product_id` comes straight from the URL. Anything that is not an
/// integer cannot match a product, so the command is dropped like any other
/// unknown target.
pub fn apply_product_command(
    ctx: &ApiContext,
    algo_name: &str,
    raw_product_id: &str,
    command: ProductCommand,
) -> Result<Ack, ApiError> {
    match parse_product_id(raw_product_id) {
        Some(product_id) => set_product_state(ctx, algo_name, product_id, command.target_state()),
        None => {
            debug!(
                algo = algo_name,
                product_id = raw_product_id,
                "ignoring product command with non-numeric id"
            );
            Ok(Ack::default())
        }
    }
}

fn set_algo_state(
    ctx: &ApiContext,
    algo_name: &str,
    new_state: AlgoState,
) -> Result<Ack, ApiError> {
    let found = ctx
        .store
        .set_algo_state(algo_name, new_state)
        .map_err(internal)?;
    if found {
        info!(algo = algo_name, state = %new_state, "changing algo state");
    } else {
        debug!(algo = algo_name, state = %new_state, "unknown algo, ignoring");
    }
    Ok(Ack::default())
}

fn set_product_state(
    ctx: &ApiContext,
    algo_name: &str,
    product_id: ProductId,
    new_state: ProductState,
) -> Result<Ack, ApiError> {
    let found = ctx
        .store
        .set_product_state(algo_name, product_id, new_state)
        .map_err(internal)?;
    if found {
        info!(
            algo = algo_name,
            %product_id,
            state = %new_state,
            "changing product state"
        );
    } else {
        debug!(algo = algo_name, %product_id, "unknown product, ignoring");
    }
    Ok(Ack::default())
}

fn parse_product_id(raw: &str) -> Option<ProductId> {
    raw.trim().parse::<i64>().ok().map(ProductId)
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
