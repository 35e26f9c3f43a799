//! Text rendering of the algo list and the rules deciding which controls a
//! user is offered for each algorithm and product.

use shared::domain::{Algo, AlgoCommand, AlgoState, Product, ProductCommand, ProductState};

/// `Stop` is offered unless already stopped; `Unpause` only when paused and
/// `Pause` only when running.
pub fn algo_actions(state: AlgoState) -> Vec<AlgoCommand> {
    let mut actions = Vec::new();
    if state != AlgoState::Stopped {
        actions.push(AlgoCommand::Stop);
    }
    if state == AlgoState::Paused {
        actions.push(AlgoCommand::Unpause);
    }
    if state == AlgoState::Running {
        actions.push(AlgoCommand::Pause);
    }
    actions
}

pub fn product_action(state: ProductState) -> ProductCommand {
    match state {
        ProductState::Paused => ProductCommand::Unpause,
        ProductState::Running => ProductCommand::Pause,
    }
}

pub fn render_dashboard(algos: &[Algo]) -> Vec<String> {
    let mut lines = Vec::new();
    for algo in algos {
        lines.push(render_algo(algo));
        lines.extend(algo.products.iter().map(render_product));
    }
    lines
}

fn render_algo(algo: &Algo) -> String {
    let buttons = algo_actions(algo.state)
        .into_iter()
        .map(|action| format!("[{}]", action.caption()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{:<12} {:<9} {}", algo.name, algo.state, buttons)
        .trim_end()
        .to_string()
}

fn render_product(product: &Product) -> String {
    format!(
        "    #{:<4} {:<10} {:<8} orders={:<6} trades={:<6} [{}] {}",
        product.id,
        product.ric,
        product.state,
        product.orders,
        product.trades,
        product_action(product.state).caption(),
        product.message,
    )
    .trim_end()
    .to_string()
}
