use algo_store::{ActivityOdds, SharedStore};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::domain::{Algo, AlgoState, ProductId, ProductState};

fn counters(algos: &[Algo]) -> Vec<(String, ProductId, u64, u64)> {
    algos
        .iter()
        .flat_map(|algo| {
            algo.products
                .iter()
                .map(|p| (algo.name.clone(), p.id, p.orders, p.trades))
        })
        .collect()
}

#[test]
fn unpause_then_pause_product_walkthrough() {
    let store = SharedStore::default();
    let mut rng = StdRng::seed_from_u64(2024);
    let odds = ActivityOdds::new(1.0, 1.0);

    let before = store.snapshot().expect("snapshot");
    store
        .set_algo_state("LSE_0", AlgoState::Running)
        .expect("unpause");
    let after_unpause = store.snapshot().expect("snapshot");
    assert_eq!(after_unpause[0].state, AlgoState::Running);
    assert_eq!(after_unpause[0].products, before[0].products);
    assert_eq!(after_unpause[1], before[1]);

    store
        .set_product_state("LSE_0", ProductId(1), ProductState::Paused)
        .expect("pause product");
    let paused = store.snapshot().expect("snapshot");
    assert_eq!(paused[0].products[0].state, ProductState::Paused);

    for _ in 0..50 {
        store.tick(&mut rng, &odds).expect("tick");
    }
    let ticked = store.snapshot().expect("snapshot");
    assert_eq!(ticked[0].products[0].orders, 0);
    assert_eq!(ticked[0].products[0].trades, 0);
    assert_eq!(ticked[1].products[0].orders, 51);
}

#[test]
fn counters_only_grow_while_product_and_parent_run() {
    let store = SharedStore::default();
    let mut rng = StdRng::seed_from_u64(99);
    let mut control_rng = StdRng::seed_from_u64(100);
    let odds = ActivityOdds::default();
    let algo_states = [
        AlgoState::Uninited,
        AlgoState::Inited,
        AlgoState::Paused,
        AlgoState::Running,
        AlgoState::Stopped,
    ];

    let mut previous = store.snapshot().expect("snapshot");
    for _ in 0..500 {
        if control_rng.gen_bool(0.2) {
            let name = if control_rng.gen_bool(0.5) { "LSE_0" } else { "LSE_1" };
            let state = algo_states[control_rng.gen_range(0..algo_states.len())];
            store.set_algo_state(name, state).expect("set algo");
        }
        if control_rng.gen_bool(0.2) {
            let (name, id) = match control_rng.gen_range(0..3) {
                0 => ("LSE_0", 1),
                1 => ("LSE_1", 2),
                _ => ("LSE_1", 3),
            };
            let state = if control_rng.gen_bool(0.5) {
                ProductState::Running
            } else {
                ProductState::Paused
            };
            store
                .set_product_state(name, ProductId(id), state)
                .expect("set product");
        }

        let before_tick = store.snapshot().expect("snapshot");
        store.tick(&mut rng, &odds).expect("tick");
        let after_tick = store.snapshot().expect("snapshot");

        for (algo_before, algo_after) in before_tick.iter().zip(&after_tick) {
            for (p_before, p_after) in algo_before.products.iter().zip(&algo_after.products) {
                assert!(p_after.orders >= p_before.orders);
                assert!(p_after.trades >= p_before.trades);
                let active = algo_before.state == AlgoState::Running
                    && p_before.state == ProductState::Running;
                if !active {
                    assert_eq!(p_after.orders, p_before.orders);
                    assert_eq!(p_after.trades, p_before.trades);
                }
            }
        }

        for (old, new) in counters(&previous).iter().zip(counters(&after_tick).iter()) {
            assert!(new.2 >= old.2 && new.3 >= old.3);
        }
        previous = after_tick;
    }
}
