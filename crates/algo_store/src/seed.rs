use std::{collections::HashSet, fs, path::Path};

use serde::Deserialize;
use shared::domain::{Algo, AlgoState, Product, ProductId, ProductState};
use thiserror::Error;
use tracing::info;

use crate::AlgoStore;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid seed file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate algo name '{0}'")]
    DuplicateAlgo(String),
    #[error("duplicate product id {product_id} in algo '{algo}'")]
    DuplicateProduct { algo: String, product_id: ProductId },
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    algos: Vec<Algo>,
}

/// The dataset every fresh server starts with.
pub fn demo_algos() -> Vec<Algo> {
    vec![
        Algo {
            name: "LSE_0".into(),
            state: AlgoState::Paused,
            products: vec![Product {
                id: ProductId(1),
                ric: "VOD.L".into(),
                state: ProductState::Running,
                message: String::new(),
                orders: 0,
                trades: 0,
            }],
        },
        Algo {
            name: "LSE_1".into(),
            state: AlgoState::Running,
            products: vec![
                Product {
                    id: ProductId(2),
                    ric: "TSCO.L".into(),
                    state: ProductState::Running,
                    message: "Trading".into(),
                    orders: 1,
                    trades: 14,
                },
                Product {
                    id: ProductId(3),
                    ric: "BP.L".into(),
                    state: ProductState::Paused,
                    message: "Some problem".into(),
                    orders: 0,
                    trades: 0,
                },
            ],
        },
    ]
}

pub fn parse_seed(raw: &str) -> Result<AlgoStore, SeedError> {
    let file: SeedFile = toml::from_str(raw)?;
    AlgoStore::new(file.algos)
}

pub fn load_seed_file(path: impl AsRef<Path>) -> Result<AlgoStore, SeedError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let store = parse_seed(&raw)?;
    info!(
        path = %path.display(),
        algos = store.snapshot().len(),
        "loaded algo seed file"
    );
    Ok(store)
}

pub(crate) fn validate(algos: &[Algo]) -> Result<(), SeedError> {
    let mut names = HashSet::new();
    for algo in algos {
        if !names.insert(algo.name.as_str()) {
            return Err(SeedError::DuplicateAlgo(algo.name.clone()));
        }
        let mut product_ids = HashSet::new();
        for product in &algo.products {
            if !product_ids.insert(product.id) {
                return Err(SeedError::DuplicateProduct {
                    algo: algo.name.clone(),
                    product_id: product.id,
                });
            }
        }
    }
    Ok(())
}
