use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(ProductId);

/// Lifecycle state of an algorithm. Serialized exactly as the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgoState {
    Uninited,
    Inited,
    Paused,
    Running,
    Stopped,
}

impl AlgoState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninited => "Uninited",
            Self::Inited => "Inited",
            Self::Paused => "Paused",
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for AlgoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductState {
    Paused,
    Running,
}

impl ProductState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paused => "Paused",
            Self::Running => "Running",
        }
    }
}

impl fmt::Display for ProductState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A tradable instrument owned by exactly one algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub ric: String,
    pub state: ProductState,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub orders: u64,
    #[serde(default)]
    pub trades: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Algo {
    pub name: String,
    pub state: AlgoState,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Algo {
    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == product_id)
    }
}

/// Commands addressed to a whole algorithm, named by their URL path verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgoCommand {
    Stop,
    Pause,
    Unpause,
}

impl AlgoCommand {
    pub fn target_state(self) -> AlgoState {
        match self {
            Self::Stop => AlgoState::Stopped,
            Self::Pause => AlgoState::Paused,
            Self::Unpause => AlgoState::Running,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            Self::Stop => "Stop",
            Self::Pause => "Pause",
            Self::Unpause => "Unpause",
        }
    }
}

impl FromStr for AlgoCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => Ok(Self::Stop),
            "pause" => Ok(Self::Pause),
            "unpause" => Ok(Self::Unpause),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCommand {
    Pause,
    Unpause,
}

impl ProductCommand {
    pub fn target_state(self) -> ProductState {
        match self {
            Self::Pause => ProductState::Paused,
            Self::Unpause => ProductState::Running,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Unpause => "unpause",
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            Self::Pause => "Pause",
            Self::Unpause => "Unpause",
        }
    }
}

impl FromStr for ProductCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pause" => Ok(Self::Pause),
            "unpause" => Ok(Self::Unpause),
            other => Err(UnknownCommand(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command '{0}'")]
pub struct UnknownCommand(pub String);
