use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Algo, AlgoCommand, ProductCommand, ProductId},
    error::ApiError,
    protocol::{algo_command_segments, product_command_segments, Ack},
};
use tokio::sync::Mutex;
use tracing::info;
use url::Url;

pub mod dashboard;
pub mod error;
mod poller;

pub use error::ClientError;
pub use poller::{spawn_poller, AlgoPoller, PolledSnapshot, DEFAULT_POLL_INTERVAL};

/// Control commands a dashboard can issue. Mirrors the REST command set.
#[async_trait]
pub trait AlgoController: Send + Sync {
    async fn stop_algo(&self, algo_name: &str) -> Result<()>;
    async fn pause_algo(&self, algo_name: &str) -> Result<()>;
    async fn unpause_algo(&self, algo_name: &str) -> Result<()>;
    async fn pause_product(&self, algo_name: &str, product_id: ProductId) -> Result<()>;
    async fn unpause_product(&self, algo_name: &str, product_id: ProductId) -> Result<()>;

    async fn send_algo_command(&self, algo_name: &str, command: AlgoCommand) -> Result<()> {
        match command {
            AlgoCommand::Stop => self.stop_algo(algo_name).await,
            AlgoCommand::Pause => self.pause_algo(algo_name).await,
            AlgoCommand::Unpause => self.unpause_algo(algo_name).await,
        }
    }

    async fn send_product_command(
        &self,
        algo_name: &str,
        product_id: ProductId,
        command: ProductCommand,
    ) -> Result<()> {
        match command {
            ProductCommand::Pause => self.pause_product(algo_name, product_id).await,
            ProductCommand::Unpause => self.unpause_product(algo_name, product_id).await,
        }
    }
}

#[derive(Clone)]
pub struct AlgoClient {
    http: Client,
    base: Url,
}

impl AlgoClient {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        let base =
            Url::parse(server_url).map_err(|_| ClientError::InvalidUrl(server_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(server_url.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.base
    }

    pub async fn fetch_algos(&self) -> Result<Vec<Algo>, ClientError> {
        let response = self.http.get(self.endpoint(["algos"])?).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn post_command<I, S>(&self, segments: I) -> Result<Ack, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let url = self.endpoint(segments)?;
        let response = self.http.post(url).json(&Ack::default()).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Appends path segments to the base url; each segment is percent-encoded.
    fn endpoint<I, S>(&self, segments: I) -> Result<Url, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl AlgoController for AlgoClient {
    async fn stop_algo(&self, algo_name: &str) -> Result<()> {
        self.post_command(algo_command_segments(algo_name, AlgoCommand::Stop))
            .await?;
        Ok(())
    }

    async fn pause_algo(&self, algo_name: &str) -> Result<()> {
        self.post_command(algo_command_segments(algo_name, AlgoCommand::Pause))
            .await?;
        Ok(())
    }

    async fn unpause_algo(&self, algo_name: &str) -> Result<()> {
        self.post_command(algo_command_segments(algo_name, AlgoCommand::Unpause))
            .await?;
        Ok(())
    }

    async fn pause_product(&self, algo_name: &str, product_id: ProductId) -> Result<()> {
        self.post_command(product_command_segments(
            algo_name,
            product_id,
            ProductCommand::Pause,
        ))
        .await?;
        Ok(())
    }

    async fn unpause_product(&self, algo_name: &str, product_id: ProductId) -> Result<()> {
        self.post_command(product_command_segments(
            algo_name,
            product_id,
            ProductCommand::Unpause,
        ))
        .await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|error| error.message)
        .unwrap_or(body);
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCall {
    Algo {
        algo_name: String,
        command: AlgoCommand,
    },
    Product {
        algo_name: String,
        product_id: ProductId,
        command: ProductCommand,
    },
}

/// Logs and records commands without contacting a server.
#[derive(Default)]
pub struct LoggingAlgoController {
    calls: Mutex<Vec<ControlCall>>,
}

impl LoggingAlgoController {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<ControlCall> {
        self.calls.lock().await.clone()
    }

    async fn record_algo(&self, algo_name: &str, command: AlgoCommand) {
        info!(algo = algo_name, command = command.verb(), "dry-run algo command");
        self.calls.lock().await.push(ControlCall::Algo {
            algo_name: algo_name.to_string(),
            command,
        });
    }

    async fn record_product(&self, algo_name: &str, product_id: ProductId, command: ProductCommand) {
        info!(
            algo = algo_name,
            %product_id,
            command = command.verb(),
            "dry-run product command"
        );
        self.calls.lock().await.push(ControlCall::Product {
            algo_name: algo_name.to_string(),
            product_id,
            command,
        });
    }
}

#[async_trait]
impl AlgoController for LoggingAlgoController {
    async fn stop_algo(&self, algo_name: &str) -> Result<()> {
        self.record_algo(algo_name, AlgoCommand::Stop).await;
        Ok(())
    }

    async fn pause_algo(&self, algo_name: &str) -> Result<()> {
        self.record_algo(algo_name, AlgoCommand::Pause).await;
        Ok(())
    }

    async fn unpause_algo(&self, algo_name: &str) -> Result<()> {
        self.record_algo(algo_name, AlgoCommand::Unpause).await;
        Ok(())
    }

    async fn pause_product(&self, algo_name: &str, product_id: ProductId) -> Result<()> {
        self.record_product(algo_name, product_id, ProductCommand::Pause)
            .await;
        Ok(())
    }

    async fn unpause_product(&self, algo_name: &str, product_id: ProductId) -> Result<()> {
        self.record_product(algo_name, product_id, ProductCommand::Unpause)
            .await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
