use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    dashboard::render_dashboard, spawn_poller, AlgoClient, AlgoController, LoggingAlgoController,
    PolledSnapshot,
};
use shared::domain::{AlgoCommand, ProductCommand, ProductId};
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "algoctl", about = "Inspect and control running algos")]
struct Cli {
    #[arg(long, default_value = "http://localhost:5000")]
    server_url: String,
    /// Log control commands instead of sending them.
    #[arg(long)]
    dry_run: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print the current algo snapshot once.
    List,
    /// Poll the server and reprint the snapshot on every refresh.
    Watch {
        #[arg(long, default_value_t = 3)]
        interval_secs: u64,
    },
    Stop {
        name: String,
    },
    Pause {
        name: String,
    },
    Unpause {
        name: String,
    },
    PauseProduct {
        name: String,
        product_id: i64,
    },
    UnpauseProduct {
        name: String,
        product_id: i64,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum ControlRequest<'a> {
    Algo(&'a str, AlgoCommand),
    Product(&'a str, ProductId, ProductCommand),
}

impl Command {
    fn control_request(&self) -> Option<ControlRequest<'_>> {
        match self {
            Command::List | Command::Watch { .. } => None,
            Command::Stop { name } => Some(ControlRequest::Algo(name, AlgoCommand::Stop)),
            Command::Pause { name } => Some(ControlRequest::Algo(name, AlgoCommand::Pause)),
            Command::Unpause { name } => Some(ControlRequest::Algo(name, AlgoCommand::Unpause)),
            Command::PauseProduct { name, product_id } => Some(ControlRequest::Product(
                name,
                ProductId(*product_id),
                ProductCommand::Pause,
            )),
            Command::UnpauseProduct { name, product_id } => Some(ControlRequest::Product(
                name,
                ProductId(*product_id),
                ProductCommand::Unpause,
            )),
        }
    }
}

async fn send_control(controller: &dyn AlgoController, request: ControlRequest<'_>) -> Result<()> {
    match request {
        ControlRequest::Algo(name, command) => controller.send_algo_command(name, command).await,
        ControlRequest::Product(name, product_id, command) => {
            controller
                .send_product_command(name, product_id, command)
                .await
        }
    }
}

fn print_snapshot(snapshot: &PolledSnapshot) {
    println!("-- {} --", snapshot.fetched_at.format("%H:%M:%S"));
    for line in render_dashboard(&snapshot.algos) {
        println!("{line}");
    }
}

async fn watch(client: AlgoClient, interval: Duration) -> Result<()> {
    let poller = spawn_poller(client, interval);
    let mut updates = WatchStream::new(poller.subscribe());
    loop {
        tokio::select! {
            update = updates.next() => match update {
                Some(Some(snapshot)) => print_snapshot(&snapshot),
                Some(None) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("warn,algoctl=info,client_core=info")
        .init();
    let cli = Cli::parse();
    let client = AlgoClient::new(&cli.server_url)?;

    if let Some(request) = cli.command.control_request() {
        if cli.dry_run {
            send_control(&LoggingAlgoController::new(), request).await?;
        } else {
            send_control(&client, request).await?;
            info!(server = %client.server_url(), "command sent");
        }
        return Ok(());
    }

    match cli.command {
        Command::Watch { interval_secs } => {
            watch(client, Duration::from_secs(interval_secs.max(1))).await?
        }
        _ => {
            let algos = client.fetch_algos().await?;
            for line in render_dashboard(&algos) {
                println!("{line}");
            }
        }
    }

    Ok(())
}
