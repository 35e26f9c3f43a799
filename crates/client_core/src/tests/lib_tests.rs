use super::*;
use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::{AlgoState, Product, ProductState},
    error::ErrorCode,
};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockState {
    posted: Arc<Mutex<Vec<String>>>,
}

fn sample_algos() -> Vec<Algo> {
    vec![Algo {
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
    }]
}

async fn mock_algos() -> Json<Vec<Algo>> {
    Json(sample_algos())
}

async fn mock_algo_command(
    State(state): State<MockState>,
    Path((name, action)): Path<(String, String)>,
) -> Json<Ack> {
    state.posted.lock().await.push(format!("{name}/{action}"));
    Json(Ack::default())
}

async fn mock_product_command(
    State(state): State<MockState>,
    Path((name, product_id, action)): Path<(String, String, String)>,
) -> Json<Ack> {
    state
        .posted
        .lock()
        .await
        .push(format!("{name}/{product_id}/{action}"));
    Json(Ack::default())
}

async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/algos", get(mock_algos))
        .route("/algos/:name/:action", post(mock_algo_command))
        .route("/algos/:name/:product_id/:action", post(mock_product_command))
        .with_state(state.clone());
    (spawn_server(app).await, state)
}

#[tokio::test]
async fn fetch_algos_decodes_snapshot() {
    let (url, _state) = spawn_mock().await;
    let client = AlgoClient::new(&url).expect("client");
    let algos = client.fetch_algos().await.expect("algos");
    assert_eq!(algos, sample_algos());
}

#[tokio::test]
async fn control_commands_post_to_rest_paths() {
    let (url, state) = spawn_mock().await;
    let client = AlgoClient::new(&url).expect("client");

    client.stop_algo("LSE_0").await.expect("stop");
    client.pause_algo("LSE_0").await.expect("pause");
    client.unpause_algo("LSE 1").await.expect("unpause");
    client
        .pause_product("LSE_0", ProductId(1))
        .await
        .expect("pause product");
    client
        .send_product_command("LSE_0", ProductId(1), ProductCommand::Unpause)
        .await
        .expect("unpause product");

    assert_eq!(
        *state.posted.lock().await,
        vec![
            "LSE_0/stop",
            "LSE_0/pause",
            "LSE 1/unpause",
            "LSE_0/1/pause",
            "LSE_0/1/unpause",
        ]
    );
}

#[tokio::test]
async fn server_error_surfaces_api_error_message() {
    let app = Router::new().route(
        "/algos",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, "algo store lock poisoned")),
            )
        }),
    );
    let url = spawn_server(app).await;
    let client = AlgoClient::new(&url).expect("client");

    let err = client.fetch_algos().await.expect_err("should fail");
    let ClientError::Server { status, message } = err else {
        panic!("expected server error");
    };
    assert_eq!(status, 500);
    assert_eq!(message, "algo store lock poisoned");
}

#[tokio::test]
async fn server_error_without_api_error_body_keeps_raw_text() {
    let app = Router::new().route(
        "/algos",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let url = spawn_server(app).await;
    let client = AlgoClient::new(&url).expect("client");

    let err = client.fetch_algos().await.expect_err("should fail");
    assert!(matches!(
        err,
        ClientError::Server { status: 502, ref message } if message == "upstream down"
    ));
}

#[test]
fn rejects_urls_that_cannot_take_paths() {
    assert!(matches!(
        AlgoClient::new("not a url"),
        Err(ClientError::InvalidUrl(_))
    ));
    assert!(matches!(
        AlgoClient::new("mailto:ops@example.com"),
        Err(ClientError::InvalidUrl(_))
    ));
}

#[test]
fn endpoint_keeps_base_path_and_encodes_names() {
    let client = AlgoClient::new("http://localhost:5000/api/").expect("client");
    let url = client
        .endpoint(algo_command_segments("LSE 0/x", AlgoCommand::Stop))
        .expect("url");
    assert_eq!(url.as_str(), "http://localhost:5000/api/algos/LSE%200%2Fx/stop");

    let client = AlgoClient::new("http://localhost:5000").expect("client");
    assert_eq!(
        client.endpoint(["algos"]).expect("url").as_str(),
        "http://localhost:5000/algos"
    );
}

#[tokio::test]
async fn logging_controller_records_without_network() {
    let controller = LoggingAlgoController::new();
    controller
        .send_algo_command("LSE_0", AlgoCommand::Stop)
        .await
        .expect("stop");
    controller
        .unpause_product("LSE_1", ProductId(3))
        .await
        .expect("unpause");

    assert_eq!(
        controller.calls().await,
        vec![
            ControlCall::Algo {
                algo_name: "LSE_0".into(),
                command: AlgoCommand::Stop,
            },
            ControlCall::Product {
                algo_name: "LSE_1".into(),
                product_id: ProductId(3),
                command: ProductCommand::Unpause,
            },
        ]
    );
}

#[tokio::test]
async fn poller_publishes_snapshots() {
    let (url, _state) = spawn_mock().await;
    let client = AlgoClient::new(&url).expect("client");
    let poller = spawn_poller(client, Duration::from_millis(50));
    let mut updates = poller.subscribe();

    tokio::time::timeout(Duration::from_secs(5), async {
        while updates.borrow_and_update().is_none() {
            updates.changed().await.expect("poller alive");
        }
    })
    .await
    .expect("snapshot within timeout");

    let snapshot = poller.latest().expect("snapshot");
    assert_eq!(snapshot.algos, sample_algos());
}

#[tokio::test]
async fn poller_keeps_running_after_fetch_errors() {
    let client = AlgoClient::new("http://127.0.0.1:9").expect("client");
    let poller = spawn_poller(client, Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(poller.latest().is_none());
    assert!(poller.is_running());
}
