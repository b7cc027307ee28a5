//! Cross-cutting end-to-end scenarios, driven over real HTTP against a
//! locally bound router, mirroring how a deployer's integration tests would
//! exercise the control plane.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gargamel_gc::{FakeGcClient, GcClient, GcClientFactory, GcEvent};
use gargamel_gc::{RawLobbyObject, RawMember};
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tokio::time::sleep;

use gargamel_server::control::{self, AppState};
use gargamel_server::session::state::TimingConfig;

/// A [`GcClientFactory`] that remembers every [`FakeGcClient`] it hands out
/// (keyed by game id) so a test can both inspect recorded calls and inject
/// events through the sender half the production factory discards.
#[derive(Default)]
struct TestFactory {
    handles: Mutex<HashMap<String, (Arc<FakeGcClient>, mpsc::UnboundedSender<GcEvent>)>>,
}

impl TestFactory {
    async fn handle(&self, game_id: &str) -> (Arc<FakeGcClient>, mpsc::UnboundedSender<GcEvent>) {
        self.handles
            .lock()
            .await
            .get(game_id)
            .cloned()
            .expect("factory never created a client for this game id")
    }
}

#[async_trait]
impl GcClientFactory for TestFactory {
    async fn create(
        &self,
        game_id: &str,
    ) -> anyhow::Result<(Arc<dyn GcClient>, mpsc::UnboundedReceiver<GcEvent>)> {
        let (client, tx, rx) = FakeGcClient::new(900_000_001);
        self.handles
            .lock()
            .await
            .insert(game_id.to_string(), (client.clone(), tx));
        let client: Arc<dyn GcClient> = client;
        Ok((client, rx))
    }
}

/// Every timing knob zeroed so background delays in lifecycle/protocol code
/// don't slow the test suite down; the fixed in-code pauses (`POST_LOGIN_PAUSE`,
/// `POST_HELLO_PAUSE`, the launch pre-dispatch pause) still apply.
fn fast_timing() -> TimingConfig {
    TimingConfig {
        keepalive_interval_secs: 60,
        invite_delay_secs: 0,
        bot_eject_recheck_secs: 0,
        reconnect_delay_secs: 0,
        gc_bootstrap_wait_secs: 0,
    }
}

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    factory: Arc<TestFactory>,
}

async fn spawn_app() -> TestApp {
    let factory = Arc::new(TestFactory::default());
    let state = AppState::new(factory.clone(), fast_timing());
    let app = control::run::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        factory,
    }
}

fn lobby_object(lobby_id: u64, members: Vec<(u64, i32)>) -> RawLobbyObject {
    RawLobbyObject {
        lobby_id,
        server_region: 2,
        members: members
            .into_iter()
            .map(|(steam_id, team)| RawMember {
                steam_id,
                team,
                name: format!("player-{steam_id}"),
            })
            .collect(),
        ..Default::default()
    }
}

async fn wait_for_state(app: &TestApp, game_id: &str, want: &str, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let body: serde_json::Value = app
            .client
            .get(format!("{}/game/{}", app.base_url, game_id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if body["state"] == want {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for state={want}, last body={body}");
        }
        sleep(Duration::from_millis(25)).await;
    }
}

async fn wait_for_removed(app: &TestApp, game_id: &str, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let status = app
            .client
            .get(format!("{}/game/{}", app.base_url, game_id))
            .send()
            .await
            .unwrap()
            .status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {game_id} to be removed from the registry");
        }
        sleep(Duration::from_millis(25)).await;
    }
}

async fn wait_for_recorded_call_count(
    app: &TestApp,
    game_id: &str,
    predicate: impl Fn(&[gargamel_gc::RecordedCall]) -> bool,
    timeout: Duration,
) {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let (client, _tx) = app.factory.handle(game_id).await;
        if predicate(&client.recorded_calls().await) {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for recorded-call condition on {game_id}");
        }
        sleep(Duration::from_millis(25)).await;
    }
}

async fn create_game(app: &TestApp, body: serde_json::Value) -> serde_json::Value {
    let resp = app
        .client
        .post(format!("{}/game", app.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    resp.json().await.unwrap()
}

/// Scenario 1 (happy path): create, observe the lobby, seat both full
/// rosters, launch, report a final result, and tear down.
#[tokio::test]
async fn happy_path_reaches_in_progress_then_completes_and_tears_down() {
    let app = spawn_app().await;
    create_game(
        &app,
        json!({
            "game_id": "happy1",
            "username": "bot",
            "password": "secret",
            "radiant_team": [1, 2],
            "dire_team": [3, 4],
            "result_url": "http://127.0.0.1:1/unreachable",
        }),
    )
    .await;

    wait_for_recorded_call_count(
        &app,
        "happy1",
        |calls| calls.iter().any(|c| matches!(c, gargamel_gc::RecordedCall::CreateLobby(_))),
        Duration::from_secs(10),
    )
    .await;

    let (_client, tx) = app.factory.handle("happy1").await;
    tx.send(GcEvent::PracticeLobbyUpdate(gargamel_gc::LobbyModel::parse(
        &lobby_object(555, vec![]),
    )))
    .unwrap();

    wait_for_state(&app, "happy1", "waiting", Duration::from_secs(5)).await;

    tx.send(GcEvent::SoMultipleObjects {
        added: vec![gargamel_gc::LobbyModel::parse(&lobby_object(
            555,
            vec![(1, 0), (2, 0), (3, 1), (4, 1)],
        ))],
        modified: vec![],
    })
    .unwrap();

    wait_for_state(&app, "happy1", "in_progress", Duration::from_secs(5)).await;

    let mut postgame = lobby_object(555, vec![(1, 0), (2, 0), (3, 1), (4, 1)]);
    postgame.state = 3;
    postgame.match_id = 9001;
    postgame.match_outcome = 2;
    tx.send(GcEvent::SoMultipleObjects {
        added: vec![],
        modified: vec![gargamel_gc::LobbyModel::parse(&postgame)],
    })
    .unwrap();

    wait_for_removed(&app, "happy1", Duration::from_secs(5)).await;
}

/// Scenario 4 (auto-poll): an explicit `action=start`/`action=end` poll
/// cycle gates launch until the operator resolves it, the way the automatic
/// threshold-triggered path would.
#[tokio::test]
async fn poll_gates_launch_until_explicitly_ended() {
    let app = spawn_app().await;
    create_game(
        &app,
        json!({
            "game_id": "poll1",
            "username": "bot",
            "password": "secret",
            "radiant_team": [1, 2],
            "dire_team": [3, 4],
            "result_url": "http://127.0.0.1:1/unreachable",
        }),
    )
    .await;

    let resp = app
        .client
        .post(format!("{}/poll/poll1", app.base_url))
        .json(&json!({ "action": "start" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    wait_for_recorded_call_count(
        &app,
        "poll1",
        |calls| calls.iter().any(|c| matches!(c, gargamel_gc::RecordedCall::CreateLobby(_))),
        Duration::from_secs(10),
    )
    .await;
    let (_client, tx) = app.factory.handle("poll1").await;
    tx.send(GcEvent::SoMultipleObjects {
        added: vec![gargamel_gc::LobbyModel::parse(&lobby_object(
            777,
            vec![(1, 0), (2, 0), (3, 1), (4, 1)],
        ))],
        modified: vec![],
    })
    .unwrap();

    // Give the seating loop a moment; launch must not happen while polling.
    sleep(Duration::from_millis(200)).await;
    let status: serde_json::Value = app
        .client
        .get(format!("{}/game/poll1", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(status["state"], "in_progress");

    let resp = app
        .client
        .post(format!("{}/poll/poll1", app.base_url))
        .json(&json!({ "action": "end", "game_mode": 22 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    wait_for_state(&app, "poll1", "in_progress", Duration::from_secs(5)).await;
}

/// Scenario 2/3 (swap): opposite-team swaps succeed; same-team swaps are
/// rejected with the documented message.
#[tokio::test]
async fn swap_moves_opposite_team_players_and_rejects_same_team_swap() {
    let app = spawn_app().await;
    create_game(
        &app,
        json!({
            "game_id": "swap1",
            "username": "bot",
            "password": "secret",
            "radiant_team": [1, 2],
            "dire_team": [3, 4],
            "result_url": "http://127.0.0.1:1/unreachable",
        }),
    )
    .await;

    let resp = app
        .client
        .post(format!("{}/game/swap1/swap", app.base_url))
        .json(&json!({ "steam_id_1": 1, "steam_id_2": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Players must be on opposite teams"));

    let resp = app
        .client
        .post(format!("{}/game/swap1/swap", app.base_url))
        .json(&json!({ "steam_id_1": 1, "steam_id_2": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let status: serde_json::Value = app
        .client
        .get(format!("{}/game/swap1", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // radiant_team/dire_team mirror the configured roster, so the swap is
    // visible immediately even though no GC snapshot has landed yet.
    assert_eq!(status["radiant_team"], json!([2, 3]));
    assert_eq!(status["dire_team"], json!([4, 1]));
    assert_eq!(status["radiant_count"], 2);
    assert_eq!(status["dire_count"], 2);
}

/// Scenario 6 (delete mid-flight): deleting a waiting game disconnects the
/// GC client, removes it from the registry, and future lookups 404.
#[tokio::test]
async fn delete_mid_flight_tears_down_and_removes_from_registry() {
    let app = spawn_app().await;
    create_game(
        &app,
        json!({
            "game_id": "del1",
            "username": "bot",
            "password": "secret",
            "radiant_team": [1, 2],
            "dire_team": [3, 4],
            "result_url": "http://127.0.0.1:1/unreachable",
        }),
    )
    .await;

    let resp = app
        .client
        .delete(format!("{}/game/del1", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = app
        .client
        .get(format!("{}/game/del1", app.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    wait_for_recorded_call_count(
        &app,
        "del1",
        |calls| calls.iter().any(|c| matches!(c, gargamel_gc::RecordedCall::Disconnect)),
        Duration::from_secs(5),
    )
    .await;
}

/// Scenario 5 (reconnect): losing and regaining the GC session re-issues
/// `CreateLobby` and re-arms `invitesSent` for the new lobby object.
#[tokio::test]
async fn reconnect_recreates_lobby_and_resets_invite_flag() {
    let app = spawn_app().await;
    create_game(
        &app,
        json!({
            "game_id": "rec1",
            "username": "bot",
            "password": "secret",
            "radiant_team": [1, 2],
            "dire_team": [3, 4],
            "result_url": "http://127.0.0.1:1/unreachable",
        }),
    )
    .await;

    wait_for_recorded_call_count(
        &app,
        "rec1",
        |calls| calls.iter().any(|c| matches!(c, gargamel_gc::RecordedCall::CreateLobby(_))),
        Duration::from_secs(10),
    )
    .await;

    let (client, tx) = app.factory.handle("rec1").await;
    let create_lobby_calls_before = client
        .recorded_calls()
        .await
        .iter()
        .filter(|c| matches!(c, gargamel_gc::RecordedCall::CreateLobby(_)))
        .count();

    tx.send(GcEvent::PracticeLobbyUpdate(gargamel_gc::LobbyModel::parse(
        &lobby_object(111, vec![]),
    )))
    .unwrap();
    wait_for_state(&app, "rec1", "waiting", Duration::from_secs(5)).await;

    tx.send(GcEvent::ConnectionStatusChanged(gargamel_gc::ConnectionStatus::NoSession))
        .unwrap();
    tx.send(GcEvent::ConnectionStatusChanged(gargamel_gc::ConnectionStatus::HaveSession))
        .unwrap();

    wait_for_recorded_call_count(
        &app,
        "rec1",
        move |calls| {
            calls
                .iter()
                .filter(|c| matches!(c, gargamel_gc::RecordedCall::CreateLobby(_)))
                .count()
                > create_lobby_calls_before
        },
        Duration::from_secs(5),
    )
    .await;
}
