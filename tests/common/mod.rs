//! Shared utilities for integration tests: a programmable mock Bitcoin node
//! and a console server bound to an ephemeral port.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use node_console::config::schema::NodeConfig;
use node_console::config::ConsoleConfig;
use node_console::http::HttpServer;
use node_console::lifecycle::Shutdown;

pub const RPC_USER: &str = "rpcuser";
pub const RPC_PASSWORD: &str = "rpcpass";

/// One request as the mock node saw it.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub method: String,
    pub params: Value,
    pub id: Value,
    pub jsonrpc: Value,
    pub authorization: Option<String>,
}

/// How the mock answers one call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Result(Value),
    Error { code: i64, message: String },
    /// Raw HTTP status and body, no envelope.
    Raw(u16, String),
    /// Wait before answering with the inner reply.
    Delayed(Duration, Box<MockReply>),
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<HashMap<String, VecDeque<MockReply>>>,
}

/// Mock node listening on an ephemeral port.
#[derive(Clone)]
pub struct MockNode {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn node_config(&self) -> NodeConfig {
        NodeConfig {
            url: self.url(),
            rpc_user: RPC_USER.to_string(),
            rpc_password: RPC_PASSWORD.to_string(),
            rpc_timeout_secs: 5,
        }
    }

    pub fn reply(&self, method: &str, reply: MockReply) -> &Self {
        self.state
            .replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn ok(&self, method: &str, result: Value) -> &Self {
        self.reply(method, MockReply::Result(result))
    }

    pub fn error(&self, method: &str, code: i64, message: &str) -> &Self {
        self.reply(
            method,
            MockReply::Error {
                code,
                message: message.to_string(),
            },
        )
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.method).collect()
    }
}

/// Start a mock node. Methods with nothing scripted answer
/// `-32601 Method not found`.
pub async fn start_mock_node() -> MockNode {
    let state = Arc::new(MockState::default());
    let app = Router::new().fallback(handle_rpc).with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode { addr, state }
}

async fn handle_rpc(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, "bad json").into_response(),
    };
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let id = request["id"].clone();

    state.calls.lock().unwrap().push(RecordedCall {
        path: uri.path().to_string(),
        method: method.clone(),
        params: request["params"].clone(),
        id: id.clone(),
        jsonrpc: request["jsonrpc"].clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .get_mut(&method)
        .and_then(|queue| queue.pop_front())
        .unwrap_or(MockReply::Error {
            code: -32601,
            message: "Method not found".to_string(),
        });

    render(reply, id).await
}

async fn render(mut reply: MockReply, id: Value) -> Response {
    while let MockReply::Delayed(delay, inner) = reply {
        tokio::time::sleep(delay).await;
        reply = *inner;
    }
    match reply {
        MockReply::Result(result) => {
            axum::Json(json!({ "result": result, "error": null, "id": id })).into_response()
        }
        MockReply::Error { code, message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({
                "result": null,
                "error": { "code": code, "message": message },
                "id": id
            })),
        )
            .into_response(),
        MockReply::Raw(status, body) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response(),
        MockReply::Delayed(..) => unreachable!(),
    }
}

/// A running console API.
pub struct Console {
    pub addr: SocketAddr,
    pub shutdown: Arc<Shutdown>,
    pub http: reqwest::Client,
}

impl Console {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let res = self.http.get(self.url(path)).send().await.unwrap();
        read(res).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let res = self.http.post(self.url(path)).json(&body).send().await.unwrap();
        read(res).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (u16, Value) {
        let res = self.http.put(self.url(path)).json(&body).send().await.unwrap();
        read(res).await
    }

    pub async fn select_wallet(&self, wallet: &str) {
        let (status, _) = self.put("/api/session", json!({ "wallet": wallet })).await;
        assert_eq!(status, 200);
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

async fn read(res: reqwest::Response) -> (u16, Value) {
    let status = res.status().as_u16();
    let text = res.text().await.unwrap();
    (status, serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Start the console against `node`, letting the test adjust config.
pub async fn start_console(node: &MockNode, tweak: impl FnOnce(&mut ConsoleConfig)) -> Console {
    let mut config = ConsoleConfig::default();
    config.node = node.node_config();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    tweak(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Shutdown::new());
    let server = HttpServer::new(config).unwrap();
    let signalled = shutdown.signalled();
    tokio::spawn(async move {
        let _ = server.run(listener, signalled).await;
    });

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    Console {
        addr,
        shutdown,
        http,
    }
}

pub fn unspent(txid: &str, vout: u32, btc: f64) -> Value {
    json!({
        "txid": txid, "vout": vout, "address": "bcrt1qowned",
        "amount": btc, "confirmations": 6,
        "spendable": true, "solvable": true, "safe": true
    })
}

/// Script a full successful build → sign → broadcast.
pub fn script_send(node: &MockNode, txid: &str) {
    node.ok("createrawtransaction", json!("0200000001unsigned"))
        .ok(
            "signrawtransactionwithwallet",
            json!({ "hex": "0200000001signed", "complete": true }),
        )
        .ok("sendrawtransaction", json!(txid));
}

/// Script the four info calls behind the node status view.
pub fn script_node_status(node: &MockNode) {
    node.ok(
        "getblockchaininfo",
        json!({
            "chain": "regtest", "blocks": 150, "headers": 150,
            "bestblockhash": "0f".repeat(32), "difficulty": 4.6e-10,
            "time": 1700000000, "mediantime": 1700000000,
            "verificationprogress": 1.0, "initialblockdownload": false,
            "chainwork": "0000012c", "size_on_disk": 45000, "pruned": false,
            "warnings": ""
        }),
    )
    .ok(
        "getmempoolinfo",
        json!({
            "loaded": true, "size": 2, "bytes": 450, "usage": 2800,
            "total_fee": 0.00002, "maxmempool": 300000000,
            "mempoolminfee": 0.00001, "minrelaytxfee": 0.00001
        }),
    )
    .ok(
        "getmininginfo",
        json!({
            "blocks": 150, "difficulty": 4.6e-10, "networkhashps": 0.0012,
            "pooledtx": 2, "chain": "regtest", "warnings": []
        }),
    )
    .ok(
        "getnetworkinfo",
        json!({
            "version": 270000, "subversion": "/Satoshi:27.0.0/", "protocolversion": 70016,
            "networkactive": true, "connections": 0, "relayfee": 0.00001
        }),
    );
}
