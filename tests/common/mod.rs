#![allow(dead_code)]

use e2c_gateway::application::gateway::GatewayClient;
use e2c_gateway::config::{Environment, GatewayConfig};
use e2c_gateway::infrastructure::in_memory::{InMemorySigner, InMemoryTransport};
use serde_json::{Value, json};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

pub const TERMINAL_KEY: &str = "test_key";

/// A client wired to in-memory fakes; the returned handles share state
/// with the ones inside the client.
pub fn fake_client() -> (GatewayClient, InMemorySigner, InMemoryTransport) {
    let signer = InMemorySigner::new(b"base64digest", b"base64sign", Some("hexserial"));
    let transport = InMemoryTransport::new();
    let config = GatewayConfig::new(TERMINAL_KEY, Environment::Test).unwrap();
    let client = GatewayClient::new(config, Box::new(signer.clone()), Box::new(transport.clone()));
    (client, signer, transport)
}

/// A successful answer: `fields` merged over the common envelope.
pub fn success(fields: Value) -> Value {
    let mut body = json!({
        "TerminalKey": TERMINAL_KEY,
        "Success": true,
        "ErrorCode": "0",
    });
    if let (Some(body), Value::Object(fields)) = (body.as_object_mut(), fields) {
        body.extend(fields);
    }
    body
}

pub fn failure() -> Value {
    json!({
        "TerminalKey": TERMINAL_KEY,
        "Success": false,
        "ErrorCode": "1",
        "Message": "Some error",
        "Details": "There is an error here",
    })
}

/// Log lines written while the returned guard is alive on this thread.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
