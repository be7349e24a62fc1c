#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use reqwest::StatusCode;
use serde_json::Value;

use fbr_match_stats::config::Settings;
use fbr_match_stats::fbr_api::{ApiKey, FbrClient};
use fbr_match_stats::http_client::{Reply, Transport};
use fbr_match_stats::pacing::{Pacer, Pause};

#[derive(Debug, Clone)]
pub struct Call {
    pub method: &'static str,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub api_key: Option<String>,
}

impl Call {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

type Responder = Box<dyn FnMut(&Call) -> Result<Reply>>;

/// In-memory transport; every exchange is logged and answered by a closure.
#[derive(Clone)]
pub struct ScriptedTransport {
    calls: Rc<RefCell<Vec<Call>>>,
    responder: Rc<RefCell<Responder>>,
}

impl ScriptedTransport {
    pub fn new(responder: impl FnMut(&Call) -> Result<Reply> + 'static) -> Self {
        Self {
            calls: Rc::new(RefCell::new(Vec::new())),
            responder: Rc::new(RefCell::new(Box::new(responder))),
        }
    }

    /// Answers GETs from `statuses` in order; 200 replies carry `body`.
    pub fn with_statuses(statuses: Vec<u16>, body: Value) -> Self {
        let mut queue = statuses.into_iter();
        Self::new(move |_| {
            let code = queue.next().ok_or_else(|| anyhow!("script exhausted"))?;
            let status = StatusCode::from_u16(code)?;
            let text = if status.is_success() {
                body.to_string()
            } else {
                String::from("{\"detail\": \"error\"}")
            };
            Ok(Reply::new(status, text))
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .cloned()
            .collect()
    }

    fn answer(&self, call: Call) -> Result<Reply> {
        self.calls.borrow_mut().push(call.clone());
        let mut responder = self.responder.borrow_mut();
        (&mut **responder)(&call)
    }
}

fn endpoint_of(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_string()
}

impl Transport for ScriptedTransport {
    fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, String)],
    ) -> Result<Reply> {
        let api_key = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("x-api-key"))
            .map(|(_, v)| v.to_string());
        self.answer(Call {
            method: "GET",
            endpoint: endpoint_of(url),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            api_key,
        })
    }

    fn post(&self, url: &str) -> Result<Reply> {
        self.answer(Call {
            method: "POST",
            endpoint: endpoint_of(url),
            query: Vec::new(),
            api_key: None,
        })
    }
}

#[derive(Clone, Default)]
pub struct RecordingPacer {
    pauses: Rc<RefCell<Vec<Pause>>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Pause> {
        self.pauses.borrow().clone()
    }

    pub fn count(&self, kind: Pause) -> usize {
        self.pauses.borrow().iter().filter(|p| **p == kind).count()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, kind: Pause) {
        self.pauses.borrow_mut().push(kind);
    }
}

pub type TestClient = FbrClient<ScriptedTransport, RecordingPacer>;

pub fn client_with_key(transport: &ScriptedTransport, pacer: &RecordingPacer) -> TestClient {
    FbrClient::new(transport.clone(), pacer.clone(), &Settings::default())
        .with_api_key(ApiKey::new("test-key"))
}

pub fn client_without_key(transport: &ScriptedTransport, pacer: &RecordingPacer) -> TestClient {
    FbrClient::new(transport.clone(), pacer.clone(), &Settings::default())
}

pub fn ok_json(body: &Value) -> Result<Reply> {
    Ok(Reply::new(StatusCode::OK, body.to_string()))
}

pub fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be valid json")
}
