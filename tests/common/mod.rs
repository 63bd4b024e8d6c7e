#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use switchboard::Request;

/// Route engine logs to stderr when `RUST_LOG` asks for them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Minimal parsed-request stand-in for engine tests.
pub struct TestRequest {
    method: String,
    path: String,
    body: HashMap<String, String>,
    session: Option<String>,
}

impl TestRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            body: HashMap::new(),
            session: None,
        }
    }

    pub fn get(path: &str) -> Arc<dyn Request> {
        Self::new("GET", path).into_arc()
    }

    pub fn with_session(mut self, id: &str) -> Self {
        self.session = Some(id.to_string());
        self
    }

    pub fn with_body(mut self, key: &str, value: &str) -> Self {
        self.body.insert(key.to_string(), value.to_string());
        self
    }

    pub fn into_arc(self) -> Arc<dyn Request> {
        Arc::new(self)
    }
}

impl Request for TestRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn url(&self) -> &str {
        &self.path
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn content_length(&self) -> usize {
        self.body.values().map(String::len).sum()
    }

    fn body_params(&self) -> &HashMap<String, String> {
        &self.body
    }

    fn session_id(&self) -> Option<&str> {
        self.session.as_deref()
    }
}
