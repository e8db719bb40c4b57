//! Shared test harness: an in-memory transport with scriptable responses
//!
//! Lets cache tests control exactly what the "backend" returns per
//! operation, record every call, and hold individual operations open to
//! exercise in-flight invalidation.

use async_trait::async_trait;
use folio::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

#[derive(Default)]
struct MockState {
    /// Operation id -> response to return
    responses: HashMap<String, Value>,
    /// Operation id -> error to return instead
    failures: HashMap<String, FetchError>,
    /// Operation id -> gate the call must wait on before settling
    gates: HashMap<String, Arc<Notify>>,
    /// Every call, in order, as (operation id, resolved id)
    calls: Vec<(String, Option<String>)>,
}

/// Scriptable in-memory backend
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script the response for an operation
    pub fn respond(&self, operation: &str, value: Value) {
        self.lock().responses.insert(operation.to_string(), value);
        self.lock().failures.remove(operation);
    }

    /// Script a failure for an operation
    pub fn fail(&self, operation: &str, error: FetchError) {
        self.lock().failures.insert(operation.to_string(), error);
    }

    /// Hold calls to an operation open on a gate
    ///
    /// Returns the gate; call `notify_one()` per held call to let it
    /// settle, and [`MockBackend::unhold`] to stop gating new calls.
    pub fn hold(&self, operation: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock()
            .gates
            .insert(operation.to_string(), Arc::clone(&gate));
        gate
    }

    /// Stop holding an operation
    pub fn unhold(&self, operation: &str) {
        self.lock().gates.remove(operation);
    }

    /// Number of calls recorded for an operation
    pub fn call_count(&self, operation: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|(op, _)| op == operation)
            .count()
    }

}

#[async_trait]
impl Transport for MockBackend {
    async fn execute(
        &self,
        descriptor: &EndpointDescriptor,
        params: &RequestParams,
    ) -> Result<Value, FetchError> {
        let gate = {
            let mut state = self.lock();
            state
                .calls
                .push((descriptor.operation.clone(), params.id.clone()));
            state.gates.get(&descriptor.operation).map(Arc::clone)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let state = self.lock();
        if let Some(error) = state.failures.get(&descriptor.operation) {
            return Err(error.clone());
        }
        Ok(state
            .responses
            .get(&descriptor.operation)
            .cloned()
            .unwrap_or(Value::Null))
    }
}

/// An [`ApiClient`] over a fresh [`MockBackend`]
///
/// Logging is initialized once per test binary; set `RUST_LOG` to see
/// the cache layer's debug output.
pub fn mock_client() -> (ApiClient, MockBackend) {
    static TRACING: std::sync::Once = std::sync::Once::new();
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });

    let backend = MockBackend::new();
    let client = ApiClient::builder()
        .with_transport(backend.clone())
        .build()
        .expect("mock client builds");
    (client, backend)
}
