// SPDX-FileCopyrightText: 2026 B-Fabric Web Apps Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory LIMS for deterministic tests.
//!
//! `MockLims` implements both [`LimsClient`] and [`LimsConnector`]. Clients
//! handed out by the connector share the same store and tag every recorded
//! call with the principal they were opened for (`user:<name>` or
//! `power_user:<Environment>`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;

use bfabric_core::{BfabricError, Environment, LimsClient, LimsConnector, SessionContext};

/// First ID handed out for records created through `save` or uploads.
const FIRST_GENERATED_ID: i64 = 1000;

/// One call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub principal: String,
    pub operation: &'static str,
    pub endpoint: String,
    pub payload: Value,
}

/// An upload observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockUpload {
    pub name: String,
    pub content: Vec<u8>,
    pub workunit_id: i64,
}

/// Scripted failure: `operation` on `endpoint`, optionally only when the
/// payload field `field` equals `value`.
#[derive(Debug, Clone)]
struct FailureRule {
    operation: &'static str,
    endpoint: String,
    when: Option<(String, Value)>,
}

impl FailureRule {
    fn matches(&self, operation: &str, endpoint: &str, payload: &Value) -> bool {
        self.operation == operation
            && self.endpoint == endpoint
            && self
                .when
                .as_ref()
                .is_none_or(|(field, value)| payload.get(field) == Some(value))
    }
}

#[derive(Default)]
struct MockState {
    records: HashMap<String, Vec<Value>>,
    next_id: i64,
    failures: Vec<FailureRule>,
    calls: Vec<MockCall>,
    uploads: Vec<MockUpload>,
    power_user_unavailable: bool,
}

impl MockState {
    fn check(&self, operation: &'static str, endpoint: &str, payload: &Value) -> Result<(), BfabricError> {
        if self.failures.iter().any(|r| r.matches(operation, endpoint, payload)) {
            return Err(BfabricError::lims(endpoint, format!("scripted {operation} failure")));
        }
        Ok(())
    }

    fn generate_id(&mut self) -> i64 {
        let id = FIRST_GENERATED_ID + self.next_id;
        self.next_id += 1;
        id
    }
}

/// A shared in-memory LIMS.
#[derive(Clone)]
pub struct MockLims {
    state: Arc<Mutex<MockState>>,
    principal: String,
}

impl MockLims {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            principal: "direct".to_string(),
        }
    }

    fn as_principal(&self, principal: String) -> Self {
        Self {
            state: Arc::clone(&self.state),
            principal,
        }
    }

    /// Adds a record to `endpoint`.
    pub async fn insert(&self, endpoint: &str, record: Value) {
        self.state
            .lock()
            .await
            .records
            .entry(endpoint.to_string())
            .or_default()
            .push(record);
    }

    /// Makes every `save` on `endpoint` fail.
    pub async fn fail_save(&self, endpoint: &str) {
        self.push_rule("save", endpoint, None).await;
    }

    /// Makes `save` on `endpoint` fail when the object's `field` equals `value`.
    pub async fn fail_save_when(&self, endpoint: &str, field: &str, value: Value) {
        self.push_rule("save", endpoint, Some((field.to_string(), value)))
            .await;
    }

    /// Makes every `read` on `endpoint` fail.
    pub async fn fail_read(&self, endpoint: &str) {
        self.push_rule("read", endpoint, None).await;
    }

    /// Makes uploads to `workunit_id` fail.
    pub async fn fail_upload_for(&self, workunit_id: i64) {
        self.push_rule("upload", "resource", Some(("workunitid".to_string(), json!(workunit_id))))
            .await;
    }

    /// Makes [`LimsConnector::power_user`] return a configuration error.
    pub async fn disable_power_user(&self) {
        self.state.lock().await.power_user_unavailable = true;
    }

    async fn push_rule(&self, operation: &'static str, endpoint: &str, when: Option<(String, Value)>) {
        self.state.lock().await.failures.push(FailureRule {
            operation,
            endpoint: endpoint.to_string(),
            when,
        });
    }

    /// All calls observed so far, oldest first.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.state.lock().await.calls.clone()
    }

    /// Calls of one operation on one endpoint.
    pub async fn calls_to(&self, operation: &str, endpoint: &str) -> Vec<MockCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|c| c.operation == operation && c.endpoint == endpoint)
            .collect()
    }

    pub async fn uploads(&self) -> Vec<MockUpload> {
        self.state.lock().await.uploads.clone()
    }

    /// Current records stored under `endpoint`.
    pub async fn records(&self, endpoint: &str) -> Vec<Value> {
        self.state
            .lock()
            .await
            .records
            .get(endpoint)
            .cloned()
            .unwrap_or_default()
    }

    fn record_call(&self, state: &mut MockState, operation: &'static str, endpoint: &str, payload: &Value) {
        state.calls.push(MockCall {
            principal: self.principal.clone(),
            operation,
            endpoint: endpoint.to_string(),
            payload: payload.clone(),
        });
    }
}

impl Default for MockLims {
    fn default() -> Self {
        Self::new()
    }
}

/// True when every key of `query` is present in `record` with an equal value.
fn matches_query(record: &Value, query: &Value) -> bool {
    match query.as_object() {
        Some(fields) => fields.iter().all(|(k, v)| record.get(k) == Some(v)),
        None => true,
    }
}

/// Shallow-merges `update` into `target`.
fn merge(target: &mut Value, update: &Map<String, Value>) {
    if let Some(obj) = target.as_object_mut() {
        for (k, v) in update {
            obj.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl LimsClient for MockLims {
    async fn read(&self, endpoint: &str, query: Value) -> Result<Vec<Value>, BfabricError> {
        let mut state = self.state.lock().await;
        self.record_call(&mut state, "read", endpoint, &query);
        state.check("read", endpoint, &query)?;

        Ok(state
            .records
            .get(endpoint)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches_query(r, &query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn save(&self, endpoint: &str, object: Value) -> Result<Vec<Value>, BfabricError> {
        let mut state = self.state.lock().await;
        self.record_call(&mut state, "save", endpoint, &object);
        state.check("save", endpoint, &object)?;

        let Some(fields) = object.as_object() else {
            return Err(BfabricError::lims(endpoint, "save expects a JSON object"));
        };

        // Updates merge into the stored record with the same ID.
        if let Some(id) = fields.get("id") {
            let stored = state
                .records
                .get_mut(endpoint)
                .and_then(|records| records.iter_mut().find(|r| r.get("id") == Some(id)));
            if let Some(record) = stored {
                merge(record, fields);
                return Ok(vec![record.clone()]);
            }
        }

        let mut record = object.clone();
        if record.get("id").is_none() {
            let id = state.generate_id();
            merge(&mut record, &Map::from_iter([("id".to_string(), json!(id))]));
        }
        state
            .records
            .entry(endpoint.to_string())
            .or_default()
            .push(record.clone());
        Ok(vec![record])
    }

    async fn upload_resource(
        &self,
        name: &str,
        content: &[u8],
        workunit_id: i64,
    ) -> Result<Vec<Value>, BfabricError> {
        let payload = json!({"name": name, "workunitid": workunit_id});
        let mut state = self.state.lock().await;
        self.record_call(&mut state, "upload", "resource", &payload);
        state.check("upload", "resource", &payload)?;

        let id = state.generate_id();
        let record = json!({"id": id, "name": name, "workunitid": workunit_id});
        state.uploads.push(MockUpload {
            name: name.to_string(),
            content: content.to_vec(),
            workunit_id,
        });
        state
            .records
            .entry("resource".to_string())
            .or_default()
            .push(record.clone());
        Ok(vec![record])
    }
}

impl LimsConnector for MockLims {
    fn connect(&self, session: &SessionContext) -> Result<Arc<dyn LimsClient>, BfabricError> {
        Ok(Arc::new(self.as_principal(format!("user:{}", session.user))))
    }

    fn power_user(&self, environment: Environment) -> Result<Arc<dyn LimsClient>, BfabricError> {
        // try_lock: connector methods are synchronous and never hold the lock across calls.
        let unavailable = self
            .state
            .try_lock()
            .map(|s| s.power_user_unavailable)
            .unwrap_or(false);
        if unavailable {
            return Err(BfabricError::Config(format!(
                "no power-user credentials configured for the {environment} environment"
            )));
        }
        Ok(Arc::new(self.as_principal(format!("power_user:{environment}"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_filters_by_query_fields() {
        let lims = MockLims::new();
        lims.insert("sample", json!({"id": 1, "runid": 5, "container": {"id": 101}})).await;
        lims.insert("sample", json!({"id": 2, "runid": 6, "container": {"id": 102}})).await;

        let found = lims.read("sample", json!({"runid": 5})).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["id"], 1);
    }

    #[tokio::test]
    async fn save_creates_then_updates() {
        let lims = MockLims::new();
        let created = lims.save("workunit", json!({"name": "wu"})).await.unwrap();
        let id = created[0]["id"].clone();
        assert_eq!(id, json!(FIRST_GENERATED_ID));

        let updated = lims
            .save("workunit", json!({"id": id, "status": "available"}))
            .await
            .unwrap();
        assert_eq!(updated[0]["name"], "wu");
        assert_eq!(updated[0]["status"], "available");
        assert_eq!(lims.records("workunit").await.len(), 1);
    }

    #[tokio::test]
    async fn scripted_failures_apply_to_matching_payloads() {
        let lims = MockLims::new();
        lims.fail_save_when("workunit", "containerid", json!(102)).await;

        assert!(lims.save("workunit", json!({"containerid": 101})).await.is_ok());
        assert!(lims.save("workunit", json!({"containerid": 102})).await.is_err());
        assert_eq!(lims.calls_to("save", "workunit").await.len(), 2);
    }

    #[tokio::test]
    async fn connector_tags_principals() {
        let lims = MockLims::new();
        let power = lims.power_user(Environment::Test).unwrap();
        power.read("job", json!({"id": 1})).await.unwrap();

        let calls = lims.calls().await;
        assert_eq!(calls[0].principal, "power_user:Test");
    }

    #[tokio::test]
    async fn disabled_power_user_errors() {
        let lims = MockLims::new();
        lims.disable_power_user().await;
        assert!(lims.power_user(Environment::Production).is_err());
    }
}
