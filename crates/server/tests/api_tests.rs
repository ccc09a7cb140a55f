use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDate};
use tower::ServiceExt;
use uuid::Uuid;

use docwatch_core::{Channel, Document, DocumentCandidate, Frequency, UserProfile};
use docwatch_provider::{Delivery, DynTransport, ProviderError, ReminderMessage, TransportRegistry};
use docwatch_scheduler::ReminderOrchestrator;
use docwatch_server::api::{AppState, router};
use docwatch_store::{DocumentRepository, DocumentWriter, StoreError};
use docwatch_store_memory::MemoryStore;

// -- Mock transport -------------------------------------------------------

struct MockTransport {
    channel: Channel,
    healthy: bool,
    sent: Mutex<Vec<String>>,
}

impl MockTransport {
    fn new(channel: Channel) -> Arc<Self> {
        Arc::new(Self {
            channel,
            healthy: true,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn unhealthy(channel: Channel) -> Arc<Self> {
        Arc::new(Self {
            channel,
            healthy: false,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DynTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, destination: &str, _: &ReminderMessage) -> Result<Delivery, ProviderError> {
        self.sent.lock().unwrap().push(destination.to_owned());
        Ok(Delivery::with_id("mock-1"))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ProviderError::Connection("connection refused".into()))
        }
    }
}

struct BrokenDocuments;

#[async_trait]
impl DocumentRepository for BrokenDocuments {
    async fn list_active_candidates(&self) -> Result<Vec<DocumentCandidate>, StoreError> {
        Err(StoreError::Connection("database is down".into()))
    }

    async fn find_candidate(&self, _: Uuid, _: Uuid) -> Result<Option<DocumentCandidate>, StoreError> {
        Err(StoreError::Connection("database is down".into()))
    }
}

// -- Helpers --------------------------------------------------------------

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

fn build_state(store: &Arc<MemoryStore>, transports: Vec<Arc<MockTransport>>) -> AppState {
    let mut registry = TransportRegistry::new();
    for transport in transports {
        registry.register(transport);
    }
    let orchestrator = ReminderOrchestrator::builder()
        .store(Arc::clone(store))
        .transports(registry)
        .build()
        .expect("orchestrator should build");
    AppState {
        orchestrator: Arc::new(orchestrator),
    }
}

async fn seed_document(store: &MemoryStore, expires_in: i64) -> Document {
    let user_id = Uuid::new_v4();
    store.upsert_owner(user_id, "owner@example.com").await.unwrap();
    let profile = UserProfile::new(user_id)
        .with_channel(Channel::Email)
        .with_frequency(Frequency::SevenDays);
    store.upsert_profile(&profile).await.unwrap();
    let doc = Document::new(user_id, "Trade Licence", today() + Duration::days(expires_in));
    store.save_document(&doc).await.unwrap();
    doc
}

async fn send(state: AppState, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router(state)
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

// -- Tests ----------------------------------------------------------------

#[tokio::test]
async fn health_reports_ok_with_metrics() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(&store, vec![MockTransport::new(Channel::Email)]);

    let (status, body) = send(state, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["metrics"]["passes"], 0);
    assert_eq!(body["transports"][0]["channel"], "email");
    assert_eq!(body["transports"][0]["healthy"], true);
}

#[tokio::test]
async fn health_is_degraded_when_a_transport_fails() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(
        &store,
        vec![
            MockTransport::new(Channel::Email),
            MockTransport::unhealthy(Channel::Sms),
        ],
    );

    let (status, body) = send(state, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["transports"][1]["healthy"], false);
    assert!(
        body["transports"][1]["error"]
            .as_str()
            .unwrap()
            .contains("connection refused")
    );
}

#[tokio::test]
async fn run_pass_sends_once_per_day() {
    let store = Arc::new(MemoryStore::new());
    let email = MockTransport::new(Channel::Email);
    let state = build_state(&store, vec![email.clone()]);
    seed_document(&store, 7).await;
    seed_document(&store, 10).await;

    let (status, body) = send(state.clone(), "POST", "/v1/reminders/run?date=2026-10-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2026-10-15");
    assert_eq!(body["candidates"], 2);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["not_due"], 1);
    assert!(body.get("aborted").is_none());

    let (_, body) = send(state.clone(), "POST", "/v1/reminders/run?date=2026-10-15").await;
    assert_eq!(body["sent"], 0);
    assert_eq!(body["already_sent"], 1);

    assert_eq!(email.sent(), vec!["owner@example.com"]);
    let (_, health) = send(state, "GET", "/health").await;
    assert_eq!(health["metrics"]["passes"], 2);
    assert_eq!(health["metrics"]["sent"], 1);
}

#[tokio::test]
async fn run_pass_without_date_uses_today() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(&store, vec![]);

    let (status, body) = send(state, "POST", "/v1/reminders/run").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["date"].is_string());
    assert_eq!(body["candidates"], 0);
}

#[tokio::test]
async fn run_pass_with_bad_date_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(&store, vec![]);

    let (status, _) = send(state, "POST", "/v1/reminders/run?date=tomorrow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn aborted_pass_returns_service_unavailable() {
    let store = Arc::new(MemoryStore::new());
    let orchestrator = ReminderOrchestrator::builder()
        .documents(Arc::new(BrokenDocuments))
        .reminders(store.clone())
        .activity(store)
        .build()
        .unwrap();
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };

    let (status, body) = send(state, "POST", "/v1/reminders/run?date=2026-10-15").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["aborted"].as_str().unwrap().contains("database is down"));
}

#[tokio::test]
async fn test_reminder_bypasses_schedule() {
    let store = Arc::new(MemoryStore::new());
    let email = MockTransport::new(Channel::Email);
    let state = build_state(&store, vec![email.clone()]);
    let doc = seed_document(&store, 200).await;

    let uri = format!("/v1/users/{}/documents/{}/test-reminder", doc.user_id, doc.id);
    let (status, body) = send(state, "POST", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], true);
    assert_eq!(email.sent().len(), 1);
}

#[tokio::test]
async fn test_reminder_for_someone_elses_document_is_not_delivered() {
    let store = Arc::new(MemoryStore::new());
    let email = MockTransport::new(Channel::Email);
    let state = build_state(&store, vec![email.clone()]);
    let doc = seed_document(&store, 7).await;

    let uri = format!("/v1/users/{}/documents/{}/test-reminder", Uuid::new_v4(), doc.id);
    let (status, body) = send(state, "POST", &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], false);
    assert!(email.sent().is_empty());
}

#[tokio::test]
async fn test_reminder_with_malformed_id_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let state = build_state(&store, vec![]);

    let (status, _) = send(
        state,
        "POST",
        "/v1/users/not-a-uuid/documents/also-not/test-reminder",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
