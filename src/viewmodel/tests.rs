//! Unit tests for the polling view-model.

use super::*;
use crate::gateway::TransportErrorKind;
use async_trait::async_trait;
use chrono::DateTime;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Semaphore;

const LONG: Duration = Duration::from_secs(3600);

fn ts() -> DateTime<Utc> {
    "2024-05-01T12:00:00Z".parse().unwrap()
}

fn svc(url: &str, is_up: bool) -> MonitoredService {
    MonitoredService::new(url, is_up, ts())
}

fn urls(services: &[MonitoredService]) -> Vec<&str> {
    services.iter().map(|s| s.url.as_str()).collect()
}

/// In-memory backend with switchable failures and an optional gate that
/// holds list calls in flight.
struct FakeBackend {
    services: std::sync::Mutex<Vec<MonitoredService>>,
    list_failure: std::sync::Mutex<Option<GatewayError>>,
    add_failure: std::sync::Mutex<Option<GatewayError>>,
    gated: AtomicBool,
    gate: Semaphore,
    list_calls: AtomicUsize,
    add_calls: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            services: Default::default(),
            list_failure: Default::default(),
            add_failure: Default::default(),
            gated: Default::default(),
            gate: Semaphore::new(0),
            list_calls: Default::default(),
            add_calls: Default::default(),
        }
    }
}

impl FakeBackend {
    fn with_services(services: Vec<MonitoredService>) -> Arc<Self> {
        let backend = Self::default();
        *backend.services.lock().unwrap() = services;
        Arc::new(backend)
    }

    fn gated(services: Vec<MonitoredService>) -> Arc<Self> {
        let backend = Self::with_services(services);
        backend.gated.store(true, Ordering::SeqCst);
        backend
    }

    fn set_services(&self, services: Vec<MonitoredService>) {
        *self.services.lock().unwrap() = services;
    }

    fn fail_list(&self, err: Option<GatewayError>) {
        *self.list_failure.lock().unwrap() = err;
    }

    fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MonitorSource for FakeBackend {
    async fn list_services(&self) -> Result<Vec<MonitoredService>, GatewayError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.gated.load(Ordering::SeqCst) {
            self.gate.acquire().await.unwrap().forget();
        }
        if let Some(err) = self.list_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.services.lock().unwrap().clone())
    }

    async fn add_service(&self, url: &str) -> Result<AddConfirmation, GatewayError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.add_failure.lock().unwrap().clone() {
            return Err(err);
        }
        self.services.lock().unwrap().push(svc(url, true));
        Ok(AddConfirmation {
            status: 201,
            body: serde_json::json!({"message": "Monitor added"}),
        })
    }
}

async fn wait_for_state(vm: &PollingViewModel, mut predicate: impl FnMut(&ViewState) -> bool) {
    let mut rx = vm.subscribe();
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        rx.wait_for(|state| predicate(state)).await.map(|_| ())
    })
    .await;
    assert!(matches!(waited, Ok(Ok(()))), "timed out waiting for state");
}

async fn wait_for_calls(backend: &FakeBackend, calls: usize) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while backend.list_calls() < calls {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {} list calls", calls);
}

/// View-model whose initial tick has already been applied.
async fn settled(backend: &Arc<FakeBackend>) -> PollingViewModel {
    let vm = PollingViewModel::initialize(backend.clone(), LONG, None);
    wait_for_state(&vm, |s| s.generation == 1).await;
    vm
}

// ============================================================================
// ViewState derived views
// ============================================================================

fn state_with(services: Vec<MonitoredService>, search: &str) -> ViewState {
    let mut state = ViewState::seeded(Some(services));
    state.search_term = search.to_string();
    state
}

#[test]
fn test_seeded_state_defaults() {
    let empty = ViewState::seeded(None);
    assert!(empty.is_loading);
    assert!(empty.services.is_empty());
    assert_eq!(empty.generation, 0);

    let seeded = ViewState::seeded(Some(vec![svc("a.com", true)]));
    assert!(!seeded.is_loading);
    assert_eq!(seeded.services.len(), 1);
}

#[test]
fn test_all_up_requires_non_empty() {
    assert!(!state_with(vec![], "").all_up());
    assert!(state_with(vec![svc("a.com", true)], "").all_up());
    assert!(!state_with(vec![svc("a.com", true), svc("b.com", false)], "").all_up());
}

#[test]
fn test_overall_status() {
    assert_eq!(state_with(vec![], "").overall(), OverallStatus::Unknown);
    assert_eq!(
        state_with(vec![svc("a.com", true)], "").overall(),
        OverallStatus::AllUp
    );
    assert_eq!(
        state_with(vec![svc("a.com", true), svc("b.com", false)], "").overall(),
        OverallStatus::Degraded
    );
}

#[test]
fn test_filter_scenario_mixed_snapshot() {
    let state = state_with(vec![svc("a.com", true), svc("b.com", false)], "b");
    assert!(!state.all_up());
    let filtered: Vec<_> = state.filtered_services().map(|s| s.url.as_str()).collect();
    assert_eq!(filtered, vec!["b.com"]);
}

#[test]
fn test_filter_empty_term_returns_all_in_order() {
    let state = state_with(vec![svc("z.com", true), svc("a.com", false), svc("m.com", true)], "");
    let filtered: Vec<_> = state.filtered_services().map(|s| s.url.as_str()).collect();
    assert_eq!(filtered, vec!["z.com", "a.com", "m.com"]);
}

#[test]
fn test_filter_is_case_insensitive() {
    let state = state_with(vec![svc("https://API.example.com", true), svc("b.com", true)], "api");
    assert_eq!(state.filtered_services().count(), 1);

    let state = state_with(vec![svc("https://api.example.com", true)], "EXAMPLE");
    assert_eq!(state.filtered_services().count(), 1);
}

#[test]
fn test_filter_iterator_is_restartable() {
    let state = state_with(vec![svc("a.com", true), svc("ab.com", true), svc("c.com", true)], "a");
    let iter = state.filtered_services();
    let first: Vec<_> = iter.clone().collect();
    let second: Vec<_> = iter.collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_counts() {
    let state = state_with(vec![svc("a", true), svc("b", false), svc("c", true)], "");
    assert_eq!(
        state.counts(),
        ServiceCounts {
            total: 3,
            up: 2,
            down: 1
        }
    );
}

#[test]
fn test_poll_failure_messages_hide_transport_detail() {
    let err = GatewayError::transport(TransportErrorKind::Unreachable, "connect ECONNREFUSED 10.0.0.5");
    let failure = PollFailure::from_error(&err, ts(), 1);
    assert_eq!(failure.message, "Backend is unreachable");
    assert!(!failure.message.contains("10.0.0.5"));

    let err = GatewayError::Upstream {
        status: 503,
        body: serde_json::json!({"error": "maintenance"}),
    };
    let failure = PollFailure::from_error(&err, ts(), 2);
    assert_eq!(failure.message, "maintenance");
    assert_eq!(failure.kind, FailureKind::Upstream { status: 503 });

    let err = GatewayError::Upstream {
        status: 500,
        body: serde_json::Value::Null,
    };
    assert_eq!(
        PollFailure::from_error(&err, ts(), 1).message,
        "Backend returned HTTP 500"
    );
}

// ============================================================================
// Initialization
// ============================================================================

#[tokio::test]
async fn test_initialize_does_not_block_on_first_fetch() {
    let backend = FakeBackend::gated(vec![svc("a.com", true)]);
    let vm = PollingViewModel::initialize(backend.clone(), LONG, None);

    let state = vm.snapshot();
    assert!(state.is_loading);
    assert!(state.services.is_empty());

    backend.release(1);
    wait_for_state(&vm, |s| s.generation == 1).await;
    vm.dispose().await;
}

#[tokio::test]
async fn test_initialize_publishes_seed_immediately() {
    let backend = FakeBackend::gated(vec![]);
    let seed = vec![svc("seed.com", true)];
    let vm = PollingViewModel::initialize(backend.clone(), LONG, Some(seed.clone()));

    let state = vm.snapshot();
    assert_eq!(*state.services, seed);
    assert!(!state.is_loading);

    vm.dispose().await;
}

#[tokio::test]
async fn test_first_tick_fires_immediately() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true), svc("b.com", false)]);
    let vm = settled(&backend).await;

    let state = vm.snapshot();
    assert_eq!(urls(&state.services), vec!["a.com", "b.com"]);
    assert!(!state.is_loading);
    assert!(!state.is_refreshing);
    assert!(state.last_success_at.is_some());
    assert_eq!(backend.list_calls(), 1);

    vm.dispose().await;
}

#[tokio::test]
async fn test_zero_interval_is_clamped() {
    let backend = FakeBackend::with_services(vec![]);
    let vm = PollingViewModel::initialize(backend.clone(), Duration::ZERO, None);
    assert_eq!(vm.interval(), MIN_POLL_INTERVAL);
    vm.dispose().await;
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_each_snapshot_replaces_the_previous_one() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true)]);
    let vm = settled(&backend).await;

    let snapshots = vec![
        vec![svc("b.com", true), svc("c.com", false)],
        vec![],
        vec![svc("c.com", true), svc("a.com", true), svc("d.com", false)],
    ];

    for (i, snapshot) in snapshots.into_iter().enumerate() {
        backend.set_services(snapshot.clone());
        let outcome = vm.poll_tick().await;
        assert_eq!(
            outcome,
            TickOutcome::Applied {
                services: snapshot.len()
            }
        );
        let state = vm.snapshot();
        assert_eq!(*state.services, snapshot);
        assert_eq!(state.generation, i as u64 + 2);
    }

    vm.dispose().await;
}

#[tokio::test]
async fn test_http_500_keeps_services_and_sets_failure() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true)]);
    let vm = settled(&backend).await;
    let before = vm.snapshot();

    backend.fail_list(Some(GatewayError::Upstream {
        status: 500,
        body: serde_json::json!({"error": "boom"}),
    }));
    let outcome = vm.poll_tick().await;

    assert_eq!(outcome, TickOutcome::Failed(FailureKind::Upstream { status: 500 }));
    let after = vm.snapshot();
    assert_eq!(after.services, before.services);
    assert_eq!(after.generation, before.generation);
    assert!(after.has_failure());
    assert!(!after.is_refreshing);

    vm.dispose().await;
}

#[tokio::test]
async fn test_malformed_payload_keeps_services() {
    let backend = FakeBackend::with_services(vec![svc("a.com", false)]);
    let vm = settled(&backend).await;

    backend.fail_list(Some(
        crate::monitor::SnapshotError::NotAnArray("an object").into(),
    ));
    let outcome = vm.poll_tick().await;

    assert_eq!(
        outcome,
        TickOutcome::Failed(FailureKind::Transport(TransportErrorKind::MalformedPayload))
    );
    assert_eq!(urls(&vm.snapshot().services), vec!["a.com"]);

    vm.dispose().await;
}

#[tokio::test]
async fn test_failure_flag_counts_and_clears() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true)]);
    let vm = settled(&backend).await;

    backend.fail_list(Some(GatewayError::transport(
        TransportErrorKind::Timeout,
        "no response within 5000ms",
    )));
    vm.poll_tick().await;
    vm.poll_tick().await;
    let failure = vm.snapshot().last_failure.unwrap();
    assert_eq!(failure.consecutive, 2);
    assert_eq!(
        failure.kind,
        FailureKind::Transport(TransportErrorKind::Timeout)
    );

    backend.fail_list(None);
    assert!(matches!(vm.poll_tick().await, TickOutcome::Applied { .. }));
    assert!(!vm.snapshot().has_failure());

    vm.dispose().await;
}

#[tokio::test]
async fn test_first_tick_failure_clears_loading() {
    let backend = FakeBackend::with_services(vec![]);
    backend.fail_list(Some(GatewayError::transport(
        TransportErrorKind::Unreachable,
        "refused",
    )));
    let vm = PollingViewModel::initialize(backend.clone(), LONG, None);

    wait_for_state(&vm, |s| s.has_failure()).await;
    let state = vm.snapshot();
    assert!(!state.is_loading);
    assert!(state.services.is_empty());
    assert_eq!(state.overall(), OverallStatus::Unknown);

    vm.dispose().await;
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_set_search_term_does_not_fetch() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true), svc("b.com", false)]);
    let vm = settled(&backend).await;

    vm.set_search_term("B");
    assert_eq!(vm.search_term(), "B");
    assert_eq!(backend.list_calls(), 1);
    assert_eq!(urls(&vm.filtered_services()), vec!["b.com"]);
    assert!(!vm.all_up());

    vm.set_search_term("");
    assert_eq!(vm.filtered_services().len(), 2);

    vm.dispose().await;
}

// ============================================================================
// Add
// ============================================================================

#[tokio::test]
async fn test_add_empty_url_makes_no_network_call() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true)]);
    let vm = settled(&backend).await;
    let before = vm.snapshot();

    for blank in ["", "   "] {
        let result = vm.add_service(blank).await;
        assert!(matches!(result, Err(GatewayError::Validation(ref m)) if m == "URL is required"));
    }

    assert_eq!(backend.add_calls(), 0);
    assert_eq!(backend.list_calls(), 1);
    assert_eq!(vm.snapshot(), before);

    vm.dispose().await;
}

#[tokio::test]
async fn test_add_triggers_one_extra_tick() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true)]);
    let vm = settled(&backend).await;

    let confirmation = vm.add_service("https://c.com").await.unwrap();

    assert_eq!(confirmation.status, 201);
    assert_eq!(backend.add_calls(), 1);
    assert_eq!(backend.list_calls(), 2);
    assert_eq!(urls(&vm.snapshot().services), vec!["a.com", "https://c.com"]);

    vm.dispose().await;
}

#[tokio::test]
async fn test_add_upstream_rejection_is_relayed_without_refresh() {
    let backend = FakeBackend::with_services(vec![]);
    *backend.add_failure.lock().unwrap() = Some(GatewayError::Upstream {
        status: 422,
        body: serde_json::json!({"error": "invalid URL format"}),
    });
    let vm = settled(&backend).await;

    let err = vm.add_service("not a url").await.unwrap_err();
    assert_eq!(err.upstream_message().as_deref(), Some("invalid URL format"));
    assert!(matches!(err, GatewayError::Upstream { status: 422, .. }));
    assert_eq!(backend.list_calls(), 1);

    vm.dispose().await;
}

// ============================================================================
// Overlap and teardown
// ============================================================================

#[tokio::test]
async fn test_tick_skipped_while_fetch_in_flight() {
    let backend = FakeBackend::gated(vec![svc("a.com", true)]);
    let vm = PollingViewModel::initialize(backend.clone(), LONG, None);
    wait_for_state(&vm, |s| s.is_refreshing).await;

    assert_eq!(vm.poll_tick().await, TickOutcome::Skipped);
    wait_for_calls(&backend, 1).await;
    assert_eq!(backend.list_calls(), 1);

    backend.release(1);
    wait_for_state(&vm, |s| s.generation == 1).await;
    vm.dispose().await;
}

#[tokio::test]
async fn test_refresh_waits_for_in_flight_fetch() {
    let backend = FakeBackend::gated(vec![svc("a.com", true)]);
    let vm = Arc::new(PollingViewModel::initialize(backend.clone(), LONG, None));
    wait_for_state(&vm, |s| s.is_refreshing).await;

    let refresher = {
        let vm = Arc::clone(&vm);
        tokio::spawn(async move { vm.refresh().await })
    };

    backend.release(2);
    let outcome = refresher.await.unwrap();

    assert_eq!(outcome, TickOutcome::Applied { services: 1 });
    assert_eq!(backend.list_calls(), 2);
    assert_eq!(vm.snapshot().generation, 2);

    vm.dispose().await;
}

#[tokio::test]
async fn test_dispose_while_in_flight_drops_late_response() {
    let backend = FakeBackend::gated(vec![svc("late.com", true)]);
    let vm = PollingViewModel::initialize(backend.clone(), LONG, None);
    wait_for_state(&vm, |s| s.is_refreshing).await;
    let before = vm.snapshot();

    vm.dispose().await;
    backend.release(1);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let after = vm.snapshot();
    assert_eq!(after, before);
    assert!(after.services.is_empty());
    assert_eq!(after.generation, 0);
    assert!(vm.is_disposed());
}

#[tokio::test]
async fn test_no_writes_after_dispose() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true)]);
    let vm = settled(&backend).await;
    vm.dispose().await;
    let before = vm.snapshot();

    backend.set_services(vec![svc("b.com", true)]);
    assert_eq!(vm.poll_tick().await, TickOutcome::Disposed);
    assert_eq!(vm.refresh().await, TickOutcome::Disposed);
    vm.set_search_term("ignored");

    assert_eq!(vm.snapshot(), before);
}

#[tokio::test]
async fn test_add_after_dispose_makes_no_call() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true)]);
    let vm = settled(&backend).await;
    vm.dispose().await;
    let before = vm.snapshot();

    let err = vm.add_service("https://c.com").await.unwrap_err();
    assert!(matches!(err, GatewayError::Disposed));
    assert_eq!(backend.add_calls(), 0);
    assert_eq!(vm.snapshot(), before);
}

#[tokio::test]
async fn test_dispose_stops_timer() {
    let backend = FakeBackend::with_services(vec![svc("a.com", true)]);
    let vm = PollingViewModel::initialize(backend.clone(), Duration::from_millis(20), None);
    wait_for_state(&vm, |s| s.generation >= 3).await;

    vm.dispose().await;
    let calls = backend.list_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.list_calls(), calls);
}

#[tokio::test]
async fn test_drop_cancels_polling() {
    let backend = FakeBackend::with_services(vec![]);
    let vm = PollingViewModel::initialize(backend.clone(), Duration::from_millis(20), None);
    wait_for_state(&vm, |s| s.generation >= 2).await;

    drop(vm);
    tokio::time::sleep(Duration::from_millis(50)).await;
    let calls = backend.list_calls();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(backend.list_calls(), calls);
}

#[tokio::test]
async fn test_dispose_is_idempotent() {
    let backend = FakeBackend::with_services(vec![]);
    let vm = settled(&backend).await;
    vm.dispose().await;
    vm.dispose().await;
    assert!(vm.is_disposed());
}
