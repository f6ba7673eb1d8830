mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{init_logging, FakeHost, FakeLookup, RecordingSink, ARCHIVED};
use pretty_assertions::assert_eq;
use rescue_core::{FailureCause, FailureEvent, SearchState, StatusUpdate};
use rescue_engine::{LookupError, LookupFailureKind, RecoveryWorkflow, WorkflowOutcome, WorkflowTimings};

const ORIGINAL: &str = "http://example.com/missing";

fn event() -> FailureEvent {
    FailureEvent {
        url: ORIGINAL.to_string(),
        tab_id: 4,
        cause: FailureCause::HttpStatus(404),
    }
}

fn workflow(lookup: FakeLookup, host: Arc<FakeHost>) -> (RecoveryWorkflow, Arc<FakeLookup>) {
    let lookup = Arc::new(lookup);
    let workflow = RecoveryWorkflow::new(lookup.clone(), host, WorkflowTimings::immediate());
    (workflow, lookup)
}

#[tokio::test]
async fn redirects_to_snapshot_of_matching_variant() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (workflow, lookup) = workflow(
        FakeLookup::new().with_snapshot("https://www.example.com/missing", ARCHIVED),
        host.clone(),
    );
    let sink = RecordingSink::new();

    let outcome = workflow.run(&event(), &sink).await;

    assert_eq!(
        outcome,
        WorkflowOutcome::Redirected {
            variant: "https://www.example.com/missing".to_string(),
            archived_url: ARCHIVED.to_string(),
        }
    );
    let mut calls = lookup.calls();
    calls.sort();
    assert_eq!(
        calls,
        vec![
            "http://example.com/missing",
            "http://www.example.com/missing",
            "https://example.com/missing",
            "https://www.example.com/missing",
        ]
    );
    assert_eq!(
        sink.take(),
        vec![
            StatusUpdate::new(ORIGINAL, SearchState::Searching),
            StatusUpdate::new(ORIGINAL, SearchState::CheckingVariants { count: 4 }),
            StatusUpdate::new(
                ORIGINAL,
                SearchState::Found {
                    variant: "https://www.example.com/missing".to_string(),
                    archived_url: ARCHIVED.to_string(),
                }
            ),
        ]
    );
    assert_eq!(host.navigations(), vec![(4, ARCHIVED.to_string())]);
}

#[tokio::test]
async fn earliest_variant_wins_even_when_it_answers_last() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (workflow, _lookup) = workflow(
        FakeLookup::new()
            .with_snapshot("http://www.example.com/missing", "https://web.archive.org/web/2/www")
            .with_delay("http://www.example.com/missing", Duration::from_millis(80))
            .with_snapshot("https://example.com/missing", "https://web.archive.org/web/3/https"),
        host.clone(),
    );

    let outcome = workflow.run(&event(), &RecordingSink::new()).await;

    assert_eq!(
        outcome,
        WorkflowOutcome::Redirected {
            variant: "http://www.example.com/missing".to_string(),
            archived_url: "https://web.archive.org/web/2/www".to_string(),
        }
    );
    assert_eq!(
        host.navigations(),
        vec![(4, "https://web.archive.org/web/2/www".to_string())]
    );
}

#[tokio::test]
async fn all_lookups_missing_ends_not_found_without_redirect() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (workflow, lookup) = workflow(FakeLookup::new(), host.clone());
    let sink = RecordingSink::new();

    let outcome = workflow.run(&event(), &sink).await;

    assert_eq!(outcome, WorkflowOutcome::NotFound);
    assert_eq!(lookup.calls().len(), 4);
    assert!(host.navigations().is_empty());
    assert_eq!(
        sink.take().last(),
        Some(&StatusUpdate::new(ORIGINAL, SearchState::NotFound))
    );
}

#[tokio::test]
async fn failed_lookups_do_not_abort_the_others() {
    init_logging();
    let timeout = LookupError {
        kind: LookupFailureKind::Timeout,
        message: "timed out".to_string(),
    };
    let host = Arc::new(FakeHost::new());
    let (workflow, _lookup) = workflow(
        FakeLookup::new()
            .with_error(ORIGINAL, timeout.clone())
            .with_error("http://www.example.com/missing", timeout)
            .with_snapshot("https://www.example.com/missing", ARCHIVED),
        host.clone(),
    );

    let outcome = workflow.run(&event(), &RecordingSink::new()).await;

    assert!(matches!(outcome, WorkflowOutcome::Redirected { .. }));
    assert_eq!(host.navigations(), vec![(4, ARCHIVED.to_string())]);
}

#[tokio::test]
async fn lookups_are_issued_concurrently() {
    init_logging();
    // Each lookup blocks until all four are in flight, so a sequential
    // implementation would never finish.
    let host = Arc::new(FakeHost::new());
    let (workflow, _lookup) = workflow(FakeLookup::new().with_barrier(4), host);

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        workflow.run(&event(), &RecordingSink::new()),
    )
    .await
    .expect("lookups ran concurrently");
    assert_eq!(outcome, WorkflowOutcome::NotFound);
}

#[tokio::test]
async fn status_delivery_failure_becomes_error_outcome() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (workflow, lookup) = workflow(
        FakeLookup::new().with_snapshot(ORIGINAL, ARCHIVED),
        host.clone(),
    );

    let outcome = workflow.run(&event(), &RecordingSink::failing()).await;

    assert_eq!(
        outcome,
        WorkflowOutcome::Failed {
            message: "could not update status page: status channel disconnected".to_string()
        }
    );
    assert!(lookup.calls().is_empty());
    assert!(host.navigations().is_empty());
}

#[tokio::test]
async fn redirect_failure_is_reported() {
    init_logging();
    let host = Arc::new(FakeHost {
        fail_navigation: true,
        ..FakeHost::default()
    });
    let (workflow, _lookup) = workflow(
        FakeLookup::new().with_snapshot(ORIGINAL, ARCHIVED),
        host,
    );

    let outcome = workflow.run(&event(), &RecordingSink::new()).await;

    assert_eq!(
        outcome,
        WorkflowOutcome::Failed {
            message: "redirect failed: tab 4 no longer exists".to_string()
        }
    );
}

#[tokio::test]
async fn root_url_checks_six_variants() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (workflow, lookup) = workflow(
        FakeLookup::new().with_snapshot("https://example.com/home", ARCHIVED),
        host,
    );
    let sink = RecordingSink::new();
    let root = FailureEvent {
        url: "https://example.com/".to_string(),
        ..event()
    };

    let outcome = workflow.run(&root, &sink).await;

    assert_eq!(lookup.calls().len(), 6);
    assert_eq!(
        sink.take()[1].state,
        SearchState::CheckingVariants { count: 6 }
    );
    assert_eq!(
        outcome,
        WorkflowOutcome::Redirected {
            variant: "https://example.com/home".to_string(),
            archived_url: ARCHIVED.to_string(),
        }
    );
}

#[tokio::test]
async fn redirect_waits_for_the_found_delay() {
    init_logging();
    let found_delay = Duration::from_millis(300);
    let host = Arc::new(FakeHost::new());
    let workflow = RecoveryWorkflow::new(
        Arc::new(FakeLookup::new().with_snapshot("https://www.example.com/missing", ARCHIVED)),
        host.clone(),
        WorkflowTimings {
            searching_delay: Duration::ZERO,
            found_delay,
        },
    );
    let sink = RecordingSink::new();
    let started = std::time::Instant::now();

    let during_delay = async {
        tokio::time::sleep(found_delay / 2).await;
        (host.navigations(), sink.take())
    };
    let event = event();
    let (outcome, (early_navigations, early_updates)) =
        tokio::join!(workflow.run(&event, &sink), during_delay);

    assert!(early_navigations.is_empty());
    assert!(matches!(
        early_updates.last().map(|update| &update.state),
        Some(SearchState::Found { .. })
    ));
    assert!(started.elapsed() >= found_delay);
    assert!(matches!(outcome, WorkflowOutcome::Redirected { .. }));
    assert_eq!(host.navigations(), vec![(4, ARCHIVED.to_string())]);
}
