mod common;

use common::*;
use robosats_nostr::announce::format_announcement;
use robosats_nostr::ledger::{Ledger, MemoryLedger};
use robosats_nostr::{LedgerPolicy, OrderOutcome, SyncEngine, SyncError};
use std::sync::Arc;
use tokio::sync::Notify;

fn engine(
    source: Arc<ScriptedSource>,
    ledger: Arc<dyn Ledger>,
    publisher: Arc<dyn robosats_nostr::nostr::Publisher>,
) -> SyncEngine {
    SyncEngine::new(source, ledger, publisher, REFERRAL)
}

#[tokio::test]
async fn new_orders_are_announced_exactly_once() {
    let source = Arc::new(ScriptedSource::new([Step::Book(vec![10, 11]), Step::Book(vec![10, 11])]));
    let ledger = Arc::new(MemoryLedger::new());
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine(source.clone(), ledger.clone(), publisher.clone());

    let first = engine.run_cycle().await.unwrap();
    assert_eq!(first.announced(), vec![10, 11]);

    let second = engine.run_cycle().await.unwrap();
    assert!(second.announced().is_empty());
    assert_eq!(second.already_seen(), 2);

    assert_eq!(publisher.sent().len(), 2);
    assert_eq!(ledger.ids(), vec![10, 11]);
}

#[tokio::test]
async fn only_unseen_orders_are_announced_in_source_order() {
    let source = Arc::new(ScriptedSource::new([Step::Book(vec![2, 3, 4, 5])]));
    let ledger = Arc::new(MemoryLedger::with_seen([1, 2, 3]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine(source, ledger.clone(), publisher.clone());

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.fetched, 4);
    assert_eq!(report.announced(), vec![4, 5]);
    assert_eq!(report.already_seen(), 2);
    assert_eq!(ledger.ids(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        publisher.sent(),
        vec![
            format_announcement(&order(4), REFERRAL),
            format_announcement(&order(5), REFERRAL),
        ]
    );
}

#[tokio::test]
async fn repeated_id_within_one_book_is_announced_once() {
    let source = Arc::new(ScriptedSource::new([Step::Book(vec![7, 7])]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine(source, Arc::new(MemoryLedger::new()), publisher.clone());

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.announced(), vec![7]);
    assert_eq!(report.already_seen(), 1);
    assert_eq!(publisher.sent().len(), 1);
}

#[tokio::test]
async fn fetch_failure_leaves_ledger_untouched() {
    let source = Arc::new(ScriptedSource::new([Step::Fail]));
    let ledger = Arc::new(MemoryLedger::with_seen([1]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine(source, ledger.clone(), publisher.clone());

    let err = engine.run_cycle().await.unwrap_err();

    assert!(matches!(err, SyncError::Fetch(_)));
    assert!(!err.is_fatal());
    assert_eq!(ledger.ids(), vec![1]);
    assert!(publisher.sent().is_empty());
}

#[tokio::test]
async fn publish_failure_keeps_order_recorded_and_is_not_retried() {
    let source = Arc::new(ScriptedSource::new([Step::Book(vec![42]), Step::Book(vec![42])]));
    let ledger = Arc::new(MemoryLedger::new());
    let publisher = Arc::new(FailingPublisher::default());
    let engine = engine(source, ledger.clone(), publisher.clone());

    let first = engine.run_cycle().await.unwrap();
    assert_eq!(first.recorded(), vec![42]);
    assert_eq!(first.failed(), vec![42]);
    assert!(matches!(
        first.orders[0].outcome,
        OrderOutcome::AnnounceFailed(ref reason) if reason.contains("all relays down")
    ));
    assert_eq!(ledger.ids(), vec![42]);

    let second = engine.run_cycle().await.unwrap();
    assert_eq!(second.already_seen(), 1);
    assert_eq!(publisher.attempts(), 1);
}

#[tokio::test]
async fn ledger_error_aborts_cycle_by_default() {
    let source = Arc::new(ScriptedSource::new([Step::Book(vec![1, 2, 3])]));
    let ledger = Arc::new(FlakyLedger::new([2]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine(source, ledger.clone(), publisher.clone());
    assert_eq!(engine.policy(), LedgerPolicy::Abort);

    let err = engine.run_cycle().await.unwrap_err();

    assert!(err.is_fatal());
    match err {
        SyncError::Ledger {
            order_id, partial, ..
        } => {
            assert_eq!(order_id, 2);
            assert_eq!(partial.announced(), vec![1]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ledger.inner.ids(), vec![1]);
    assert_eq!(publisher.sent().len(), 1);
}

#[tokio::test]
async fn ledger_error_isolated_to_one_order() {
    let source = Arc::new(ScriptedSource::new([Step::Book(vec![1, 2, 3])]));
    let ledger = Arc::new(FlakyLedger::new([2]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine(source, ledger.clone(), publisher.clone()).with_policy(LedgerPolicy::Isolate);

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.announced(), vec![1, 3]);
    assert_eq!(report.failed(), vec![2]);
    assert!(matches!(report.orders[1].outcome, OrderOutcome::Failed(_)));
    assert_eq!(ledger.inner.ids(), vec![1, 3]);
}

#[tokio::test]
async fn insert_failure_aborts_before_announcing() {
    let source = Arc::new(ScriptedSource::new([Step::Book(vec![1, 2])]));
    let ledger = Arc::new(FlakyLedger::default().failing_inserts([1]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine(source, ledger.clone(), publisher.clone());

    let err = engine.run_cycle().await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Ledger { order_id: 1, ref partial, .. } if partial.orders.is_empty()
    ));
    assert!(publisher.sent().is_empty());
    assert!(ledger.inner.is_empty());
}

#[tokio::test]
async fn insert_failure_isolated_leaves_order_unrecorded() {
    let source = Arc::new(ScriptedSource::new([Step::Book(vec![1, 2])]));
    let ledger = Arc::new(FlakyLedger::default().failing_inserts([1]));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = engine(source, ledger.clone(), publisher.clone()).with_policy(LedgerPolicy::Isolate);

    let report = engine.run_cycle().await.unwrap();

    assert!(matches!(
        report.orders[0].outcome,
        OrderOutcome::Failed(ref reason) if reason.contains("write rejected")
    ));
    assert_eq!(report.announced(), vec![2]);
    assert_eq!(ledger.inner.ids(), vec![2]);
    assert_eq!(
        publisher.sent(),
        vec![format_announcement(&order(2), REFERRAL)]
    );
}

#[tokio::test]
async fn overlapping_cycle_is_refused() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(ScriptedSource::gated([Step::Book(vec![1])], gate.clone()));
    let publisher = Arc::new(RecordingPublisher::default());
    let engine = Arc::new(engine(source, Arc::new(MemoryLedger::new()), publisher.clone()));

    let running = tokio::spawn({
        let engine = engine.clone();
        async move { engine.run_cycle().await }
    });
    // Let the spawned cycle take the lock and park on the gate.
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert!(matches!(
        engine.run_cycle().await,
        Err(SyncError::CycleInProgress)
    ));

    gate.notify_one();
    let report = running.await.unwrap().unwrap();
    assert_eq!(report.announced(), vec![1]);
    assert_eq!(publisher.sent().len(), 1);
}
