mod common;

use chrono::Duration;
use common::{acme_with_invoice, date};
use tally_core::{
    storage::BookStorage, FollowupService, JobRunner, MemoryNotifier, RunOptions,
    StatutoryService,
};
use tally_domain::{
    AuditLevel, Cycle, DeliveryState, Followup, FollowupChannel, FollowupOutcome, FollowupState,
    LifecyclePolicy, NotificationKind, OverdueStage, Statutory,
};
use tally_storage_json::{JsonBookStorage, StoragePaths};
use tempfile::tempdir;

fn storage(root: &std::path::Path) -> JsonBookStorage {
    JsonBookStorage::new(StoragePaths {
        data_root: root.join("data"),
        backup_root: root.join("backups"),
    })
    .expect("storage")
}

#[test]
fn daily_runs_walk_the_overdue_ladder_once() {
    let dir = tempdir().expect("tempdir");
    let storage = storage(dir.path());
    storage.save_book(&acme_with_invoice()).unwrap();
    let notifier = MemoryNotifier::new();
    let runner = JobRunner::new(&storage, &notifier, LifecyclePolicy::default(), 3);

    let mut changes = Vec::new();
    let mut today = date(2025, 1, 30);
    while today <= date(2025, 2, 20) {
        let report = runner.run(&RunOptions::new(today)).unwrap();
        if report.transition_count() > 0 {
            changes.push(today);
        }
        today += Duration::days(1);
    }

    assert_eq!(changes, vec![date(2025, 2, 1), date(2025, 2, 7), date(2025, 2, 14)]);
    let book = storage.load_book("acme").unwrap();
    assert_eq!(book.documents[0].overdue_stage, OverdueStage::TerminationWarning);
    let kinds: Vec<_> = notifier.delivered().iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::LateFeeApplied,
            NotificationKind::PaymentReminder,
            NotificationKind::TerminationWarning,
        ]
    );
    assert!(book.outbox.iter().all(|n| n.state == DeliveryState::Delivered));
}

#[test]
fn recurring_bills_and_promises_flow_through_the_runner() {
    let dir = tempdir().expect("tempdir");
    let storage = storage(dir.path());
    let mut book = acme_with_invoice();
    let doc_id = book.documents[0].id;
    StatutoryService::add(
        &mut book,
        Statutory::new("Office rent", "Landlord", 900.0, Cycle::Monthly, date(2025, 2, 5)),
    )
    .unwrap();
    let promise = FollowupService::log(
        &mut book,
        Followup::new(doc_id, date(2025, 2, 2), FollowupChannel::Call, FollowupOutcome::PromiseToPay)
            .with_promise(date(2025, 2, 4)),
    )
    .unwrap();
    storage.save_book(&book).unwrap();

    let notifier = MemoryNotifier::new();
    let runner = JobRunner::new(&storage, &notifier, LifecyclePolicy::default(), 3);
    for day in [date(2025, 2, 2), date(2025, 2, 5), date(2025, 2, 6)] {
        runner.run(&RunOptions::new(day)).unwrap();
    }

    let book = storage.load_book("acme").unwrap();
    assert_eq!(book.bills.len(), 1);
    assert_eq!(book.statutories[0].next_due_date, date(2025, 3, 5));
    let followup = book.followups.iter().find(|f| f.id == promise).unwrap();
    assert_eq!(followup.state, FollowupState::Broken);

    let kinds: Vec<_> = notifier.delivered().iter().map(|n| n.kind).collect();
    assert!(kinds.contains(&NotificationKind::BillGenerated));
    assert!(kinds.contains(&NotificationKind::BillOverdue));
    assert!(kinds.contains(&NotificationKind::PromiseBroken));
}

#[test]
fn failed_deliveries_are_retried_on_later_runs_then_given_up() {
    let dir = tempdir().expect("tempdir");
    let storage = storage(dir.path());
    storage.save_book(&acme_with_invoice()).unwrap();
    let notifier = MemoryNotifier::new();
    notifier.fail_with(Some("smtp relay unreachable"));
    let runner = JobRunner::new(&storage, &notifier, LifecyclePolicy::default(), 2);

    let first = runner.run(&RunOptions::new(date(2025, 2, 1))).unwrap();
    assert_eq!(first.tenants[0].failed_deliveries, 0);
    // the stage change is persisted even though delivery failed
    let book = storage.load_book("acme").unwrap();
    assert_eq!(book.documents[0].overdue_stage, OverdueStage::LateFeeApplied);
    assert_eq!(book.outbox[0].attempts, 1);

    let second = runner.run(&RunOptions::new(date(2025, 2, 2))).unwrap();
    assert_eq!(second.tenants[0].failed_deliveries, 1);
    let book = storage.load_book("acme").unwrap();
    assert_eq!(book.outbox[0].state, DeliveryState::Failed);

    let audit = storage.read_audit(10).unwrap();
    assert!(audit
        .iter()
        .any(|e| e.level == AuditLevel::Error && e.message.contains("smtp relay unreachable")));
}

#[test]
fn a_corrupt_book_does_not_stop_other_tenants() {
    let dir = tempdir().expect("tempdir");
    let storage = storage(dir.path());
    storage.save_book(&acme_with_invoice()).unwrap();
    std::fs::write(dir.path().join("data/books/broken.json"), "{ not json").unwrap();
    let notifier = MemoryNotifier::new();
    let runner = JobRunner::new(&storage, &notifier, LifecyclePolicy::default(), 3);

    let report = runner.run(&RunOptions::new(date(2025, 2, 1))).unwrap();
    assert_eq!(report.failures(), 1);
    let acme = report.tenants.iter().find(|t| t.tenant == "acme").unwrap();
    assert_eq!(acme.transition_count(), 1);
    let broken = report.tenants.iter().find(|t| t.tenant == "broken").unwrap();
    assert!(broken.error.is_some());

    let audit = storage.read_audit(10).unwrap();
    assert!(audit
        .iter()
        .any(|e| e.tenant.as_deref() == Some("broken") && e.level == AuditLevel::Error));
}
