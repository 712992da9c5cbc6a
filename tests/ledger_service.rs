mod common;

use username_scout::domain::entities::{
    Availability, ProbeResult, StatisticsSnapshot, StrategyKind, UnknownKind,
};

#[tokio::test]
async fn test_add_exists_duplicate_round_trip() {
    let db = common::test_db().await;
    let ledger = common::ledger_on(&db);

    assert!(!ledger.exists("ab12").await.unwrap());

    let first = ledger.add_available("ab12", None).await.unwrap();
    assert!(first.inserted);
    assert!(ledger.exists("ab12").await.unwrap());

    let second = ledger.add_available("ab12", Some("again".to_string())).await.unwrap();
    assert!(!second.inserted);
    assert_eq!(ledger.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_add_many_counts_internal_duplicates() {
    let db = common::test_db().await;
    let ledger = common::ledger_on(&db);

    ledger.add_available("known", None).await.unwrap();

    let summary = ledger
        .add_many(&common::ids(&["aaaa", "bbbb", "aaaa", "known"]))
        .await;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.added, 2);
    assert_eq!(summary.duplicates, 2);
    assert_eq!(summary.added + summary.duplicates, summary.total);
    assert!(summary.failures.is_empty());
    assert_eq!(ledger.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_add_many_empty() {
    let db = common::test_db().await;
    let ledger = common::ledger_on(&db);

    let summary = ledger.add_many(&[]).await;

    assert_eq!((summary.added, summary.duplicates, summary.total), (0, 0, 0));
}

#[tokio::test]
async fn test_list_recent_and_all() {
    let db = common::test_db().await;
    let ledger = common::ledger_on(&db);

    ledger.add_many(&common::ids(&["aaaa", "bbbb", "cccc"])).await;

    let recent = ledger.list_recent(2).await.unwrap();
    let names: Vec<_> = recent.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(names, vec!["cccc", "bbbb"]);

    assert_eq!(ledger.list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_record_results_and_statistics() {
    let db = common::test_db().await;
    let ledger = common::ledger_on(&db);

    let results = vec![
        ProbeResult::new(
            "aaaa",
            Availability::Available,
            Some(StrategyKind::PresenceCheck),
            Some(404),
        ),
        ProbeResult::new(
            "bbbb",
            Availability::Taken,
            Some(StrategyKind::PresenceCheck),
            Some(200),
        ),
        ProbeResult::unknown("cccc", UnknownKind::ConnectionError, "connection refused"),
    ];
    ledger.record_results(&results).await;
    ledger.add_available("aaaa", None).await.unwrap();

    let stats = ledger.statistics().await.unwrap();
    assert_eq!(
        stats,
        StatisticsSnapshot {
            total_available: 1,
            total_checks: 3,
            available_from_history: 1,
        }
    );

    let history = ledger.history_for("cccc", 5).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].outcome, "unknown");
    assert_eq!(
        history[0].error_message.as_deref(),
        Some("connection_error: connection refused")
    );
}

#[tokio::test]
async fn test_record_history_does_not_fail_on_closed_database() {
    let db = common::test_db().await;
    let ledger = common::ledger_on(&db);

    db.close().await;

    ledger.record_history("ab12", Some(true), Some(404), None).await;
}

#[tokio::test]
async fn test_delete_and_clear() {
    let db = common::test_db().await;
    let ledger = common::ledger_on(&db);

    ledger.add_many(&common::ids(&["aaaa", "bbbb"])).await;
    ledger.record_history("aaaa", Some(true), Some(404), None).await;

    assert!(ledger.delete("aaaa").await.unwrap());
    assert!(!ledger.delete("aaaa").await.unwrap());

    assert_eq!(ledger.clear().await.unwrap(), 1);
    assert_eq!(ledger.statistics().await.unwrap(), StatisticsSnapshot::default());
}
