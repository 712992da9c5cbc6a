mod common;

use std::time::Duration;

use common::{Lookup, Page, StubPlatform};
use username_scout::application::services::Prober;
use username_scout::domain::entities::{Availability, StrategyKind, UnknownKind};
use username_scout::domain::probing::{Probe, ProbeStrategy, StrategyOutcome};
use username_scout::infrastructure::remote::{
    PresenceCheckStrategy, ProfileLookupStrategy, build_strategies,
};

const SESSION: &str = "1234%3Aabcd%3A5";

fn inconclusive_kind(outcome: &StrategyOutcome) -> Option<UnknownKind> {
    match outcome {
        StrategyOutcome::Inconclusive { kind, .. } => Some(*kind),
        StrategyOutcome::Verdict { .. } => None,
    }
}

#[tokio::test]
async fn test_presence_check_classifies_pages() {
    let stub = StubPlatform::default()
        .page("taken", Page::Profile)
        .page("soft", Page::SoftMissing)
        .page("busy", Page::RateLimited)
        .page("oops", Page::ServerError)
        .spawn()
        .await;
    let strategy = PresenceCheckStrategy::new(&stub.probe_settings(None)).unwrap();

    assert_eq!(
        strategy.attempt("free").await,
        StrategyOutcome::available(Some(404))
    );
    assert_eq!(
        strategy.attempt("taken").await,
        StrategyOutcome::taken(Some(200), None)
    );
    assert_eq!(
        strategy.attempt("soft").await,
        StrategyOutcome::available(Some(200))
    );

    let busy = strategy.attempt("busy").await;
    assert_eq!(inconclusive_kind(&busy), Some(UnknownKind::RateLimited));

    let oops = strategy.attempt("oops").await;
    assert_eq!(inconclusive_kind(&oops), Some(UnknownKind::UnexpectedStatus));
    assert!(!oops.is_retryable());
}

#[tokio::test]
async fn test_presence_check_without_soft_404_check() {
    let stub = StubPlatform::default()
        .page("soft", Page::SoftMissing)
        .spawn()
        .await;
    let mut settings = stub.probe_settings(None);
    settings.soft_404_check = false;
    let strategy = PresenceCheckStrategy::new(&settings).unwrap();

    assert_eq!(
        strategy.attempt("soft").await,
        StrategyOutcome::taken(Some(200), None)
    );
}

#[tokio::test]
async fn test_presence_check_login_wall() {
    let stub = StubPlatform::default()
        .page("wall", Page::LoginWall)
        .spawn()
        .await;
    let strategy = PresenceCheckStrategy::new(&stub.probe_settings(None)).unwrap();

    let outcome = strategy.attempt("wall").await;
    assert_eq!(inconclusive_kind(&outcome), Some(UnknownKind::LoginRequired));
}

#[tokio::test]
async fn test_presence_check_timeout() {
    let stub = StubPlatform::default()
        .page("slow", Page::Slow(Duration::from_secs(3)))
        .spawn()
        .await;
    let mut settings = stub.probe_settings(None);
    settings.timeout = Duration::from_millis(200);
    let strategy = PresenceCheckStrategy::new(&settings).unwrap();

    let outcome = strategy.attempt("slow").await;
    assert_eq!(inconclusive_kind(&outcome), Some(UnknownKind::Timeout));
}

#[tokio::test]
async fn test_presence_check_connection_refused() {
    let stub = StubPlatform::default().spawn().await;
    let mut settings = stub.probe_settings(None);
    // Nothing listens on port 9 of the loopback interface.
    settings.base_url = "http://127.0.0.1:9/".parse().unwrap();
    let strategy = PresenceCheckStrategy::new(&settings).unwrap();

    let outcome = strategy.attempt("ab12").await;
    assert_eq!(inconclusive_kind(&outcome), Some(UnknownKind::ConnectionError));
}

#[tokio::test]
async fn test_lookup_classifies_answers() {
    let stub = StubPlatform::default()
        .lookup("taken", Lookup::User("987654"))
        .lookup("gone", Lookup::Status(404))
        .lookup("busy", Lookup::Status(429))
        .lookup("wait", Lookup::Fail("Please wait a few minutes before you try again."))
        .lookup("auth", Lookup::LoginRedirect)
        .spawn()
        .await;
    let strategy = ProfileLookupStrategy::new(&stub.probe_settings(Some(SESSION))).unwrap();

    assert_eq!(
        strategy.attempt("taken").await,
        StrategyOutcome::taken(Some(200), Some("987654".to_string()))
    );
    assert_eq!(
        strategy.attempt("free").await,
        StrategyOutcome::available(Some(200))
    );
    assert_eq!(
        strategy.attempt("gone").await,
        StrategyOutcome::available(Some(404))
    );
    assert_eq!(
        inconclusive_kind(&strategy.attempt("busy").await),
        Some(UnknownKind::RateLimited)
    );
    assert_eq!(
        inconclusive_kind(&strategy.attempt("wait").await),
        Some(UnknownKind::RateLimited)
    );

    let auth = strategy.attempt("auth").await;
    assert_eq!(inconclusive_kind(&auth), Some(UnknownKind::LoginRequired));
    assert!(auth.is_retryable());
}

#[tokio::test]
async fn test_prober_falls_back_when_lookup_rejected() {
    let stub = StubPlatform::default()
        .lookup("ab12", Lookup::Status(401))
        .page("ab12", Page::Profile)
        .spawn()
        .await;
    let prober = Prober::new(build_strategies(&stub.probe_settings(Some(SESSION))).unwrap()).unwrap();

    let result = prober.probe("ab12").await;

    assert_eq!(result.availability, Availability::Taken);
    assert_eq!(result.strategy_used, Some(StrategyKind::PresenceCheck));
    assert_eq!(stub.lookup_hits(), 1);
    assert_eq!(stub.page_hits(), 1);
}

#[tokio::test]
async fn test_prober_trusts_lookup_verdict() {
    let stub = StubPlatform::default()
        .lookup("ab12", Lookup::User("42"))
        .page("ab12", Page::Missing)
        .spawn()
        .await;
    let prober = Prober::new(build_strategies(&stub.probe_settings(Some(SESSION))).unwrap()).unwrap();

    let result = prober.probe("ab12").await;

    assert_eq!(result.availability, Availability::Taken);
    assert_eq!(result.strategy_used, Some(StrategyKind::AuthenticatedLookup));
    assert_eq!(result.user_id.as_deref(), Some("42"));
    assert_eq!(stub.page_hits(), 0);
}

#[tokio::test]
async fn test_prober_without_session_skips_lookup() {
    let stub = StubPlatform::default().spawn().await;
    let prober = Prober::new(build_strategies(&stub.probe_settings(None)).unwrap()).unwrap();

    let result = prober.probe("ab12").await;

    assert_eq!(result.availability, Availability::Available);
    assert_eq!(result.raw_status_code, Some(404));
    assert_eq!(stub.lookup_hits(), 0);
}

#[tokio::test]
async fn test_classification_is_idempotent_against_stable_stub() {
    let stub = StubPlatform::default()
        .page("taken", Page::Profile)
        .spawn()
        .await;
    let prober = Prober::new(build_strategies(&stub.probe_settings(None)).unwrap()).unwrap();

    for username in ["taken", "free"] {
        let first = prober.probe(username).await;
        let second = prober.probe(username).await;
        assert_eq!(first.availability, second.availability, "{username}");
    }
}
