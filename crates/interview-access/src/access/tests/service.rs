use super::common::*;
use crate::access::domain::DecisionRecord;

#[tokio::test]
async fn review_reuses_snapshot_within_ttl() {
    let (service, source, clock) = build_service(FakeSource::with_panels(vec![vec![
        interview(at(2024, 1, 1), &["a@x.com"]),
    ]]));

    service
        .review(threshold(1), &[person("a@x.com", "a")])
        .await
        .expect("first review");
    let calls_after_first = source.calls();

    clock.advance(DAY / 2);
    service
        .review(threshold(1), &[person("a@x.com", "a")])
        .await
        .expect("second review");

    assert_eq!(source.calls(), calls_after_first);
}

#[tokio::test]
async fn review_refetches_after_ttl() {
    let (service, source, clock) = build_service(FakeSource::with_panels(vec![vec![
        interview(at(2024, 1, 1), &["a@x.com"]),
    ]]));

    service.interviews().await.expect("first fetch");
    let calls_after_first = source.calls();

    clock.advance(DAY);
    service.interviews().await.expect("second fetch");

    assert_eq!(source.calls(), calls_after_first * 2);
}

#[tokio::test]
async fn review_grants_and_revokes() {
    let (service, _, _) = build_service(FakeSource::with_panels(vec![
        vec![
            interview(at(2024, 1, 1), &["a@x.com"]),
            interview(at(2024, 1, 9), &["a@x.com", "b@x.com"]),
        ],
        vec![interview(at(2024, 1, 5), &["a@x.com"])],
    ]));

    let decisions = service
        .review(
            threshold(2),
            &[person("b@x.com", "b"), person("a@x.com", "a")],
        )
        .await
        .expect("review succeeds");

    assert_eq!(
        decisions.grant_to,
        vec![DecisionRecord::granted("a", at(2024, 1, 5))]
    );
    assert_eq!(decisions.revoke_from, vec![DecisionRecord::revoked("b")]);
}

#[tokio::test]
async fn failed_fetch_is_retried_on_next_review() {
    let (service, source, _) = build_service(FakeSource::default().failing("/candidates", 503));

    assert!(service.review(threshold(1), &[]).await.is_err());
    assert!(service.review(threshold(1), &[]).await.is_err());
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn expired_snapshot_is_swept_even_when_refetch_fails() {
    let (service, source, clock) = build_service(FakeSource::with_panels(vec![vec![
        interview(at(2024, 1, 1), &["a@x.com"]),
    ]]));

    service.interviews().await.expect("first fetch");
    assert_eq!(service.cached_snapshots(), 1);

    clock.advance(DAY);
    source.fail_from_now("/candidates", 502);

    assert!(service.interviews().await.is_err());
    assert_eq!(service.cached_snapshots(), 0);
}
