use super::common::*;
use crate::access::decision::decide;
use crate::access::domain::DecisionRecord;
use crate::access::history::InterviewHistory;

fn three_interviews() -> InterviewHistory {
    InterviewHistory::coalesce(&[
        interview(at(2024, 1, 1), &["a@x.com"]),
        interview(at(2024, 1, 5), &["a@x.com"]),
        interview(at(2024, 1, 9), &["a@x.com"]),
    ])
}

#[test]
fn grants_with_nth_occurrence_date() {
    let decisions = decide(
        &three_interviews(),
        threshold(2),
        &[person("a@x.com", "a")],
    );

    assert_eq!(
        decisions.grant_to,
        vec![DecisionRecord::granted("a", at(2024, 1, 5))]
    );
    assert!(decisions.revoke_from.is_empty());

    let body = serde_json::to_value(&decisions).expect("serializes");
    assert_eq!(
        body["grant_to"][0]["date_granted"],
        "2024-01-05T00:00:00.000Z"
    );
}

#[test]
fn exact_threshold_grants_on_last_date() {
    let decisions = decide(
        &three_interviews(),
        threshold(3),
        &[person("a@x.com", "a")],
    );

    assert_eq!(
        decisions.grant_to,
        vec![DecisionRecord::granted("a", at(2024, 1, 9))]
    );
}

#[test]
fn revokes_below_threshold_without_date() {
    let decisions = decide(
        &three_interviews(),
        threshold(5),
        &[person("a@x.com", "a")],
    );

    assert!(decisions.grant_to.is_empty());
    assert_eq!(decisions.revoke_from, vec![DecisionRecord::revoked("a")]);

    let body = serde_json::to_value(&decisions).expect("serializes");
    assert!(body["revoke_from"][0].get("date_granted").is_none());
}

#[test]
fn people_without_history_are_revoked() {
    let decisions = decide(
        &three_interviews(),
        threshold(1),
        &[person("ghost@x.com", "ghost")],
    );

    assert!(decisions.grant_to.is_empty());
    assert_eq!(decisions.revoke_from, vec![DecisionRecord::revoked("ghost")]);
}

#[test]
fn canceled_interview_does_not_tip_threshold() {
    let history = InterviewHistory::coalesce(&[
        interview(at(2024, 1, 1), &["a@x.com"]),
        canceled(at(2024, 1, 2), &["a@x.com"]),
    ]);

    let decisions = decide(&history, threshold(2), &[person("a@x.com", "a")]);

    assert!(decisions.grant_to.is_empty());
    assert_eq!(decisions.revoke_from, vec![DecisionRecord::revoked("a")]);
}

#[test]
fn partition_preserves_input_order() {
    let history = InterviewHistory::coalesce(&[
        interview(at(2024, 4, 1), &["a@x.com", "c@x.com", "e@x.com"]),
        interview(at(2024, 4, 2), &["c@x.com", "e@x.com"]),
    ]);
    let people = vec![
        person("e@x.com", "e"),
        person("b@x.com", "b"),
        person("a@x.com", "a"),
        person("c@x.com", "c"),
        person("d@x.com", "d"),
    ];

    let decisions = decide(&history, threshold(2), &people);

    let granted: Vec<_> = decisions
        .grant_to
        .iter()
        .map(|record| record.username.as_str())
        .collect();
    let revoked: Vec<_> = decisions
        .revoke_from
        .iter()
        .map(|record| record.username.as_str())
        .collect();
    assert_eq!(granted, vec!["e", "c"]);
    assert_eq!(revoked, vec!["b", "a", "d"]);

    let mut merged: Vec<_> = granted.iter().chain(revoked.iter()).copied().collect();
    merged.sort_by_key(|username| {
        people
            .iter()
            .position(|person| person.username == *username)
            .expect("username from input")
    });
    let original: Vec<_> = people.iter().map(|person| person.username.as_str()).collect();
    assert_eq!(merged, original);
}
