use std::num::NonZeroUsize;

use super::domain::{AccessDecisions, DecisionRecord, Person};
use super::history::InterviewHistory;

/// Splits `people` into grants and revocations, keeping input order within
/// each group. A person is granted once their history holds at least
/// `threshold` interviews; the grant date is the `threshold`-th one.
pub fn decide(
    history: &InterviewHistory,
    threshold: NonZeroUsize,
    people: &[Person],
) -> AccessDecisions {
    let mut decisions = AccessDecisions::default();

    for person in people {
        match history.occurrences(&person.email).get(threshold.get() - 1) {
            Some(date) => decisions
                .grant_to
                .push(DecisionRecord::granted(person.username.clone(), *date)),
            None => decisions
                .revoke_from
                .push(DecisionRecord::revoked(person.username.clone())),
        }
    }

    decisions
}
