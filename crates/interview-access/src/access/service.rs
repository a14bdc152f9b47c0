use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tracing::{debug, info, warn};

use super::auth::{AccessPolicy, AllowAll};
use super::cache::{Clock, ExpiringCache, SystemClock};
use super::decision::decide;
use super::domain::{AccessDecisions, Interview, Person};
use super::history::InterviewHistory;
use super::upstream::{fetch_interviews, PageSource, UpstreamError};

/// The interview fetch takes no parameters, so the snapshot has one key.
const SNAPSHOT_KEY: &str = "interviews";

/// Composes the upstream source, the snapshot cache, and the caller policy.
pub struct AccessReviewService<S, C = SystemClock> {
    source: Arc<S>,
    snapshots: ExpiringCache<&'static str, Arc<Vec<Interview>>, C>,
    page_size: NonZeroUsize,
    policy: Arc<dyn AccessPolicy>,
}

impl<S> AccessReviewService<S, SystemClock>
where
    S: PageSource + 'static,
{
    pub fn new(source: Arc<S>, page_size: NonZeroUsize, ttl: Duration) -> Self {
        Self::with_clock(source, page_size, ttl, SystemClock)
    }
}

impl<S, C> AccessReviewService<S, C>
where
    S: PageSource + 'static,
    C: Clock + 'static,
{
    pub fn with_clock(source: Arc<S>, page_size: NonZeroUsize, ttl: Duration, clock: C) -> Self {
        Self {
            source,
            snapshots: ExpiringCache::with_clock(ttl, clock),
            page_size,
            policy: Arc::new(AllowAll),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn authorize(&self, headers: &HeaderMap) -> bool {
        self.policy.authorize(headers)
    }

    #[cfg(test)]
    pub(crate) fn cached_snapshots(&self) -> usize {
        self.snapshots.len()
    }

    /// Full interview snapshot, fetched at most once per TTL window.
    pub async fn interviews(&self) -> Result<Arc<Vec<Interview>>, UpstreamError> {
        let evicted = self.snapshots.purge_expired();
        if evicted > 0 {
            debug!(evicted, "expired interview snapshot dropped");
        }

        self.snapshots
            .get_or_populate(SNAPSHOT_KEY, || async {
                let interviews = fetch_interviews(self.source.as_ref(), self.page_size).await?;
                info!(
                    interviews = interviews.len(),
                    ttl_secs = self.snapshots.ttl().as_secs(),
                    "interview snapshot cached"
                );
                Ok::<_, UpstreamError>(Arc::new(interviews))
            })
            .await
            .inspect_err(|err| warn!(error = %err, "interview snapshot fetch failed"))
    }

    /// Classifies `people` against the current snapshot.
    pub async fn review(
        &self,
        threshold: NonZeroUsize,
        people: &[Person],
    ) -> Result<AccessDecisions, UpstreamError> {
        let interviews = self.interviews().await?;
        let history = InterviewHistory::coalesce(&interviews);
        let decisions = decide(&history, threshold, people);

        info!(
            threshold = threshold.get(),
            interviewers = history.interviewer_count(),
            people = people.len(),
            granted = decisions.grant_to.len(),
            revoked = decisions.revoke_from.len(),
            "access review completed"
        );
        Ok(decisions)
    }
}
