//! Interview-participation access review.
//!
//! The upstream API is walked page by page into a flat interview snapshot,
//! which is cached for a fixed TTL. Each review coalesces the snapshot by
//! interviewer email and splits the submitted people into grants and
//! revocations against a threshold count.

pub mod auth;
pub mod cache;
pub mod decision;
pub mod domain;
pub mod history;
pub mod router;
pub mod service;
pub mod upstream;

#[cfg(test)]
mod tests;

pub use auth::{policy_from_config, AccessPolicy, AllowAll, BearerToken};
pub use cache::{Clock, ExpiringCache, ManualClock, SystemClock};
pub use decision::decide;
pub use domain::{
    iso_millis, AccessDecisions, Cancellation, Candidate, DecisionRecord, Interview, Interviewer,
    Panel, Person,
};
pub use history::InterviewHistory;
pub use router::{access_router, ReviewRequestError};
pub use service::AccessReviewService;
pub use upstream::{
    fetch_interviews, unpage, LeverClient, Page, PageCursor, PageRequest, PageSource,
    UpstreamError,
};
