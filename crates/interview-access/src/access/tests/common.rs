use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::access::cache::ManualClock;
use crate::access::domain::{Cancellation, Interview, Interviewer, Person};
use crate::access::service::AccessReviewService;
use crate::access::upstream::{Page, PageCursor, PageRequest, PageSource, UpstreamError};

pub(super) const DAY: Duration = Duration::from_secs(60 * 60 * 24);

pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid date")
}

pub(super) fn interview(date: DateTime<Utc>, emails: &[&str]) -> Interview {
    Interview {
        canceled_at: Cancellation::NotCanceled,
        date,
        interviewers: emails
            .iter()
            .map(|email| Interviewer {
                email: email.to_string(),
            })
            .collect(),
    }
}

pub(super) fn canceled(date: DateTime<Utc>, emails: &[&str]) -> Interview {
    Interview {
        canceled_at: Cancellation::CanceledAt(date - chrono::Duration::days(1)),
        ..interview(date, emails)
    }
}

pub(super) fn person(email: &str, username: &str) -> Person {
    Person {
        email: email.to_string(),
        username: username.to_string(),
    }
}

pub(super) fn page_size(size: usize) -> NonZeroUsize {
    NonZeroUsize::new(size).expect("non-zero page size")
}

pub(super) fn threshold(count: usize) -> NonZeroUsize {
    NonZeroUsize::new(count).expect("non-zero threshold")
}

pub(super) fn interview_json(interview: &Interview) -> Value {
    serde_json::to_value(interview).expect("interview serializes")
}

/// In-memory collection endpoint that slices records by `limit`/`offset`
/// the way the real API does and remembers every request it served.
#[derive(Default)]
pub(super) struct FakeSource {
    collections: HashMap<String, Vec<Value>>,
    failures: Mutex<HashMap<String, u16>>,
    requests: Mutex<Vec<PageRequest>>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub(super) fn with_collection(mut self, path: &str, records: Vec<Value>) -> Self {
        self.collections.insert(path.to_string(), records);
        self
    }

    pub(super) fn failing(self, path: &str, status: u16) -> Self {
        self.fail_from_now(path, status);
        self
    }

    pub(super) fn fail_from_now(&self, path: &str, status: u16) {
        self.failures
            .lock()
            .expect("failure table poisoned")
            .insert(path.to_string(), status);
    }

    /// Candidates `c-1..` each owning one panel with the given interviews.
    pub(super) fn with_panels(panels: Vec<Vec<Interview>>) -> Self {
        let candidates = (1..=panels.len())
            .map(|index| json!({ "id": format!("c-{index}") }))
            .collect();
        let mut source = Self::default().with_collection("/candidates", candidates);
        for (index, interviews) in panels.iter().enumerate() {
            let panel = json!({
                "id": format!("p-{}", index + 1),
                "interviews": interviews.iter().map(interview_json).collect::<Vec<_>>(),
            });
            source = source.with_collection(&format!("/candidates/c-{}/panels", index + 1), vec![panel]);
        }
        source
    }

    pub(super) fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Value>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());

        let failure = self
            .failures
            .lock()
            .expect("failure table poisoned")
            .get(&request.path)
            .copied();
        if let Some(status) = failure {
            return Err(UpstreamError::Status {
                status,
                path: request.path.clone(),
            });
        }

        let records = self
            .collections
            .get(&request.path)
            .cloned()
            .unwrap_or_default();
        let limit: usize = request
            .param("limit")
            .and_then(|value| value.parse().ok())
            .unwrap_or(records.len().max(1));
        let offset: usize = request
            .param("offset")
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);

        let end = (offset + limit).min(records.len());
        let data = records.get(offset..end).map(<[Value]>::to_vec).unwrap_or_default();
        let has_next = end < records.len();

        Ok(Page {
            data,
            has_next,
            next: has_next.then(|| PageCursor(end.to_string())),
        })
    }
}

pub(super) fn build_service(
    source: FakeSource,
) -> (
    AccessReviewService<FakeSource, Arc<ManualClock>>,
    Arc<FakeSource>,
    Arc<ManualClock>,
) {
    let source = Arc::new(source);
    let clock = Arc::new(ManualClock::new());
    let service =
        AccessReviewService::with_clock(source.clone(), page_size(100), DAY, clock.clone());
    (service, source, clock)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
