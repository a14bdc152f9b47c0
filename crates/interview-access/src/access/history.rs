use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::domain::Interview;

/// Occurred-interview dates per interviewer email, each list ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterviewHistory {
    by_email: HashMap<String, Vec<DateTime<Utc>>>,
}

impl InterviewHistory {
    /// Drops canceled interviews, orders the rest by date (stable on ties),
    /// then records one date per interviewer per interview.
    pub fn coalesce(interviews: &[Interview]) -> Self {
        let mut occurred: Vec<&Interview> = interviews
            .iter()
            .filter(|interview| interview.occurred())
            .collect();
        occurred.sort_by_key(|interview| interview.date);

        let mut by_email: HashMap<String, Vec<DateTime<Utc>>> = HashMap::new();
        for interview in occurred {
            for interviewer in &interview.interviewers {
                by_email
                    .entry(interviewer.email.clone())
                    .or_default()
                    .push(interview.date);
            }
        }

        Self { by_email }
    }

    /// Dates for `email`, oldest first. Unknown emails have no occurrences.
    pub fn occurrences(&self, email: &str) -> &[DateTime<Utc>] {
        self.by_email
            .get(email)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn interviewer_count(&self) -> usize {
        self.by_email.len()
    }
}
