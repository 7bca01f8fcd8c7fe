//! Outcome of multi-step writes that are not transactional.
//!
//! Billing commits and cascade deletes issue one store call per document.
//! Nothing is rolled back when a step fails; the report records which steps
//! went through so the caller can tell the user exactly what happened.

use serde::Serialize;

/// A single failed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    pub id: String,
    pub error: String,
}

/// Per-step results of a sequence of store writes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<StepFailure>,
}

impl BatchReport {
    pub fn record_success(&mut self, id: impl Into<String>) {
        self.succeeded.push(id.into());
    }

    pub fn record_failure(&mut self, id: impl Into<String>, error: impl ToString) {
        self.failed.push(StepFailure {
            id: id.into(),
            error: error.to_string(),
        });
    }

    /// True when every attempted step succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_successes_and_failures() {
        let mut report = BatchReport::default();
        assert!(report.is_complete());

        report.record_success("p1");
        report.record_failure("p2", "backend down");

        assert!(!report.is_complete());
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.failed[0].error, "backend down");
    }
}
