// ABOUTME: Test outcomes and their aggregation into a run summary
// ABOUTME: Errors dominate failures, failures dominate passes

use serde::{Deserialize, Serialize};
use std::fmt;

use super::declaration::TestDeclaration;

/// Ordered so that the worse status compares greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub declaration: TestDeclaration,
    pub adapter: Option<String>,
    pub status: TestStatus,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSummary {
    pub results: Vec<TestResult>,
}

impl TestStatus {
    /// Combine statuses: any error wins, then any failure, otherwise passed.
    pub fn aggregate<I>(statuses: I) -> TestStatus
    where
        I: IntoIterator<Item = TestStatus>,
    {
        statuses.into_iter().max().unwrap_or(TestStatus::Passed)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "passed"),
            TestStatus::Failed => write!(f, "failed"),
            TestStatus::Error => write!(f, "error"),
        }
    }
}

impl TestResult {
    pub fn new(declaration: TestDeclaration, adapter: Option<String>, status: TestStatus) -> Self {
        Self {
            declaration,
            adapter,
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn status(&self) -> TestStatus {
        TestStatus::aggregate(self.results.iter().map(|r| r.status))
    }

    pub fn count(&self, status: TestStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn is_successful(&self) -> bool {
        self.status() == TestStatus::Passed
    }

    /// The one line reported at the end of a test run.
    pub fn summary_line(&self) -> String {
        match self.status() {
            TestStatus::Error => "ERROR occurred during testing.".to_string(),
            TestStatus::Failed => "One or more tests FAILED.".to_string(),
            TestStatus::Passed => format!("All {} test(s) passed.", self.results.len()),
        }
    }
}
