//! Programmable stub driver shared by the integration tests.
//!
//! Unlike the mockall mocks used in unit tests, this driver is built for
//! concurrency assertions: it counts submissions and completions, records
//! every statement it saw, and can delay completion to make bounded-wait
//! behavior observable.

use async_trait::async_trait;
use cqlops_rs::driver::{BatchKind, CqlDriver};
use cqlops_rs::error::DriverFailure;
use cqlops_rs::result::ResultFrame;
use cqlops_rs::statement::Statement;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Test driver with scripted responses and submission accounting.
pub struct StubDriver {
    delay: Option<Duration>,
    default_frame: ResultFrame,
    responses: Mutex<VecDeque<Result<ResultFrame, DriverFailure>>>,
    seen: Mutex<Vec<Statement>>,
    submissions: AtomicUsize,
    completions: AtomicUsize,
    batch_submissions: AtomicUsize,
}

impl StubDriver {
    pub fn new() -> Self {
        Self {
            delay: None,
            default_frame: ResultFrame::empty(),
            responses: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
            submissions: AtomicUsize::new(0),
            completions: AtomicUsize::new(0),
            batch_submissions: AtomicUsize::new(0),
        }
    }

    /// Frame returned when no scripted response is queued.
    pub fn with_frame(mut self, frame: ResultFrame) -> Self {
        self.default_frame = frame;
        self
    }

    /// Delay every completion by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue one scripted response; consumed in submission order.
    pub fn push_response(&self, response: Result<ResultFrame, DriverFailure>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Number of single-statement submissions seen so far.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Number of submissions that ran to completion.
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    /// Number of batch submissions seen so far.
    pub fn batch_submissions(&self) -> usize {
        self.batch_submissions.load(Ordering::SeqCst)
    }

    /// Every single statement submitted, in order.
    pub fn seen_statements(&self) -> Vec<Statement> {
        self.seen.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<ResultFrame, DriverFailure> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.default_frame.clone()))
    }
}

#[async_trait]
impl CqlDriver for StubDriver {
    async fn execute(&self, statement: Statement) -> Result<ResultFrame, DriverFailure> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(statement);
        let response = self.next_response();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completions.fetch_add(1, Ordering::SeqCst);
        response
    }

    async fn execute_batch(
        &self,
        _kind: BatchKind,
        statements: Vec<Statement>,
    ) -> Result<ResultFrame, DriverFailure> {
        self.batch_submissions.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().extend(statements);
        let response = self.next_response();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completions.fetch_add(1, Ordering::SeqCst);
        response
    }
}
