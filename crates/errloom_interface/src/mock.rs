//! Dry-run sampling collaborator.

use crate::{Loom, SampleOptions};
use async_trait::async_trait;
use errloom_core::Tapestry;
use errloom_error::{ErrloomResult, LoomError};
use std::sync::Mutex;
use tracing::debug;

/// A sampling request as seen by [`MockLoom`].
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct MockRequest {
    /// Flat transcript at the time of the request
    prompt: String,
    /// Stop sequences passed by the caller
    stop_sequences: Vec<String>,
}

/// A loom that returns a fixed string regardless of input.
///
/// Every request is recorded so tests can inspect what the engine sent.
///
/// # Examples
///
/// ```
/// use errloom_interface::MockLoom;
///
/// let loom = MockLoom::new("mocked_sample");
/// assert_eq!(loom.sample_text(), "mocked_sample");
/// assert!(loom.requests().is_empty());
/// ```
#[derive(Debug)]
pub struct MockLoom {
    sample_text: String,
    failure: Option<String>,
    requests: Mutex<Vec<MockRequest>>,
}

impl MockLoom {
    /// Create a mock that answers every request with `sample_text`.
    pub fn new(sample_text: impl Into<String>) -> Self {
        Self {
            sample_text: sample_text.into(),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that fails every request with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sample_text: String::new(),
            failure: Some(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn sample_text(&self) -> &str {
        &self.sample_text
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<MockRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, request: MockRequest) {
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
    }
}

impl Default for MockLoom {
    fn default() -> Self {
        Self::new("mocked_sample")
    }
}

#[async_trait]
impl Loom for MockLoom {
    async fn sample(
        &self,
        tapestry: &Tapestry,
        stop_sequences: &[String],
        _options: &SampleOptions,
    ) -> ErrloomResult<String> {
        debug!(
            stop_sequences = ?stop_sequences,
            contexts = tapestry.contexts().len(),
            "MockLoom received sample request"
        );
        self.record(MockRequest {
            prompt: tapestry.to_text(),
            stop_sequences: stop_sequences.to_vec(),
        });

        match &self.failure {
            Some(message) => Err(LoomError::new(message.clone()).into()),
            None => Ok(self.sample_text.clone()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
