/*!
 * Mock provider implementations for testing.
 *
 * - `MockTranslator::working()` - Wraps the input as `[model:text]`, so hop order is visible
 * - `MockTranslator::failing()` - Always fails with an error
 * - `MockComparison` - Fixed answers, failures, or failing every Nth request
 * - `CountingTransliterator` - Delegates to ITRANS and counts calls
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::language_utils::Language;
use crate::providers::itrans::ItransTransliterator;
use crate::providers::{ComparisonProvider, TranslationProvider, TransliterationProvider};
use crate::translation::pipeline::ModelRef;

/// Behavior mode for the mock providers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth request (1-based)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
}

impl MockBehavior {
    fn should_fail(&self, request_number: usize) -> bool {
        match self {
            Self::Working => false,
            Self::Failing => true,
            Self::Intermittent { fail_every } => *fail_every > 0 && request_number % fail_every == 0,
        }
    }
}

/// Mock translation backend
#[derive(Debug, Clone)]
pub struct MockTranslator {
    behavior: MockBehavior,
    /// Fixed answers keyed by input text
    responses: HashMap<String, String>,
    /// Every (model, input) pair seen, in order
    calls: Arc<Mutex<Vec<(ModelRef, String)>>>,
}

impl MockTranslator {
    /// Create a new mock translator with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            responses: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock translator that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock translator that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Answer `input` with `output` instead of the wrapped form
    pub fn with_response(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.responses.insert(input.into(), output.into());
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Calls made so far
    pub fn calls(&self) -> Vec<(ModelRef, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TranslationProvider for MockTranslator {
    async fn translate(&self, model: &ModelRef, text: &str) -> Result<String, ProviderError> {
        let request_number = {
            let mut calls = self.calls.lock();
            calls.push((model.clone(), text.to_string()));
            calls.len()
        };

        if self.behavior.should_fail(request_number) {
            return Err(ProviderError::ConnectionError(format!("mock model {} unreachable", model)));
        }

        Ok(self
            .responses
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("[{}:{}]", model.location(), text)))
    }
}

/// Mock comparison provider
#[derive(Debug, Clone)]
pub struct MockComparison {
    behavior: MockBehavior,
    responses: HashMap<String, String>,
    request_count: Arc<AtomicUsize>,
}

impl MockComparison {
    /// Create a new mock comparison provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            responses: HashMap::new(),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock that echoes `google(<text>)` unless a response is set
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that always fails as if rate-limited
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock failing every Nth request
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Answer `input` with `output`
    pub fn with_response(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.responses.insert(input.into(), output.into());
        self
    }

    /// Number of requests made so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComparisonProvider for MockComparison {
    fn name(&self) -> &str {
        "Mock comparison"
    }

    async fn translate(&self, text: &str, _source: Language, _target: Language) -> Result<String, ProviderError> {
        let request_number = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        if self.behavior.should_fail(request_number) {
            return Err(ProviderError::RateLimitExceeded("mock rate limit".to_string()));
        }
        Ok(self
            .responses
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("google({})", text)))
    }
}

/// ITRANS transliterator that counts how often it is called
#[derive(Debug, Clone, Default)]
pub struct CountingTransliterator {
    inner: ItransTransliterator,
    calls: Arc<AtomicUsize>,
}

impl CountingTransliterator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TransliterationProvider for CountingTransliterator {
    fn transliterate(&self, text: &str, target: Language) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.transliterate(text, target)
    }

    fn scheme(&self) -> &str {
        self.inner.scheme()
    }
}
