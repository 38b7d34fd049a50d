//! Mock oracle for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Oracle, OracleError};

/// A scripted reply for [`MockOracle`].
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Simulate a successful completion.
    Text(String),
    /// Simulate a transport/API failure.
    Error(String),
}

impl MockReply {
    pub fn text(s: &str) -> Self {
        MockReply::Text(s.to_string())
    }
}

/// A hand-rolled mock implementing [`Oracle`] for tests.
///
/// Supports:
/// - A fixed reply (used for every call), **or**
/// - A sequence of replies (one per call, repeating the last if exhausted).
/// - Call counting via [`call_count()`](MockOracle::call_count).
pub struct MockOracle {
    /// If non-empty, each call pops the next reply (last is repeated if exhausted).
    replies: Mutex<Vec<MockReply>>,
    /// Fallback when the sequence is empty (or single-reply mode).
    fallback: MockReply,
    call_count: AtomicUsize,
}

impl MockOracle {
    /// Create a mock that always returns `reply`.
    pub fn new(reply: MockReply) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            fallback: reply,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns replies in order, repeating the last one.
    pub fn with_sequence(mut replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "sequence must have at least one reply");
        // Reverse so we can pop() from the front cheaply.
        replies.reverse();
        let fallback = replies.first().cloned().unwrap();
        Self {
            replies: Mutex::new(replies),
            fallback,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `ask()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockReply {
        let mut seq = self.replies.lock().unwrap();
        if let Some(reply) = seq.pop() {
            reply
        } else {
            self.fallback.clone()
        }
    }
}

impl Oracle for MockOracle {
    fn ask<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, OracleError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply();

        Box::pin(async move {
            match reply {
                MockReply::Text(text) => Ok(text),
                MockReply::Error(msg) => Err(OracleError::Malformed(msg)),
            }
        })
    }
}
