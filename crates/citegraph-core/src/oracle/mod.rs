//! Resolution oracle trait and implementations.

pub mod mock;
pub mod openai;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use openai::OpenAiOracle;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("oracle returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

/// A single-shot natural-language completion service.
///
/// The oracle is fallible and slow; callers in the resolver swallow
/// errors into "unresolved" rather than propagating them.
pub trait Oracle: Send + Sync {
    /// Ask the oracle a free-text question; returns the completion text.
    fn ask<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, OracleError>> + Send + 'a>>;
}
