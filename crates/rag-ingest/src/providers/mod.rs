//! Embedding provider abstractions
//!
//! The pipeline only sees the [`EmbeddingProvider`] trait, so a different
//! vendor or vector dimension is a new implementation, not a pipeline change.

pub mod dashscope;
pub mod embedding;
pub mod retry;

pub use dashscope::DashScopeEmbedder;
pub use embedding::EmbeddingProvider;
pub use retry::{ExponentialBackoff, NoRetry, RetryPolicy};
