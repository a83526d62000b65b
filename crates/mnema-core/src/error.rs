// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnema memory engine.

use thiserror::Error;

/// The primary error type used across all Mnema adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MnemaError {
    /// Configuration errors (invalid TOML, missing required fields, bad parameter ranges).
    /// Raised at construction and never degraded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid caller input (wrong embedding width, empty query text).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Store backend errors (query failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (API failure, token limits, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding adapter errors (model failure, backend width mismatch).
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM output that cannot be used on a turn-critical path.
    #[error("unparseable response: {0}")]
    Parse(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemaError {
    /// Wraps an arbitrary error as a store error.
    pub fn store(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store {
            source: Box::new(source),
        }
    }

    /// Builds a provider error from a message alone.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an embedding error from a message alone.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
            source: None,
        }
    }
}
