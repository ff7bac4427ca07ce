// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! One error type for the whole crate.
//!
//! Corrupt files, misused writers, unsupported operator trees and I/O all land
//! here. Nothing is retried internally: a `Format` error means the index is
//! broken, an `Unsupported` error means the caller built a tree the engine
//! cannot evaluate, and an `Io` error ends the current query.
//!
//! Lookups that are allowed to miss (a term that is not in the vocabulary, a
//! key past the end of the file) return `Ok(None)` instead of an error. The
//! `NotFound` variant is reserved for absences that break an invariant, such
//! as a candidate document with no recorded length.

use std::io;

use thiserror::Error;

/// Everything that can go wrong while writing or reading an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Corrupt or truncated data, or a writer fed keys out of order.
    #[error("format error: {0}")]
    Format(String),

    /// A lookup that must succeed did not.
    #[error("not found: {0}")]
    NotFound(String),

    /// The iterator tree asks for a capability an iterator does not have.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A parameter value that could not be parsed.
    #[error("invalid parameter '{name}': {value}")]
    InvalidParameter { name: String, value: String },

    /// An asynchronous query thread panicked before finishing.
    #[error("asynchronous query panicked")]
    QueryPanicked,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl IndexError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        IndexError::Format(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        IndexError::Unsupported(message.into())
    }

    /// True for errors that mean the data on disk cannot be trusted.
    pub fn is_format(&self) -> bool {
        matches!(self, IndexError::Format(_))
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
