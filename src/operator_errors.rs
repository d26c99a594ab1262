// (c) Copyright IBM Corp. 2025
// SPDX-License-Identifier: Apache-2.0

//! Error types for the object apply pipeline.
//!
//! These errors surface in status conditions, so their messages carry the
//! object coordinates a user needs to find the rejected manifest.

use thiserror::Error;

/// Errors raised while applying or deleting generated objects.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// A single object was rejected by the API server.
    #[error("failed to apply {kind} '{name}': {source}")]
    Object {
        /// Kind of the rejected object
        kind: String,
        /// Name of the rejected object
        name: String,
        /// The underlying API error
        #[source]
        source: kube::Error,
    },

    /// One or more objects out of a generation failed to apply. The details
    /// list one `kind/name: error` entry per failure.
    #[error("failed to apply {failed} of {total} objects: {details}")]
    Aggregate {
        /// Number of failed objects
        failed: usize,
        /// Number of objects in the generation
        total: usize,
        /// Per-object failure summaries
        details: String,
    },

    /// A recorded dependent could not be deleted during cleanup.
    #[error("failed to delete {kind} '{name}': {source}")]
    Delete {
        /// Kind of the object
        kind: String,
        /// Name of the object
        name: String,
        /// The underlying API error
        #[source]
        source: kube::Error,
    },
}

#[cfg(test)]
#[path = "operator_errors_tests.rs"]
mod operator_errors_tests;
