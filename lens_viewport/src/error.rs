// Copyright 2025 the Lens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use lens_match::SelectorError;

/// Settings failed to load or validate.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed into settings.
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A rule's selector does not parse.
    #[error("rule `{rule}` has an invalid selector: {source}")]
    Selector {
        /// Rule name.
        rule: String,
        /// Parse failure.
        #[source]
        source: SelectorError,
    },
    /// Two rules share a name.
    #[error("duplicate rule name `{0}`")]
    DuplicateRule(String),
    /// A size or step that must be a positive, finite number is not.
    #[error("`{field}` must be positive and finite, got {value}")]
    NotPositive {
        /// Settings path of the offending value.
        field: &'static str,
        /// The value found.
        value: f64,
    },
    /// The zoom step would not zoom in.
    #[error("`input.zoom_step` must be greater than 1, got {0}")]
    ZoomStep(f64),
}

/// The host refused or could not perform a boundary action.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoundaryError {
    /// The host tried and failed.
    #[error("{action} was rejected: {reason}")]
    Rejected {
        /// What was attempted.
        action: &'static str,
        /// Host-provided reason.
        reason: String,
    },
    /// The host has no such facility.
    #[error("{0} is not supported here")]
    Unsupported(&'static str),
    /// There is nothing to put on the clipboard.
    #[error("nothing to copy")]
    NothingToCopy,
}
