// Roster
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Generic data types shared by all services.
//!
//! Types in this module, and in the `model` modules of the services, are valid by construction:
//! their constructors take untrusted input and return a `ModelError` if the input does not satisfy
//! the type's constraints.

use serde::{Deserialize, Serialize};
use std::fmt;

mod emailaddress;
pub use emailaddress::EmailAddress;

/// Model errors.  The payload is a description of the invalid value.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// A single violation of a field-level constraint.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldError {
    /// Name of the field that failed validation, as it appears in the request.
    pub field: String,

    /// Description of the problem.
    pub message: String,
}

impl FieldError {
    /// Creates a new violation for `field` with the given `message`.
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Collection of all the violations found while validating a request.
///
/// Validation routines should check every field and record all problems instead of stopping at
/// the first one so that callers can report them together.
#[derive(Debug, Default, PartialEq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Records the outcome of validating `field`, keeping the valid value if there was one.
    pub fn check<T>(&mut self, field: &str, result: ModelResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.0.push(FieldError::new(field, e.0));
                None
            }
        }
    }

    /// Returns true if no violations have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the recorded violations.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Consumes the collection and returns the recorded violations.
    pub fn into_errors(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
