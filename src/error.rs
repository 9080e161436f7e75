#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the orgpulse crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free while still
//! exposing a thoroughly documented error surface for library consumers.

use std::path::{Path, PathBuf};

/// Unified error type returned by the aggregation pipeline and CLI.
///
/// The variants separate the fatal failure classes (connection loss, missing
/// organization data, credential clobbering) from precondition violations so
/// callers can fail fast before any network activity. Data that is merely
/// absent upstream is never an error; the client layer reports it as `None`
/// and the pipeline substitutes placeholder values.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Returned when caller-supplied input violates a precondition.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the precondition violation.
        message: String
    },
    /// Returned when the hosting API host cannot be reached at all.
    ///
    /// Connection failures abort the entire run; they are never retried or
    /// downgraded to missing data.
    #[error("connection to hosting API failed: {message}")]
    Connection {
        /// Human readable message describing the transport failure.
        message: String
    },
    /// Unexpected failures while talking to or decoding the hosting API.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// Returned when an organization lookup yields no repositories.
    #[error("no repositories found for organization '{organization}'")]
    NoRepositories {
        /// Organization whose repository listing came back empty.
        organization: String
    },
    /// Returned when storing a credential would overwrite an existing key.
    #[error("credential file already exists at {path:?}; remove it before storing a new one")]
    CredentialExists {
        /// Location of the pre-existing credential file.
        path: PathBuf
    },
    /// Wraps I/O errors raised while reading or writing local files.
    #[error("failed to access {path:?}: {source}")]
    Io {
        /// Location of the file involved in the failing operation.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps serialization errors when writing or reloading snapshots.
    #[error("failed to serialize report data: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Constructs a connection error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the transport failure.
    pub fn connection<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Connection {
            message: message.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn connection_constructor_populates_message() {
        let error = Error::connection("host unreachable");
        match error {
            Error::Connection {
                ref message
            } => {
                assert_eq!(message, "host unreachable");
            }
            other => panic!("expected connection error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::validation("display me");
        assert_eq!(error.to_string(), error.to_display_string());
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/example.html");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn serde_json_conversion_maps_to_serialize_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Serialize { .. }));
    }

    #[test]
    fn no_repositories_display_names_the_organization() {
        let error = Error::NoRepositories {
            organization: "acme".to_owned()
        };
        assert!(error.to_string().contains("acme"));
    }
}
