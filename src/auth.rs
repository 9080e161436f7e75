// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Local credential file for the hosting API.
//!
//! The credential is stored as a pre-encoded basic-auth header value in a
//! fixed-name, owner-read-only file. It is read once per process and never
//! transmitted anywhere but the hosting API. Storing refuses to overwrite an
//! existing file so a stale token cannot silently clobber a fresh one; the
//! operator deletes the file and stores again.

use std::{
    fs, io,
    path::{Path, PathBuf}
};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::info;

use crate::error::{Error, io_error};

/// Fixed name of the credential file.
pub const CREDENTIAL_FILE: &str = ".orgpulse-key";

/// Resolves the credential file path inside the given directory.
pub fn credential_path(dir: &Path) -> PathBuf {
    dir.join(CREDENTIAL_FILE)
}

/// Reads the stored authorization header value.
///
/// # Arguments
///
/// * `dir` - Directory holding the credential file (the CLI uses the current
///   working directory).
///
/// # Errors
///
/// Returns a validation error directing the operator to the auth command
/// when no credential file exists, and [`Error::Io`] for other read
/// failures.
pub fn load_credential(dir: &Path) -> Result<String, Error> {
    let path = credential_path(dir);

    let raw = fs::read_to_string(&path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            Error::validation(format!(
                "no credential found at {}; store one with the auth command",
                path.display()
            ))
        } else {
            io_error(&path, source)
        }
    })?;

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!(
            "credential file {} is empty; delete it and store a new one",
            path.display()
        )));
    }

    Ok(trimmed.to_owned())
}

/// Encodes and stores a basic-auth credential.
///
/// The file is created with owner-read-only permissions and the call refuses
/// to overwrite an existing credential file.
///
/// # Arguments
///
/// * `dir` - Directory that will hold the credential file.
/// * `username` - Hosting account name.
/// * `token` - Personal access token; never echoed or logged.
///
/// # Errors
///
/// Returns [`Error::CredentialExists`] when a credential file is already
/// present, a validation error for empty inputs, and [`Error::Io`] for write
/// failures.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use orgpulse::store_credential;
///
/// # fn example() -> Result<(), orgpulse::Error> {
/// let path = store_credential(Path::new("."), "casey", "ghp_token")?;
/// println!("stored at {}", path.display());
/// # Ok(())
/// # }
/// ```
pub fn store_credential(dir: &Path, username: &str, token: &str) -> Result<PathBuf, Error> {
    if username.trim().is_empty() {
        return Err(Error::validation("username must not be empty"));
    }
    if token.trim().is_empty() {
        return Err(Error::validation("token must not be empty"));
    }

    let path = credential_path(dir);
    if path.exists() {
        return Err(Error::CredentialExists {
            path
        });
    }

    let encoded = STANDARD.encode(format!("{}:{}", username.trim(), token.trim()));
    fs::write(&path, format!("Basic {encoded}")).map_err(|source| io_error(&path, source))?;
    restrict_permissions(&path)?;

    info!("Credential stored at {}", path.display());
    Ok(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o400))
        .map_err(|source| io_error(path, source))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn store_writes_basic_auth_header_value() {
        let temp = tempdir().expect("failed to create tempdir");

        let path = store_credential(temp.path(), "user", "token").expect("store failed");

        let stored = fs::read_to_string(&path).expect("failed to read credential");
        assert_eq!(stored, "Basic dXNlcjp0b2tlbg==");
    }

    #[test]
    fn store_refuses_to_overwrite_existing_credential() {
        let temp = tempdir().expect("failed to create tempdir");
        store_credential(temp.path(), "user", "token").expect("first store failed");

        let error = store_credential(temp.path(), "user", "other").expect_err("expected refusal");
        assert!(matches!(error, Error::CredentialExists { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn store_creates_owner_read_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().expect("failed to create tempdir");
        let path = store_credential(temp.path(), "user", "token").expect("store failed");

        let mode = fs::metadata(&path).expect("metadata failed").permissions().mode();
        assert_eq!(mode & 0o777, 0o400);
    }

    #[test]
    fn store_rejects_empty_username() {
        let temp = tempdir().expect("failed to create tempdir");
        let error = store_credential(temp.path(), " ", "token").expect_err("expected rejection");
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn load_round_trips_stored_value() {
        let temp = tempdir().expect("failed to create tempdir");
        store_credential(temp.path(), "user", "token").expect("store failed");

        let loaded = load_credential(temp.path()).expect("load failed");
        assert_eq!(loaded, "Basic dXNlcjp0b2tlbg==");
    }

    #[test]
    fn load_reports_missing_credential_as_validation_error() {
        let temp = tempdir().expect("failed to create tempdir");

        let error = load_credential(temp.path()).expect_err("expected missing credential");
        match error {
            Error::Validation {
                message
            } => {
                assert!(message.contains("auth command"));
            }
            other => panic!("unexpected error variant: {other:?}")
        }
    }

    #[test]
    fn load_rejects_empty_credential_file() {
        let temp = tempdir().expect("failed to create tempdir");
        fs::write(credential_path(temp.path()), "  \n").expect("failed to seed file");

        let error = load_credential(temp.path()).expect_err("expected empty-file rejection");
        assert!(matches!(error, Error::Validation { .. }));
    }
}
