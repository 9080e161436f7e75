// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! JSON snapshot of an aggregated report.
//!
//! A convenience dump for re-rendering or offline inspection, not a cache:
//! there is no invalidation, and regenerating simply replaces the file. The
//! snapshot is written read-only like the credential file so a later run
//! cannot scribble over it by accident.

use std::{fs, path::Path};

use tracing::info;

use crate::{
    error::{Error, io_error},
    model::OrganizationReport
};

/// Writes the report as pretty-printed JSON, replacing any pre-existing
/// snapshot at the same path.
///
/// # Errors
///
/// Returns [`Error::Serialize`] when encoding fails and [`Error::Io`] for
/// filesystem failures.
pub fn write_snapshot(path: &Path, report: &OrganizationReport) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(report)?;

    if path.exists() {
        fs::remove_file(path).map_err(|source| io_error(path, source))?;
    }
    fs::write(path, json).map_err(|source| io_error(path, source))?;
    restrict_permissions(path)?;

    info!("Snapshot written to {}", path.display());
    Ok(())
}

/// Reloads a report from a snapshot written by [`write_snapshot`].
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and
/// [`Error::Serialize`] when its contents do not decode.
pub fn read_snapshot(path: &Path) -> Result<OrganizationReport, Error> {
    let raw = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    Ok(serde_json::from_str(&raw)?)
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
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use super::*;
    use crate::model::RepositorySummary;

    fn sample_report() -> OrganizationReport {
        OrganizationReport {
            organization: "acme".to_owned(),
            generated_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            repositories: vec![RepositorySummary::placeholder("acme", "widget")]
        }
    }

    #[test]
    fn snapshot_round_trips_the_report() {
        let temp = tempdir().expect("failed to create tempdir");
        let path = temp.path().join("report.json");

        let report = sample_report();
        write_snapshot(&path, &report).expect("write failed");
        let restored = read_snapshot(&path).expect("read failed");

        assert_eq!(report, restored);
    }

    #[test]
    fn snapshot_replaces_pre_existing_file() {
        let temp = tempdir().expect("failed to create tempdir");
        let path = temp.path().join("report.json");
        write_snapshot(&path, &sample_report()).expect("first write failed");

        let mut updated = sample_report();
        updated.repositories.push(RepositorySummary::placeholder("acme", "gadget"));
        write_snapshot(&path, &updated).expect("second write failed");

        let restored = read_snapshot(&path).expect("read failed");
        assert_eq!(restored.repositories.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn snapshot_is_written_read_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().expect("failed to create tempdir");
        let path = temp.path().join("report.json");
        write_snapshot(&path, &sample_report()).expect("write failed");

        let mode = fs::metadata(&path).expect("metadata failed").permissions().mode();
        assert_eq!(mode & 0o777, 0o400);
    }

    #[test]
    fn read_snapshot_reports_missing_file() {
        let temp = tempdir().expect("failed to create tempdir");
        let error =
            read_snapshot(&temp.path().join("absent.json")).expect_err("expected io error");
        assert!(matches!(error, Error::Io { .. }));
    }
}
