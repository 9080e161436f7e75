// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Issue, pull-request, and commit-activity statistics.
//!
//! The hosting API mixes pull requests into the issue listing; entries
//! carrying the pull-request marker are excluded from resolution-time
//! averaging but still count toward the closed-last-week and
//! closed-last-month totals the operator sees elsewhere in the hosting UI.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    client::{ApiClient, Transport},
    error::Error,
    model::IssueStats
};

const SECONDS_PER_DAY: f64 = 3600.0 * 24.0;

/// One entry from the mixed issue/pull-request listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Issue state, `open` or `closed`.
    #[serde(default)]
    pub state:        String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at:   Option<DateTime<Utc>>,
    /// Close timestamp; absent while the issue is open.
    #[serde(default)]
    pub closed_at:    Option<DateTime<Utc>>,
    /// Pull-request marker; its presence identifies the entry as a PR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<Value>
}

impl IssueRecord {
    fn is_closed(&self) -> bool {
        self.state == "closed"
    }

    fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct ParticipationPayload {
    #[serde(default)]
    all: Vec<u64>
}

/// Derives issue aging and recent-activity aggregates.
///
/// # Arguments
///
/// * `weekly_commits` - Weekly commit-count series, oldest first; absent or
///   empty series yields zero commit totals.
/// * `open_pulls` - Number of open pull requests, when known.
/// * `issues` - Mixed issue/pull-request listing.
/// * `now` - Reference instant for the 7- and 30-day windows.
///
/// The resolution-time average is 0 when no qualifying closed issue exists;
/// there is never a division by zero. The weekly commit total is the final
/// series entry and the monthly total is the sum of the final four entries.
pub fn compute_statistics(
    weekly_commits: Option<&[u64]>,
    open_pulls: Option<usize>,
    issues: &[IssueRecord],
    now: DateTime<Utc>
) -> IssueStats {
    let closed: Vec<&IssueRecord> = issues.iter().filter(|issue| issue.is_closed()).collect();

    let mut total_seconds = 0_i64;
    let mut counted = 0_u64;
    for issue in closed.iter().filter(|issue| !issue.is_pull_request()) {
        if let (Some(created), Some(resolved)) = (issue.created_at, issue.closed_at) {
            total_seconds += (resolved - created).num_seconds();
            counted += 1;
        }
    }
    let average_issue_age_days = if counted == 0 {
        0.0
    } else {
        total_seconds as f64 / (SECONDS_PER_DAY * counted as f64)
    };

    let week_cutoff = now - Duration::days(7);
    let month_cutoff = now - Duration::days(30);
    let closed_last_week =
        closed.iter().filter(|issue| issue.closed_at.is_some_and(|at| at > week_cutoff)).count()
            as u64;
    let closed_last_month =
        closed.iter().filter(|issue| issue.closed_at.is_some_and(|at| at > month_cutoff)).count()
            as u64;

    let (commits_last_week, commits_last_month) = match weekly_commits {
        Some(series) if !series.is_empty() => (
            series.last().copied().unwrap_or(0),
            series.iter().rev().take(4).sum()
        ),
        _ => (0, 0)
    };

    IssueStats {
        closed_count: closed.len() as u64,
        average_issue_age_days,
        closed_last_week,
        closed_last_month,
        open_pulls: open_pulls.unwrap_or(0) as u64,
        commits_last_week,
        commits_last_month
    }
}

/// Fetches the statistics inputs for one repository and derives the
/// aggregates.
///
/// Every input is optional upstream; whatever is absent contributes its
/// defined zero default instead of failing the repository.
///
/// # Errors
///
/// Only connection failures propagate.
pub async fn fetch_statistics<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    repository: &str,
    now: DateTime<Utc>
) -> Result<IssueStats, Error> {
    debug!("Fetching pulse statistics for {}/{}", organization, repository);

    let weekly = match client.fetch(&client.participation_url(organization, repository)).await? {
        Some(value) => serde_json::from_value::<ParticipationPayload>(value)
            .ok()
            .map(|payload| payload.all),
        None => None
    };

    let open_pulls = match client.fetch(&client.open_pulls_url(organization, repository)).await? {
        Some(Value::Array(items)) => Some(items.len()),
        _ => None
    };

    let issues: Vec<IssueRecord> =
        match client.fetch(&client.issues_url(organization, repository)).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(issues) => issues,
                Err(error) => {
                    warn!(
                        "Discarding unreadable issue listing for {}/{}: {}",
                        organization, repository, error
                    );
                    Vec::new()
                }
            },
            None => Vec::new()
        };

    Ok(compute_statistics(weekly.as_deref(), open_pulls, &issues, now))
}
