// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

/// Contributor ranking for repository summaries.
///
/// Fetches the contributor listing including anonymous contributors and
/// maps it into ranked entries. The hosting API already orders the listing
/// by descending commit count, so no local re-sorting happens.
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    client::{ApiClient, Transport},
    error::Error,
    model::ContributorEntry
};

#[derive(Debug, Deserialize)]
struct ContributorPayload {
    #[serde(default)]
    login:         Option<String>,
    #[serde(default)]
    name:          Option<String>,
    #[serde(default)]
    contributions: u64
}

/// Fetches the ranked contributor list for one repository.
///
/// Anonymous contributors appear under their display name; entries with
/// neither login nor name are labeled "anonymous". An absent listing yields
/// an empty sequence, never an error.
///
/// # Arguments
///
/// * `client` - Authenticated hosting API client.
/// * `organization` - Repository owner.
/// * `repository` - Repository name.
///
/// # Errors
///
/// Only connection failures propagate.
pub async fn fetch_contributors<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    repository: &str
) -> Result<Vec<ContributorEntry>, Error> {
    debug!("Fetching contributors for {}/{}", organization, repository);

    let url = client.contributors_url(organization, repository);
    let Some(payload) = client.fetch(&url).await? else {
        debug!("No contributor data for {}/{}", organization, repository);
        return Ok(Vec::new());
    };

    let raw: Vec<ContributorPayload> = match serde_json::from_value(payload) {
        Ok(raw) => raw,
        Err(error) => {
            debug!("Unreadable contributors for {}/{}: {}", organization, repository, error);
            return Ok(Vec::new());
        }
    };

    let entries: Vec<ContributorEntry> = raw
        .into_iter()
        .map(|contributor| ContributorEntry {
            name:          contributor
                .login
                .or(contributor.name)
                .unwrap_or_else(|| "anonymous".to_owned()),
            contributions: contributor.contributions
        })
        .collect();

    info!("Found {} contributors for {}/{}", entries.len(), organization, repository);
    Ok(entries)
}
