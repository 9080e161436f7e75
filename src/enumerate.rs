// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Organization repository enumeration and base metadata mapping.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    client::{ApiClient, Transport},
    error::Error,
    model::{IssueStats, RepositorySummary, VersionFacts}
};

/// Hosting API maximum for the `per_page` query parameter.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Repository visibility filter applied during enumeration.
///
/// Limiting the listing to public repositories keeps private organization
/// information out of reports that are meant to be published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Public repositories only.
    Public,
    /// Public and private repositories.
    All
}

impl Visibility {
    pub(crate) fn as_repo_type(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::All => "all"
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_repo_type())
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryName {
    name: String
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name:              String,
    html_url:          String,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    forks_count:       u64,
    #[serde(default)]
    stargazers_count:  u64,
    #[serde(default)]
    archived:          bool,
    #[serde(default)]
    license:           Option<LicensePayload>
}

#[derive(Debug, Deserialize)]
struct LicensePayload {
    name: Option<String>
}

/// Lists the names of all repositories in an organization.
///
/// # Arguments
///
/// * `client` - Authenticated hosting API client.
/// * `organization` - Organization to enumerate.
/// * `visibility` - Visibility filter applied to the listing.
/// * `page_size` - Requested page size; values above the hosting API maximum
///   are clamped to [`MAX_PAGE_SIZE`].
///
/// # Errors
///
/// Fails fast with a validation error for an empty organization name or a
/// zero page size, and with [`Error::NoRepositories`] when the lookup
/// returns no data or an empty collection.
pub async fn list_repositories<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    visibility: Visibility,
    page_size: u8
) -> Result<Vec<String>, Error> {
    let organization = organization.trim();
    if organization.is_empty() {
        return Err(Error::validation("organization name must not be empty"));
    }
    if page_size == 0 {
        return Err(Error::validation("page size must be at least 1"));
    }

    let page_size = page_size.min(MAX_PAGE_SIZE);
    info!("Getting list of {} repos for {}", visibility, organization);

    let url = client.org_repositories_url(organization, visibility.as_repo_type(), page_size);
    let payload = client.fetch(&url).await?.ok_or_else(|| Error::NoRepositories {
        organization: organization.to_owned()
    })?;

    let entries: Vec<RepositoryName> = serde_json::from_value(payload)
        .map_err(|error| Error::service(format!("unexpected repository listing: {error}")))?;

    if entries.is_empty() {
        return Err(Error::NoRepositories {
            organization: organization.to_owned()
        });
    }

    Ok(entries.into_iter().map(|entry| entry.name).collect())
}

/// Fetches base metadata for one repository and maps it into a summary
/// record awaiting enrichment.
///
/// Returns `None` when the repository metadata is unavailable; the caller
/// decides whether to degrade to a placeholder row.
///
/// # Errors
///
/// Propagates connection failures from the client.
pub async fn fetch_repository<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    name: &str
) -> Result<Option<RepositorySummary>, Error> {
    let url = client.repository_url(organization, name);
    let Some(payload) = client.fetch(&url).await? else {
        return Ok(None);
    };

    let raw: RepositoryPayload = match serde_json::from_value(payload) {
        Ok(raw) => raw,
        Err(error) => {
            debug!("Unreadable metadata for {}/{}: {}", organization, name, error);
            return Ok(None);
        }
    };

    Ok(Some(RepositorySummary {
        name:         raw.name,
        organization: organization.to_owned(),
        html_url:     raw.html_url,
        open_issues:  raw.open_issues_count,
        forks:        raw.forks_count,
        stars:        raw.stargazers_count,
        license:      raw.license.and_then(|license| license.name),
        archived:     raw.archived,
        version:      VersionFacts::Unknown,
        contributors: Vec::new(),
        statistics:   IssueStats::default(),
        docs_badge:   None,
        memberships:  Vec::new()
    }))
}
