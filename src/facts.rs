// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Per-repository current-state fact finding.
//!
//! Signals are consulted in strict priority order: a published release is
//! definitive; otherwise the newest tag (dated through its commit) stands
//! in; otherwise the latest commit on the default branch; otherwise the
//! state is unknown. Whatever the latest-release endpoint answers is taken
//! at face value, drafts and prereleases included.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::{
    client::{ApiClient, Transport},
    error::Error,
    model::{PLACEHOLDER, VersionDetails, VersionFacts}
};

#[derive(Debug, Deserialize)]
struct ReleasePayload {
    name:       Option<String>,
    tag_name:   Option<String>,
    created_at: Option<DateTime<Utc>>,
    body:       Option<String>,
    author:     Option<AccountPayload>
}

#[derive(Debug, Deserialize)]
struct AccountPayload {
    login:    String,
    html_url: Option<String>
}

#[derive(Debug, Deserialize)]
struct TagPayload {
    name:   String,
    commit: TagCommitPayload
}

#[derive(Debug, Deserialize)]
struct TagCommitPayload {
    url: String
}

#[derive(Debug, Deserialize)]
struct CommitPayload {
    commit: CommitDetailsPayload,
    #[serde(default)]
    author: Option<AccountPayload>
}

#[derive(Debug, Deserialize)]
struct CommitDetailsPayload {
    #[serde(default)]
    author:  Option<CommitAuthorPayload>,
    #[serde(default)]
    message: Option<String>
}

#[derive(Debug, Deserialize)]
struct CommitAuthorPayload {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>
}

/// Establishes the best-effort current state of one repository.
///
/// # Arguments
///
/// * `client` - Authenticated hosting API client.
/// * `organization` - Repository owner.
/// * `repository` - Repository name.
///
/// # Errors
///
/// Only connection failures propagate; every "no data" answer from the
/// hosting API drives the fallback chain instead.
///
/// # Example
///
/// ```no_run
/// use orgpulse::{ApiClient, find_version_facts};
///
/// # async fn example() -> Result<(), orgpulse::Error> {
/// let client = ApiClient::new("Basic dXNlcjp0b2tlbg==");
/// let facts = find_version_facts(&client, "acme", "widget").await?;
/// println!("current state: {}", facts.label());
/// # Ok(())
/// # }
/// ```
pub async fn find_version_facts<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    repository: &str
) -> Result<VersionFacts, Error> {
    if let Some(details) = fetch_latest_release(client, organization, repository).await? {
        return Ok(VersionFacts::Release(details));
    }

    if let Some(details) = resolve_newest_tag(client, organization, repository).await? {
        return Ok(VersionFacts::Tag(details));
    }

    if let Some(details) = fetch_latest_commit(client, organization, repository).await? {
        return Ok(VersionFacts::Commit(details));
    }

    debug!("No release, tag, or commit data for {}/{}", organization, repository);
    Ok(VersionFacts::Unknown)
}

async fn fetch_latest_release<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    repository: &str
) -> Result<Option<VersionDetails>, Error> {
    let url = client.latest_release_url(organization, repository);
    let Some(payload) = client.fetch(&url).await? else {
        return Ok(None);
    };

    let raw: ReleasePayload = match serde_json::from_value(payload) {
        Ok(raw) => raw,
        Err(error) => {
            debug!("Unreadable release for {}/{}: {}", organization, repository, error);
            return Ok(None);
        }
    };

    let label = raw
        .name
        .filter(|name| !name.trim().is_empty())
        .or(raw.tag_name)
        .unwrap_or_else(|| PLACEHOLDER.to_owned());
    let (author, author_url) = match raw.author {
        Some(account) => (account.login, account.html_url),
        None => (PLACEHOLDER.to_owned(), None)
    };

    Ok(Some(VersionDetails {
        label,
        author,
        author_url,
        published_at: raw.created_at,
        description: raw.body.unwrap_or_default()
    }))
}

async fn resolve_newest_tag<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    repository: &str
) -> Result<Option<VersionDetails>, Error> {
    let url = client.tags_url(organization, repository);
    let Some(payload) = client.fetch(&url).await? else {
        return Ok(None);
    };

    let tags: Vec<TagPayload> = match serde_json::from_value(payload) {
        Ok(tags) => tags,
        Err(error) => {
            debug!("Unreadable tags for {}/{}: {}", organization, repository, error);
            return Ok(None);
        }
    };
    if tags.is_empty() {
        return Ok(None);
    }

    // Tags arrive unordered and without dates; each one is dated through its
    // associated commit before the newest is selected.
    let mut dated = Vec::with_capacity(tags.len());
    for tag in tags {
        let commit = match client.fetch(&tag.commit.url).await? {
            Some(value) => serde_json::from_value::<CommitPayload>(value).ok(),
            None => None
        };
        dated.push((tag.name, commit));
    }

    // Stable ascending sort; tags without a resolvable timestamp sort first
    // and upstream order breaks ties.
    dated.sort_by_key(|(_, commit)| commit.as_ref().and_then(commit_timestamp));

    let Some((name, commit)) = dated.pop() else {
        return Ok(None);
    };

    Ok(Some(match commit {
        Some(commit) => commit_details(name, &commit),
        None => VersionDetails {
            label:        name,
            author:       PLACEHOLDER.to_owned(),
            author_url:   None,
            published_at: None,
            description:  String::new()
        }
    }))
}

async fn fetch_latest_commit<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    repository: &str
) -> Result<Option<VersionDetails>, Error> {
    let url = client.commits_url(organization, repository);
    let Some(payload) = client.fetch(&url).await? else {
        return Ok(None);
    };

    let mut commits: Vec<CommitPayload> = match serde_json::from_value(payload) {
        Ok(commits) => commits,
        Err(error) => {
            debug!("Unreadable commits for {}/{}: {}", organization, repository, error);
            return Ok(None);
        }
    };
    if commits.is_empty() {
        return Ok(None);
    }

    let latest = commits.remove(0);
    Ok(Some(commit_details("latest commit".to_owned(), &latest)))
}

fn commit_timestamp(commit: &CommitPayload) -> Option<DateTime<Utc>> {
    commit.commit.author.as_ref().and_then(|author| author.date)
}

/// Extracts display facts from a commit payload.
///
/// Account-associated commits carry a login and profile URL; unassociated
/// commits fall back to the raw commit-author name with no profile link.
fn commit_details(label: String, payload: &CommitPayload) -> VersionDetails {
    let (author, author_url) = match &payload.author {
        Some(account) => (account.login.clone(), account.html_url.clone()),
        None => (
            payload
                .commit
                .author
                .as_ref()
                .and_then(|author| author.name.clone())
                .unwrap_or_else(|| PLACEHOLDER.to_owned()),
            None
        )
    };

    VersionDetails {
        label,
        author,
        author_url,
        published_at: commit_timestamp(payload),
        description: payload.commit.message.clone().unwrap_or_default()
    }
}
