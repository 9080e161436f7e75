// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Distribution-list membership flags.
//!
//! A distribution list is a curated package list maintained as a repository
//! whose top-level contents listing names the member packages. Membership is
//! an exact repository-name match against that roster.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    client::{ApiClient, Transport},
    error::Error
};

/// Named, externally maintained package list consulted for membership flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionList {
    /// Label shown as the membership column header.
    pub label:      String,
    /// Owner of the list repository.
    pub owner:      String,
    /// Name of the list repository.
    pub repository: String
}

impl DistributionList {
    /// Parses a `label=owner/repo` descriptor.
    ///
    /// # Errors
    ///
    /// Returns a validation error for descriptors that do not match the
    /// expected form or contain empty components.
    ///
    /// # Example
    ///
    /// ```
    /// use orgpulse::DistributionList;
    ///
    /// let list = DistributionList::parse("stable=astroconda/astroconda-contrib")
    ///     .expect("valid descriptor");
    /// assert_eq!(list.label, "stable");
    /// assert_eq!(list.owner, "astroconda");
    /// assert_eq!(list.repository, "astroconda-contrib");
    /// ```
    pub fn parse(descriptor: &str) -> Result<Self, Error> {
        let malformed = || {
            Error::validation(format!(
                "distribution list '{descriptor}' must use the label=owner/repo form"
            ))
        };

        let (label, remainder) = descriptor.split_once('=').ok_or_else(malformed)?;
        let (owner, repository) = remainder.split_once('/').ok_or_else(malformed)?;

        let label = label.trim();
        let owner = owner.trim();
        let repository = repository.trim();
        if label.is_empty() || owner.is_empty() || repository.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            label:      label.to_owned(),
            owner:      owner.to_owned(),
            repository: repository.to_owned()
        })
    }
}

impl FromStr for DistributionList {
    type Err = Error;

    fn from_str(descriptor: &str) -> Result<Self, Self::Err> {
        Self::parse(descriptor)
    }
}

impl std::fmt::Display for DistributionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}/{}", self.label, self.owner, self.repository)
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(default)]
    html_url: Option<String>
}

/// Fetches the member names of a distribution list.
///
/// The roster is the list repository's top-level contents listing; each
/// entry's terminal path segment is a member package name. An unavailable
/// roster yields `None` so the caller can default the flag rather than
/// abort the run.
///
/// # Errors
///
/// Only connection failures propagate.
pub async fn fetch_roster<T: Transport>(
    client: &ApiClient<T>,
    list: &DistributionList
) -> Result<Option<Vec<String>>, Error> {
    debug!("Fetching membership roster {}", list);

    let url = client.contents_url(&list.owner, &list.repository, "");
    let Some(payload) = client.fetch(&url).await? else {
        warn!("Membership roster {} is unavailable", list);
        return Ok(None);
    };

    let entries: Vec<ContentEntry> = match serde_json::from_value(payload) {
        Ok(entries) => entries,
        Err(error) => {
            warn!("Unreadable membership roster {}: {}", list, error);
            return Ok(None);
        }
    };

    let names = entries
        .iter()
        .filter_map(|entry| entry.html_url.as_deref())
        .filter_map(|url| url.rsplit('/').next())
        .map(str::to_owned)
        .collect();

    Ok(Some(names))
}

/// Whether a repository name appears in a roster, by exact match.
pub fn is_member(name: &str, roster: &[String]) -> bool {
    roster.iter().any(|entry| entry == name)
}
