// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Organization-wide aggregation pipeline.
//!
//! Drives enumeration, per-repository fact finding, statistics, the docs
//! badge lookup, and membership flags, sequentially in enumeration order.
//! Optional enrichments degrade to placeholder defaults; only an
//! organization-level enumeration failure or a connection failure aborts
//! the run.

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::{
    badge::find_docs_badge,
    client::{ApiClient, Transport},
    contributors::fetch_contributors,
    enumerate::{Visibility, fetch_repository, list_repositories},
    error::Error,
    facts::find_version_facts,
    membership::{DistributionList, fetch_roster, is_member},
    model::{MembershipFlag, OrganizationReport, RepositorySummary},
    stats::fetch_statistics
};

/// Inputs controlling one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Organization whose repositories are summarized.
    pub organization:       String,
    /// Explicit repository list; skips enumeration entirely when present
    /// and is used verbatim without existence validation.
    pub repositories:       Option<Vec<String>>,
    /// Visibility filter applied during enumeration.
    pub visibility:         Visibility,
    /// Requested listing page size, clamped to the hosting API maximum.
    pub page_size:          u8,
    /// Named membership lists attached to every record.
    pub distribution_lists: Vec<DistributionList>
}

impl AggregateOptions {
    /// Creates options with the defaults the CLI uses: public visibility,
    /// maximum page size, no distribution lists.
    pub fn new<O>(organization: O) -> Self
    where
        O: Into<String>
    {
        Self {
            organization:       organization.into(),
            repositories:       None,
            visibility:         Visibility::Public,
            page_size:          100,
            distribution_lists: Vec::new()
        }
    }

    /// Checks every precondition before any network activity.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty organization name, a zero
    /// page size, or an explicit repository list that is empty or contains
    /// blank names.
    pub fn validate(&self) -> Result<(), Error> {
        if self.organization.trim().is_empty() {
            return Err(Error::validation("organization name must not be empty"));
        }
        if self.page_size == 0 {
            return Err(Error::validation("page size must be at least 1"));
        }

        if let Some(repositories) = &self.repositories {
            if repositories.is_empty() {
                return Err(Error::validation("explicit repository list must not be empty"));
            }
            if repositories.iter().any(|name| name.trim().is_empty()) {
                return Err(Error::validation("repository names must not be blank"));
            }
        }

        Ok(())
    }
}

/// Runs the full aggregation pipeline and returns the enriched records in
/// enumeration order.
///
/// # Errors
///
/// Fails fast on invalid options, and aborts on connection failures or when
/// the organization yields no repositories. Per-repository enrichment gaps
/// are reported through placeholder values instead.
///
/// # Example
///
/// ```no_run
/// use orgpulse::{AggregateOptions, ApiClient, aggregate_organization};
///
/// # async fn example() -> Result<(), orgpulse::Error> {
/// let client = ApiClient::new("Basic dXNlcjp0b2tlbg==");
/// let report = aggregate_organization(&client, &AggregateOptions::new("acme")).await?;
/// println!("{} repositories aggregated", report.repositories.len());
/// # Ok(())
/// # }
/// ```
pub async fn aggregate_organization<T: Transport>(
    client: &ApiClient<T>,
    options: &AggregateOptions
) -> Result<OrganizationReport, Error> {
    options.validate()?;
    let organization = options.organization.trim();

    let names = match &options.repositories {
        Some(explicit) => {
            info!("Using explicit list of {} repositories", explicit.len());
            explicit.clone()
        }
        None => {
            list_repositories(client, organization, options.visibility, options.page_size).await?
        }
    };
    info!("Found {} repositories", names.len());

    let mut rosters = Vec::with_capacity(options.distribution_lists.len());
    for list in &options.distribution_lists {
        rosters.push((list.label.clone(), fetch_roster(client, list).await?));
    }

    let progress = ProgressBar::new(names.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.yellow} [{elapsed_precise}] {bar:30} {pos}/{len} {msg}")
            .expect("valid template")
    );

    let now = Utc::now();
    let mut repositories = Vec::with_capacity(names.len());

    for name in &names {
        progress.set_message(name.clone());
        debug!("Aggregating {}/{}", organization, name);

        let mut summary = match fetch_repository(client, organization, name).await? {
            Some(summary) => summary,
            None => {
                warn!("No metadata for {}/{}; emitting placeholder row", organization, name);
                RepositorySummary::placeholder(organization, name)
            }
        };

        summary.version = find_version_facts(client, organization, name).await?;
        summary.contributors = fetch_contributors(client, organization, name).await?;
        summary.statistics = fetch_statistics(client, organization, name, now).await?;
        summary.docs_badge = find_docs_badge(client, organization, name).await?;
        summary.memberships = rosters
            .iter()
            .map(|(label, roster)| MembershipFlag {
                label:  label.clone(),
                member: roster.as_ref().is_some_and(|names| is_member(name, names))
            })
            .collect();

        repositories.push(summary);
        progress.inc(1);
    }

    progress.finish_with_message(format!("Aggregated {} repositories", repositories.len()));

    Ok(OrganizationReport {
        organization: organization.to_owned(),
        generated_at: now,
        repositories
    })
}
