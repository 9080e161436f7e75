// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Typed report entities produced by the aggregation pipeline.
//!
//! Every value the hosting API may omit is modeled as an explicit
//! present-or-absent field instead of exception-driven defaulting. The
//! entities serialize with serde so a finished report can be dumped to a
//! JSON snapshot and reloaded for offline re-rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder rendered for facts the hosting API could not provide.
pub const PLACEHOLDER: &str = "N/A";

/// Fields shared by every populated current-state variant.
///
/// Releases, tags, and commits all surface a display label, an author, an
/// optional profile link, an optional timestamp, and a free-text description
/// (release notes or the underlying commit message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDetails {
    /// Display label: release name, tag name, or "latest commit".
    pub label:        String,
    /// Author login, or the raw commit-author name when unassociated.
    pub author:       String,
    /// Profile URL for the author; absent for unassociated authors.
    pub author_url:   Option<String>,
    /// Publish or commit timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Release notes body or commit message, raw markup.
    pub description:  String
}

/// Best-effort current state of a repository.
///
/// Exactly one variant is populated by the fact finder, preferring the most
/// curated signal available: a release beats a tag, a tag beats a bare
/// commit. `Unknown` stands in when the repository exposes none of the three.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "details", rename_all = "snake_case")]
pub enum VersionFacts {
    /// Curated release published through the hosting UI or API.
    Release(VersionDetails),
    /// Newest tag, dated through its associated commit.
    Tag(VersionDetails),
    /// Latest commit on the default branch.
    Commit(VersionDetails),
    /// The repository has no release, tag, or commit data.
    Unknown
}

impl VersionFacts {
    /// Display label for the current state, or the placeholder.
    pub fn label(&self) -> &str {
        self.details().map_or(PLACEHOLDER, |details| details.label.as_str())
    }

    /// Author login or raw name, or the placeholder.
    pub fn author(&self) -> &str {
        self.details().map_or(PLACEHOLDER, |details| details.author.as_str())
    }

    /// Author profile URL when the author has an account association.
    pub fn author_url(&self) -> Option<&str> {
        self.details().and_then(|details| details.author_url.as_deref())
    }

    /// Publish or commit timestamp when one is known.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.details().and_then(|details| details.published_at)
    }

    /// Raw description markup; empty for `Unknown`.
    pub fn description(&self) -> &str {
        self.details().map_or("", |details| details.description.as_str())
    }

    fn details(&self) -> Option<&VersionDetails> {
        match self {
            Self::Release(details) | Self::Tag(details) | Self::Commit(details) => Some(details),
            Self::Unknown => None
        }
    }
}

/// Single entry in a repository's contributor ranking.
///
/// The sequence order comes straight from the hosting API, which returns
/// contributors in descending commit-count order; it is never re-sorted
/// locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorEntry {
    /// Login when the contributor has an account, display name otherwise.
    pub name:          String,
    /// Total commits attributed to the contributor.
    pub contributions: u64
}

impl std::fmt::Display for ContributorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.contributions)
    }
}

/// Derived issue, pull-request, and commit-activity aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueStats {
    /// Total closed entries in the mixed issue/PR listing.
    pub closed_count:           u64,
    /// Average days from creation to close, pull requests excluded.
    pub average_issue_age_days: f64,
    /// Entries closed within the last 7 days, pull requests included.
    pub closed_last_week:       u64,
    /// Entries closed within the last 30 days, pull requests included.
    pub closed_last_month:      u64,
    /// Currently open pull requests.
    pub open_pulls:             u64,
    /// Commits recorded in the most recent participation week.
    pub commits_last_week:      u64,
    /// Commits summed over the four most recent participation weeks.
    pub commits_last_month:     u64
}

/// Membership verdict against one named distribution list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipFlag {
    /// Label of the distribution list that was consulted.
    pub label:  String,
    /// Whether the repository name appears in the list.
    pub member: bool
}

/// One aggregated record per repository.
///
/// Created from the base metadata payload, then enriched in place by the
/// fact finder and statistics calculator before the aggregator hands the
/// finished record to the renderer. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Repository name within the organization.
    pub name:         String,
    /// Organization that owns the repository.
    pub organization: String,
    /// Hosting URL of the repository.
    pub html_url:     String,
    /// Open issue count reported by the base metadata.
    pub open_issues:  u64,
    /// Fork count.
    pub forks:        u64,
    /// Star count.
    pub stars:        u64,
    /// License name when one was detected.
    pub license:      Option<String>,
    /// Whether the repository is archived.
    pub archived:     bool,
    /// Best-effort current state (release, tag, or commit).
    pub version:      VersionFacts,
    /// Contributor ranking in hosting-API order.
    pub contributors: Vec<ContributorEntry>,
    /// Derived issue and commit-activity aggregates.
    pub statistics:   IssueStats,
    /// Documentation badge URL scraped from the README, when found.
    pub docs_badge:   Option<String>,
    /// Membership verdicts for the configured distribution lists.
    pub memberships:  Vec<MembershipFlag>
}

impl RepositorySummary {
    /// Builds an empty record for a repository whose base metadata could not
    /// be fetched, so the gap is visible in the report instead of the row
    /// being dropped.
    pub fn placeholder(organization: &str, name: &str) -> Self {
        Self {
            name:         name.to_owned(),
            organization: organization.to_owned(),
            html_url:     format!("https://github.com/{organization}/{name}"),
            open_issues:  0,
            forks:        0,
            stars:        0,
            license:      None,
            archived:     false,
            version:      VersionFacts::Unknown,
            contributors: Vec::new(),
            statistics:   IssueStats::default(),
            docs_badge:   None,
            memberships:  Vec::new()
        }
    }
}

/// Final ordered sequence of enriched repository records.
///
/// This is the sole artifact handed to the report renderer and the snapshot
/// writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationReport {
    /// Organization the report covers.
    pub organization: String,
    /// Instant the aggregation ran, also shown in the report footer.
    pub generated_at: DateTime<Utc>,
    /// Per-repository records in enumeration order.
    pub repositories: Vec<RepositorySummary>
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn sample_details() -> VersionDetails {
        VersionDetails {
            label:        "v1.2.0".to_owned(),
            author:       "casey".to_owned(),
            author_url:   Some("https://github.com/casey".to_owned()),
            published_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            description:  "**notes**".to_owned()
        }
    }

    #[test]
    fn release_variant_exposes_details() {
        let facts = VersionFacts::Release(sample_details());
        assert_eq!(facts.label(), "v1.2.0");
        assert_eq!(facts.author(), "casey");
        assert_eq!(facts.author_url(), Some("https://github.com/casey"));
        assert!(facts.published_at().is_some());
        assert_eq!(facts.description(), "**notes**");
    }

    #[test]
    fn unknown_variant_reports_placeholders() {
        let facts = VersionFacts::Unknown;
        assert_eq!(facts.label(), PLACEHOLDER);
        assert_eq!(facts.author(), PLACEHOLDER);
        assert!(facts.author_url().is_none());
        assert!(facts.published_at().is_none());
        assert_eq!(facts.description(), "");
    }

    #[test]
    fn version_facts_round_trip_preserves_variant() {
        let facts = VersionFacts::Tag(sample_details());
        let json = serde_json::to_string(&facts).expect("serialization failed");
        assert!(json.contains("\"kind\":\"tag\""));

        let restored: VersionFacts = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(facts, restored);
    }

    #[test]
    fn contributor_entry_display_format() {
        let entry = ContributorEntry {
            name:          "casey".to_owned(),
            contributions: 42
        };
        assert_eq!(entry.to_string(), "casey: 42");
    }

    #[test]
    fn placeholder_summary_points_at_hosting_url() {
        let summary = RepositorySummary::placeholder("acme", "widget");
        assert_eq!(summary.html_url, "https://github.com/acme/widget");
        assert_eq!(summary.version, VersionFacts::Unknown);
        assert!(summary.contributors.is_empty());
        assert_eq!(summary.statistics, IssueStats::default());
    }

    #[test]
    fn issue_stats_default_is_all_zero() {
        let stats = IssueStats::default();
        assert_eq!(stats.closed_count, 0);
        assert_eq!(stats.average_issue_age_days, 0.0);
        assert_eq!(stats.open_pulls, 0);
        assert_eq!(stats.commits_last_month, 0);
    }
}
