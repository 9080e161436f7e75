// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Utilities for summarizing repository health across an organization.
//!
//! The library queries a hosting API for every repository in an
//! organization, establishes each repository's best-effort current state
//! (release, tag, or last commit), derives issue-aging and commit-velocity
//! statistics, and renders the enriched records into one sortable HTML
//! summary page. All public APIs are documented with invariants, error
//! semantics, and minimal examples to facilitate integration in automation
//! tooling.

mod aggregate;
mod auth;
mod badge;
mod client;
mod contributors;
mod enumerate;
mod error;
mod facts;
mod membership;
mod model;
mod render;
mod snapshot;
mod stats;

pub use aggregate::{AggregateOptions, aggregate_organization};
pub use auth::{CREDENTIAL_FILE, credential_path, load_credential, store_credential};
pub use badge::find_docs_badge;
pub use client::{API_BASE, ApiClient, HttpTransport, RawResponse, Transport};
pub use contributors::fetch_contributors;
pub use enumerate::{MAX_PAGE_SIZE, Visibility, fetch_repository, list_repositories};
pub use error::{Error, io_error};
pub use facts::find_version_facts;
pub use membership::{DistributionList, fetch_roster, is_member};
pub use model::{
    ContributorEntry, IssueStats, MembershipFlag, OrganizationReport, PLACEHOLDER,
    RepositorySummary, VersionDetails, VersionFacts
};
pub use render::{markdown_to_html, render_report, write_report};
pub use snapshot::{read_snapshot, write_snapshot};
pub use stats::{IssueRecord, compute_statistics, fetch_statistics};
