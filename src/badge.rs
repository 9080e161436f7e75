// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Documentation badge lookup.
//!
//! Best-effort scan of a repository's README for a documentation-host badge
//! URL. The first README candidate that decodes is scanned once; any
//! failure along the way simply reports the badge as absent.

use std::sync::LazyLock;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::{
    client::{ApiClient, Transport},
    error::Error
};

const README_CANDIDATES: [&str; 4] = ["README", "README.md", "README.rst", "README.txt"];

static DOCS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://readthedocs.*version=\w+").expect("valid docs badge pattern")
});

#[derive(Debug, Deserialize)]
struct ContentsPayload {
    #[serde(default)]
    content: String
}

/// Scans known README filenames for a documentation badge URL.
///
/// Returns the first matching URL from the first README candidate that can
/// be fetched and decoded, or `None` when no candidate yields one.
///
/// # Errors
///
/// Only connection failures propagate.
pub async fn find_docs_badge<T: Transport>(
    client: &ApiClient<T>,
    organization: &str,
    repository: &str
) -> Result<Option<String>, Error> {
    for candidate in README_CANDIDATES {
        let url = client.contents_url(organization, repository, candidate);
        let Some(payload) = client.fetch(&url).await? else {
            continue;
        };

        let Ok(contents) = serde_json::from_value::<ContentsPayload>(payload) else {
            continue;
        };
        let Some(text) = decode_content(&contents.content) else {
            continue;
        };

        // One readable README is scanned once; later candidates are not
        // consulted even when no badge turns up.
        let badge = scan_for_docs_url(&text);
        if badge.is_none() {
            debug!("No docs badge in {} for {}/{}", candidate, organization, repository);
        }
        return Ok(badge);
    }

    Ok(None)
}

/// Decodes a base64 contents payload, tolerating the line wrapping the
/// hosting API inserts.
fn decode_content(encoded: &str) -> Option<String> {
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(cleaned).ok()?;
    String::from_utf8(bytes).ok()
}

fn scan_for_docs_url(text: &str) -> Option<String> {
    DOCS_URL.find(text).map(|found| found.as_str().to_owned())
}
