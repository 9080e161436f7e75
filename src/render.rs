// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! HTML summary page rendering.
//!
//! A pure presentation layer: it consumes the finished
//! [`OrganizationReport`] and produces one self-contained page with a
//! client-side sortable table. Release notes and commit messages are
//! rendered from markdown here, not during aggregation, so the aggregated
//! records stay raw and snapshot-friendly.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    error::{Error, io_error},
    model::{ContributorEntry, OrganizationReport, PLACEHOLDER, RepositorySummary}
};

const PAGE_HEADER: &str = r#"<html>
<head>
 <title>Made by orgpulse</title>
 <meta name="viewport" charset="utf-8" content="width=device-width, initial-scale=1.0">
 <style type="text/css">
    table
    {
        width: 1200px;
        border-collapse: collapse;
    }

    thead
    {
        width: 1200px;
        overflow: auto;
        color: #fff;
        background: #000;
    }
    tbody
    {
        overflow: auto;
    }
    th,td
    {
        padding: .5em 1em;
        text-align: left;
        vertical-align: top;
        border-left: 1px solid #fff;
    }
    .cssHeaderRow {
        background-color: #2A94D6;
        top: 10px;
        overflow: auto;
    }
    .cssHeaderCell {
        color: #FFFFFF;
        background-color: #2A94D6;
        font-size: 14px;
        padding: 6px !important;
        border: solid 1px #FFFFFF;
    }
    .cssTableRow {
        background-color: #F0F1F2;
    }
    .cssOddTableRow {
        background-color: #F0F1F2;
    }
    .cssSelectedTableRow {
        font-size: 20px;
        font-weight: bold;
    }
    .cssHoverTableRow {
        background: #ccd;
    }
    .cssTableCell {
        font-size: 14px;
        padding: 10px !important;
        border: solid 1px #FFFFFF;
        background-color: #F0F1F2;
    }
    .cssRowNumberCell {
        text-align: center;
    }
 </style>
 <script type="text/javascript" src="https://www.google.com/jsapi"></script>
 <script type="text/javascript">
 var cssClassNames = {
            'headerRow': 'cssHeaderRow',
            'tableRow': 'cssTableRow',
            'oddTableRow': 'cssOddTableRow',
            'selectedTableRow': 'cssSelectedTableRow',
            'hoverTableRow': 'cssHoverTableRow',
            'headerCell': 'cssHeaderCell',
            'tableCell': 'cssTableCell',
            'rowNumberCell': 'cssRowNumberCell'
        };

 </script>
"#;

const PAGE_NOTES: &str = r#"</head>
<body>
<p align="center" size=10pt><strong>Click on the column header name to sort by that column </strong></p>
<br>
<p align="left" size=10pt>
<ul>
<li>If there hasn't been any release or tag then the information is taken from the last commit to that repository
<li>The issues count includes PRs because the API doesn't separate them, the avg open issue time has been corrected for this.
<li>Top contributors are listed for maintenance reference, no relation to quality or size of commits
<li>Docs badge: guesses that the docs are named after the package when the README doesn't say, 'unknown' most likely means the docs, if they exist, use another name
</ul>
</p><br>
"#;

/// Renders a markdown fragment (release notes, commit message) to HTML.
///
/// # Example
///
/// ```
/// use orgpulse::markdown_to_html;
///
/// assert_eq!(markdown_to_html("**v1**"), "<p><strong>v1</strong></p>");
/// ```
pub fn markdown_to_html(markdown: &str) -> String {
    let mut rendered = String::with_capacity(markdown.len() * 2);
    pulldown_cmark::html::push_html(&mut rendered, pulldown_cmark::Parser::new(markdown));
    rendered.trim().to_owned()
}

/// Renders the full summary page for an aggregated report.
///
/// The page embeds a client-side sortable table; every string cell passes
/// through JSON escaping before landing in the embedded script, and HTML
/// fragments are assembled from escaped components.
pub fn render_report(report: &OrganizationReport) -> String {
    let columns = column_definitions(report);

    let mut page = String::with_capacity(16 * 1024);
    page.push_str(PAGE_HEADER);

    page.push_str(
        "\n<script type=\"text/javascript\">\n\
         google.load(\"visualization\", \"1\", {packages:[\"table\"]});\n\
         google.setOnLoadCallback(drawTable);\n\
         function drawTable() {\n\
         var data = new google.visualization.DataTable();\n"
    );

    for (title, kind) in &columns {
        page.push_str(&format!("\t\tdata.addColumn({}, {});\n", js_string(kind), js_string(title)));
    }

    page.push_str("\ndata.addRows([\n");
    for repository in &report.repositories {
        page.push_str(&render_row(repository));
        page.push('\n');
    }
    page.push_str("]);\n");

    page.push_str(
        "\nvar table = new google.visualization.Table(document.getElementById(\"table_div\"));\n\
         table.draw(data, {showRowNumber: true, allowHtml: true, frozenColumns: 1,\n\
                   cssClassNames: cssClassNames, height: \"500px\"});\n\
         }\n</script>\n"
    );

    page.push_str(PAGE_NOTES);
    page.push_str(&format!(
        "Last Updated: {} GMT<br><br> <div id='table_div'></div>\n</body></html>\n",
        report.generated_at.format("%a, %d %b %Y %H:%M:%S")
    ));

    page
}

/// Writes the rendered page, replacing any pre-existing file of the same
/// name.
///
/// # Errors
///
/// Returns [`Error::Io`] when the stale file cannot be removed or the new
/// one cannot be written.
pub fn write_report(path: &Path, html: &str) -> Result<(), Error> {
    if path.exists() {
        debug!("Removing older report at {}", path.display());
        fs::remove_file(path).map_err(|source| io_error(path, source))?;
    }

    fs::write(path, html).map_err(|source| io_error(path, source))?;
    info!("Created {}", path.display());
    Ok(())
}

fn column_definitions(report: &OrganizationReport) -> Vec<(String, &'static str)> {
    let mut columns = vec![
        ("Package Name".to_owned(), "string"),
        ("Archived".to_owned(), "string"),
    ];

    if let Some(first) = report.repositories.first() {
        for flag in &first.memberships {
            columns.push((flag.label.clone(), "string"));
        }
    }

    columns.extend([
        ("Version".to_owned(), "string"),
        ("Pulse".to_owned(), "string"),
        ("Release/Tag/Commit Information".to_owned(), "string"),
        ("Last Released".to_owned(), "string"),
        ("Author".to_owned(), "string"),
        ("Top commits".to_owned(), "string"),
        ("Contributors".to_owned(), "number"),
        ("CI badge".to_owned(), "string"),
        ("Docs badge".to_owned(), "string"),
        ("Open Issues".to_owned(), "number"),
        ("Closed Last Week".to_owned(), "number"),
        ("Closed Last Month".to_owned(), "number"),
        ("Avg issue time (days)".to_owned(), "number"),
        ("Open PRs".to_owned(), "number"),
        ("Commits per week".to_owned(), "number"),
        ("Commits per month".to_owned(), "number"),
        ("Forks".to_owned(), "number"),
        ("Stars".to_owned(), "number"),
        ("License".to_owned(), "string"),
    ]);

    columns
}

fn render_row(repository: &RepositorySummary) -> String {
    let organization = &repository.organization;
    let name = &repository.name;
    let stats = &repository.statistics;

    let mut cells = vec![
        js_string(&format!(
            "<a href=\"{}\">{}</a>",
            escape_html(&repository.html_url),
            escape_html(name)
        )),
        js_string(if repository.archived { "true" } else { "false" }),
    ];

    for flag in &repository.memberships {
        cells.push(js_string(if flag.member { "true" } else { "false" }));
    }

    let version = &repository.version;
    let description = if version.description().is_empty() {
        PLACEHOLDER.to_owned()
    } else {
        markdown_to_html(version.description())
    };
    let author_cell = match version.author_url() {
        Some(url) => format!(
            "<a href=\"{}\">{}</a>",
            escape_html(url),
            escape_html(version.author())
        ),
        None => escape_html(version.author())
    };
    let docs_badge = repository.docs_badge.clone().unwrap_or_else(|| {
        format!("https://readthedocs.org/projects/{name}/badge/?version=latest")
    });

    cells.extend([
        js_string(&escape_html(version.label())),
        js_string(&format!(
            "<a href=\"https://github.com/{organization}/{name}/pulse/monthly\">Month Stats</a>\
             <br><br>\
             <a href=\"https://github.com/{organization}/{name}/pulse/weekly\">Week Stats</a>"
        )),
        js_string(&description),
        js_string(&format_timestamp(version.published_at())),
        js_string(&author_cell),
        js_string(&top_commits_cell(&repository.contributors)),
        repository.contributors.len().to_string(),
        js_string(&format!(
            "<img src=\"https://img.shields.io/travis/{organization}/{name}.svg\">"
        )),
        js_string(&format!("<img src=\"{}\">", escape_html(&docs_badge))),
        repository.open_issues.to_string(),
        stats.closed_last_week.to_string(),
        stats.closed_last_month.to_string(),
        format!("{:.2}", stats.average_issue_age_days),
        stats.open_pulls.to_string(),
        stats.commits_last_week.to_string(),
        stats.commits_last_month.to_string(),
        repository.forks.to_string(),
        repository.stars.to_string(),
        js_string(repository.license.as_deref().unwrap_or("None Found")),
    ]);

    format!("[{}],", cells.join(","))
}

fn top_commits_cell(contributors: &[ContributorEntry]) -> String {
    match contributors {
        [] => PLACEHOLDER.to_owned(),
        [first] => format!("{}: {}<br>{}: 0", escape_html(&first.name), first.contributions, PLACEHOLDER),
        [first, second, ..] => format!(
            "{}: {}<br>{}: {}",
            escape_html(&first.name),
            first.contributions,
            escape_html(&second.name),
            second.contributions
        )
    }
}

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp.map_or_else(
        || PLACEHOLDER.to_owned(),
        |at| at.format("%Y-%m-%d %H:%M:%S").to_string()
    )
}

/// Encodes arbitrary text as a JavaScript string literal safe to embed in
/// the page's inline script.
fn js_string(text: &str) -> String {
    serde_json::to_string(text)
        .unwrap_or_else(|_| "\"\"".to_owned())
        .replace("</", "<\\/")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
