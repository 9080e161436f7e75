// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Authenticated JSON client for the hosting API.
//!
//! The client is constructed once per run and passed to every fetch call,
//! carrying the credential and base URL as immutable configuration. Absent
//! data (404, the empty-repository 409 conflict, any other non-success
//! status) is reported as `None` rather than an error so the fact finder can
//! drive its fallback chain; only a connection-level failure aborts the run.
//! Paginated collections are followed transparently, so callers never see a
//! partial page.

use std::future::Future;

use reqwest::header;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Error;

/// Default hosting API root.
pub const API_BASE: &str = "https://api.github.com";

const USER_AGENT_VALUE: &str = "orgpulse";
const ACCEPT_VALUE: &str = "application/vnd.github.v3+json";

/// Minimal view of an HTTP response needed by the JSON layer.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Link` header value, when the response carried one.
    pub link:   Option<String>,
    /// Response body as text.
    pub body:   String
}

/// Transport seam between the JSON client and the network.
///
/// The production implementation is [`HttpTransport`]; tests substitute a
/// fake that serves canned responses and records issued requests.
pub trait Transport {
    /// Issues a GET request with the supplied authorization header value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] when the host cannot be reached and
    /// [`Error::Service`] for other transport-level failures. Non-success
    /// HTTP statuses are not errors; they come back in [`RawResponse`].
    fn get(
        &self,
        url: &str,
        authorization: &str
    ) -> impl Future<Output = Result<RawResponse, Error>>;
}

/// Production transport over a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    inner: reqwest::Client
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, authorization: &str) -> Result<RawResponse, Error> {
        let response = self
            .inner
            .get(url)
            .header(header::USER_AGENT, USER_AGENT_VALUE)
            .header(header::ACCEPT, ACCEPT_VALUE)
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let link = response
            .headers()
            .get(header::LINK)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.map_err(classify_transport_error)?;

        Ok(RawResponse {
            status,
            link,
            body
        })
    }
}

fn classify_transport_error(error: reqwest::Error) -> Error {
    if error.is_connect() || error.is_timeout() {
        Error::connection(format!("cannot reach hosting API: {error}"))
    } else {
        Error::service(format!("transport failure: {error}"))
    }
}

/// Authenticated JSON client bound to one hosting API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient<T = HttpTransport> {
    transport:     T,
    authorization: String,
    base_url:      String
}

impl ApiClient<HttpTransport> {
    /// Creates a client against the default hosting API using the stored
    /// credential (a pre-encoded authorization header value).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use orgpulse::ApiClient;
    ///
    /// let client = ApiClient::new("Basic dXNlcjp0b2tlbg==");
    /// ```
    pub fn new<C>(credential: C) -> Self
    where
        C: Into<String>
    {
        Self::with_transport(HttpTransport::default(), credential, API_BASE)
    }
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client with an explicit transport and base URL.
    ///
    /// Intended for substituting a fake transport in tests and for pointing
    /// the client at a non-default API host.
    pub fn with_transport<C, B>(transport: T, credential: C, base_url: B) -> Self
    where
        C: Into<String>,
        B: Into<String>
    {
        Self {
            transport,
            authorization: credential.into(),
            base_url: base_url.into()
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches a JSON payload from an absolute URL.
    ///
    /// Non-success statuses yield `Ok(None)`; the 409 conflict the hosting
    /// API uses for empty repositories is additionally logged. When the
    /// response carries pagination links and decodes to an array, all
    /// subsequent pages are fetched and concatenated before returning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] when the host is unreachable and
    /// [`Error::Service`] when a successful response fails to decode.
    pub async fn fetch(&self, url: &str) -> Result<Option<Value>, Error> {
        let response = self.transport.get(url, &self.authorization).await?;

        if !successful(response.status) {
            if response.status == 409 {
                debug!("Conflict, empty repository: {}", url);
            } else {
                debug!("No data from {} (status {})", url, response.status);
            }
            return Ok(None);
        }

        let mut payload = decode_body(url, &response.body)?;
        let mut next = response.link.as_deref().and_then(next_link);

        while let Some(page_url) = next {
            let page = self.transport.get(&page_url, &self.authorization).await?;
            if !successful(page.status) {
                warn!("Pagination stopped at {} (status {})", page_url, page.status);
                break;
            }

            let more = decode_body(&page_url, &page.body)?;
            match (payload.as_array_mut(), more) {
                (Some(items), Value::Array(additional)) => items.extend(additional),
                _ => {
                    warn!("Pagination stopped at {}: payload is not an array", page_url);
                    break;
                }
            }

            next = page.link.as_deref().and_then(next_link);
        }

        Ok(Some(payload))
    }

    /// Organization repository listing, filtered by visibility.
    pub fn org_repositories_url(&self, organization: &str, repo_type: &str, per_page: u8) -> String {
        format!(
            "{}/orgs/{}/repos?type={}&per_page={}",
            self.base_url, organization, repo_type, per_page
        )
    }

    /// Base repository metadata.
    pub fn repository_url(&self, organization: &str, repository: &str) -> String {
        format!("{}/repos/{}/{}", self.base_url, organization, repository)
    }

    /// Latest published release only.
    pub fn latest_release_url(&self, organization: &str, repository: &str) -> String {
        format!("{}/releases/latest", self.repository_url(organization, repository))
    }

    /// Tags, unordered upstream.
    pub fn tags_url(&self, organization: &str, repository: &str) -> String {
        format!("{}/tags", self.repository_url(organization, repository))
    }

    /// Commit listing, newest first.
    pub fn commits_url(&self, organization: &str, repository: &str) -> String {
        format!("{}/commits", self.repository_url(organization, repository))
    }

    /// Contributor ranking including anonymous contributors.
    pub fn contributors_url(&self, organization: &str, repository: &str) -> String {
        format!("{}/contributors?anon=1", self.repository_url(organization, repository))
    }

    /// Open pull requests.
    pub fn open_pulls_url(&self, organization: &str, repository: &str) -> String {
        format!("{}/pulls?state=open", self.repository_url(organization, repository))
    }

    /// All issues mixed with pull requests, in creation order.
    pub fn issues_url(&self, organization: &str, repository: &str) -> String {
        format!("{}/issues?state=all&sort=created", self.repository_url(organization, repository))
    }

    /// Weekly commit participation series for the last year.
    pub fn participation_url(&self, organization: &str, repository: &str) -> String {
        format!("{}/stats/participation", self.repository_url(organization, repository))
    }

    /// Contents listing or file lookup under the repository root.
    pub fn contents_url(&self, organization: &str, repository: &str, path: &str) -> String {
        if path.is_empty() {
            format!("{}/contents", self.repository_url(organization, repository))
        } else {
            format!("{}/contents/{}", self.repository_url(organization, repository), path)
        }
    }
}

fn successful(status: u16) -> bool {
    (200..300).contains(&status)
}

fn decode_body(url: &str, body: &str) -> Result<Value, Error> {
    serde_json::from_str(body)
        .map_err(|error| Error::service(format!("invalid JSON from {url}: {error}")))
}

/// Extracts the `rel="next"` target from a `Link` header value.
fn next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let mut sections = part.split(';');
        let target = sections.next().map(str::trim)?;
        let is_next = sections.any(|section| section.trim() == "rel=\"next\"");

        if is_next && target.starts_with('<') && target.ends_with('>') {
            return Some(target[1..target.len() - 1].to_owned());
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-response transport shared by the crate's test suites.

    use std::sync::Mutex;

    use super::{ApiClient, RawResponse, Transport};
    use crate::error::Error;

    /// Base URL used by fake-transport tests.
    pub(crate) const TEST_BASE: &str = "https://api.example.test";

    /// Transport double serving exact-URL routes and recording requests.
    pub(crate) struct FakeTransport {
        routes:             Vec<(String, RawResponse)>,
        requests:           Mutex<Vec<String>>,
        connection_failure: bool
    }

    impl FakeTransport {
        pub(crate) fn new() -> Self {
            Self {
                routes:             Vec::new(),
                requests:           Mutex::new(Vec::new()),
                connection_failure: false
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                connection_failure: true,
                ..Self::new()
            }
        }

        pub(crate) fn route(mut self, url: &str, response: RawResponse) -> Self {
            self.routes.push((url.to_owned(), response));
            self
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().expect("requests lock").len()
        }

        pub(crate) fn requests_matching(&self, fragment: &str) -> usize {
            self.requests
                .lock()
                .expect("requests lock")
                .iter()
                .filter(|url| url.contains(fragment))
                .count()
        }
    }

    impl Transport for FakeTransport {
        async fn get(&self, url: &str, _authorization: &str) -> Result<RawResponse, Error> {
            self.requests.lock().expect("requests lock").push(url.to_owned());

            if self.connection_failure {
                return Err(Error::connection("connection refused"));
            }

            for (route, response) in &self.routes {
                if route == url {
                    return Ok(response.clone());
                }
            }

            Ok(RawResponse {
                status: 404,
                link:   None,
                body:   String::new()
            })
        }
    }

    /// Successful JSON response without pagination.
    pub(crate) fn json_response(body: &str) -> RawResponse {
        RawResponse {
            status: 200,
            link:   None,
            body:   body.to_owned()
        }
    }

    /// Successful JSON response pointing at a further page.
    pub(crate) fn paged_response(body: &str, next_url: &str) -> RawResponse {
        RawResponse {
            status: 200,
            link:   Some(format!("<{next_url}>; rel=\"next\", <{next_url}>; rel=\"last\"")),
            body:   body.to_owned()
        }
    }

    /// Bodyless response with the given status.
    pub(crate) fn status_response(status: u16) -> RawResponse {
        RawResponse {
            status,
            link: None,
            body: String::new()
        }
    }

    /// Client wired to the fake transport and test base URL.
    pub(crate) fn client(transport: FakeTransport) -> ApiClient<FakeTransport> {
        ApiClient::with_transport(transport, "Basic dGVzdDp0ZXN0", TEST_BASE)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        next_link,
        testing::{FakeTransport, TEST_BASE, client, json_response, paged_response, status_response}
    };

    #[test]
    fn next_link_extracts_next_target() {
        let header = "<https://api.example.test/items?page=2>; rel=\"next\", \
                      <https://api.example.test/items?page=3>; rel=\"last\"";
        assert_eq!(
            next_link(header).as_deref(),
            Some("https://api.example.test/items?page=2")
        );
    }

    #[test]
    fn next_link_ignores_header_without_next() {
        let header = "<https://api.example.test/items?page=1>; rel=\"prev\"";
        assert!(next_link(header).is_none());
    }

    #[tokio::test]
    async fn fetch_returns_decoded_payload() {
        let url = format!("{TEST_BASE}/repos/acme/widget");
        let transport = FakeTransport::new().route(&url, json_response("{\"name\":\"widget\"}"));
        let api = client(transport);

        let payload = api.fetch(&url).await.expect("fetch failed").expect("payload missing");
        assert_eq!(payload["name"], "widget");
    }

    #[tokio::test]
    async fn fetch_treats_not_found_as_absent() {
        let url = format!("{TEST_BASE}/repos/acme/widget/releases/latest");
        let transport = FakeTransport::new().route(&url, status_response(404));
        let api = client(transport);

        let payload = api.fetch(&url).await.expect("fetch failed");
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn fetch_treats_empty_repository_conflict_as_absent() {
        let url = format!("{TEST_BASE}/repos/acme/widget/commits");
        let transport = FakeTransport::new().route(&url, status_response(409));
        let api = client(transport);

        let payload = api.fetch(&url).await.expect("fetch failed");
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn fetch_propagates_connection_failure() {
        let api = client(FakeTransport::failing());

        let result = api.fetch(&format!("{TEST_BASE}/orgs/acme/repos")).await;
        assert!(
            matches!(result, Err(crate::Error::Connection { .. })),
            "connection failures must abort the run"
        );
    }

    #[tokio::test]
    async fn fetch_concatenates_all_pages_in_order() {
        let first = format!("{TEST_BASE}/items");
        let second = format!("{TEST_BASE}/items?page=2");
        let third = format!("{TEST_BASE}/items?page=3");

        let transport = FakeTransport::new()
            .route(&first, paged_response("[1,2]", &second))
            .route(&second, paged_response("[3,4]", &third))
            .route(&third, json_response("[5]"));
        let api = client(transport);

        let payload = api.fetch(&first).await.expect("fetch failed").expect("payload missing");
        let items: Vec<i64> = serde_json::from_value(payload).expect("array expected");

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(api.transport().request_count(), 3, "one request per page");
    }

    #[tokio::test]
    async fn fetch_rejects_invalid_json() {
        let url = format!("{TEST_BASE}/repos/acme/widget");
        let transport = FakeTransport::new().route(&url, json_response("not-json"));
        let api = client(transport);

        let result = api.fetch(&url).await;
        assert!(matches!(result, Err(crate::Error::Service { .. })));
    }

    #[test]
    fn endpoint_builders_match_hosting_layout() {
        let api = client(FakeTransport::new());

        assert_eq!(
            api.org_repositories_url("acme", "public", 100),
            format!("{TEST_BASE}/orgs/acme/repos?type=public&per_page=100")
        );
        assert_eq!(
            api.latest_release_url("acme", "widget"),
            format!("{TEST_BASE}/repos/acme/widget/releases/latest")
        );
        assert_eq!(
            api.contributors_url("acme", "widget"),
            format!("{TEST_BASE}/repos/acme/widget/contributors?anon=1")
        );
        assert_eq!(
            api.issues_url("acme", "widget"),
            format!("{TEST_BASE}/repos/acme/widget/issues?state=all&sort=created")
        );
        assert_eq!(
            api.contents_url("acme", "widget", "README.md"),
            format!("{TEST_BASE}/repos/acme/widget/contents/README.md")
        );
        assert_eq!(
            api.contents_url("acme", "widget", ""),
            format!("{TEST_BASE}/repos/acme/widget/contents")
        );
    }
}
