use std::time::Duration;

use log::trace;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;

pub(crate) mod openbd;
pub(crate) mod retry;

use crate::{Error, ErrorKind};

/// A blocking HTTP transport able to perform a GET request.
///
/// Responses are returned for every status code, turning a status into an [`Error`] is left to the
/// caller so that retry decisions can see the status and its headers.
pub trait Client {
    /// Performs a GET request on `url`.
    ///
    /// # Errors
    ///
    /// An [`Err`] of kind [`ErrorKind::Network`] is returned when no response could be read.
    fn fetch(&self, url: &str) -> Result<Response, Error>;

    /// Performs a single GET request on `url` and deserializes a successful JSON body.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the request fails, the status is not a success or the body is
    /// not valid JSON for `T`.
    fn get_json<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        self.fetch(url)?.error_for_status(url)?.json()
    }
}

impl Client for reqwest::blocking::Client {
    fn fetch(&self, url: &str) -> Result<Response, Error> {
        trace!("GET {url}");
        let resp = self
            .get(url)
            .send()
            .map_err(|e| Error::wrap(ErrorKind::Network, e))?;

        let status = resp.status().as_u16();
        let retry_after = retry_after(resp.headers());
        let body = resp
            .text()
            .map_err(|e| Error::wrap(ErrorKind::Network, e))?;

        Ok(Response {
            status,
            retry_after,
            body,
        })
    }
}

/// Reads a `Retry-After` header given in seconds. The HTTP-date form is not supported.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// The parts of an HTTP response the crate cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    status: u16,
    retry_after: Option<Duration>,
    body: String,
}

impl Response {
    /// Creates a response with the given status code and body.
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    /// Sets the delay requested by a `Retry-After` header.
    #[must_use]
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    /// The HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// The delay requested by the server in a `Retry-After` header, in seconds form only.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Turns a non-success response into an [`ErrorKind::Status`] error.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the status is not in the 2xx range.
    pub fn error_for_status(self, url: &str) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::new(ErrorKind::Status(self.status), format!("GET {url}")))
        }
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// An [`Err`] of kind [`ErrorKind::Deserialize`] is returned when the body is not valid JSON
    /// for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|e| Error::wrap(ErrorKind::Deserialize, e))
    }
}

#[cfg(test)]
pub(crate) use test::MockClient;

#[cfg(test)]
mod test {
    use std::{cell::RefCell, collections::VecDeque};

    use super::*;

    /// Replays canned responses in order and records every requested url.
    pub(crate) struct MockClient {
        responses: RefCell<VecDeque<Result<Response, Error>>>,
        requests: RefCell<Vec<String>>,
    }

    impl MockClient {
        pub(crate) fn new<I>(responses: I) -> Self
        where
            I: IntoIterator<Item = Result<Response, Error>>,
        {
            Self {
                responses: RefCell::new(responses.into_iter().collect()),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn ok<S: Into<String>>(body: S) -> Result<Response, Error> {
            Ok(Response::new(200, body))
        }

        pub(crate) fn status(status: u16) -> Result<Response, Error> {
            Ok(Response::new(status, "<html>error</html>"))
        }

        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl Client for MockClient {
        fn fetch(&self, url: &str) -> Result<Response, Error> {
            self.requests.borrow_mut().push(url.to_owned());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| panic!("No response queued for request to '{url}'"))
        }
    }

    fn headers(retry_after: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, reqwest::header::HeaderValue::from_static(retry_after));
        headers
    }

    #[test]
    fn retry_after_reads_delay_in_seconds() {
        assert_eq!(Some(Duration::from_secs(7)), retry_after(&headers("7")));
        assert_eq!(Some(Duration::from_secs(120)), retry_after(&headers(" 120 ")));
        assert_eq!(Some(Duration::ZERO), retry_after(&headers("0")));
    }

    #[test]
    fn retry_after_ignores_missing_and_unsupported_values() {
        assert_eq!(None, retry_after(&HeaderMap::new()));
        assert_eq!(None, retry_after(&headers("Wed, 21 Oct 2026 07:28:00 GMT")));
        assert_eq!(None, retry_after(&headers("-1")));
        assert_eq!(None, retry_after(&headers("1.5")));
    }

    #[test]
    fn get_json_deserializes_successful_body() {
        let client = MockClient::new([MockClient::ok(r#"["9780000000002"]"#)]);
        let res: Vec<String> = client.get_json("http://localhost/coverage").unwrap();
        assert_eq!(vec!["9780000000002".to_owned()], res);
    }

    #[test]
    fn get_json_reports_status_before_parsing() {
        let client = MockClient::new([MockClient::status(404)]);
        let err = client
            .get_json::<Vec<String>>("http://localhost/coverage")
            .unwrap_err();
        assert_eq!(ErrorKind::Status(404), err.kind());
    }

    #[test]
    fn get_json_reports_malformed_body() {
        let client = MockClient::new([MockClient::ok("{not json")]);
        let err = client
            .get_json::<Vec<String>>("http://localhost/coverage")
            .unwrap_err();
        assert_eq!(ErrorKind::Deserialize, err.kind());
    }
}
