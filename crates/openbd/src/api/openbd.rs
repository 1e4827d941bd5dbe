use log::{debug, trace};

use super::{retry::RetryPolicy, Client};
use crate::{summary::Book, Error};

/// Base url of version 1 of the openBD API.
pub const OPENBD_URL: &str = "https://api.openbd.jp/v1";

/// The openBD endpoints used to export the catalog.
///
/// `OpenBd` owns the HTTP transport and the retry policy used for batch lookups, so that one
/// connection pool is shared by every request of a run.
#[derive(Debug)]
pub struct OpenBd<C = reqwest::blocking::Client> {
    client: C,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenBd {
    /// Creates a client for the public openBD API with the default [`RetryPolicy`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_url(OPENBD_URL)
    }

    /// Creates a client for an openBD compatible API rooted at `base_url`.
    pub fn with_url<S: Into<String>>(base_url: S) -> Self {
        Self::with_client(reqwest::blocking::Client::new(), base_url)
    }
}

impl Default for OpenBd {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Client> OpenBd<C> {
    /// Creates a client using `client` as transport and `base_url` as API root.
    pub fn with_client<S: Into<String>>(client: C, base_url: S) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            client,
            base_url,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy used by [`OpenBd::books`].
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The HTTP transport.
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// The base url requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches every ISBN known to openBD, in the order the API lists them.
    ///
    /// This request is made once and is not retried.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the request fails, the status is not a success or the body is
    /// not a JSON array of strings.
    pub fn coverage(&self) -> Result<Vec<String>, Error> {
        let url = format!("{}/coverage", self.base_url);
        debug!("Fetching ISBN coverage from {url}");
        self.client.get_json(&url)
    }

    /// Fetches the records of `isbns` in a single request.
    ///
    /// Records are returned in the order the API sends them.
    ///
    /// # Errors
    ///
    /// An [`Err`] is returned when the request still fails after the retry policy is spent, fails
    /// with a status that is not retried or when a record cannot be deserialized. openBD answers
    /// `null` for an ISBN it has no record for, which is a deserialization error.
    pub fn books(&self, isbns: &[String]) -> Result<Vec<Book>, Error> {
        let url = format!("{}/get?isbn={}", self.base_url, isbns.join(","));
        trace!("Requesting {} records", isbns.len());
        self.retry.get_json(&self.client, &url)
    }
}
