//! Bounded retries with exponential backoff for idempotent GET requests.

use std::{thread, time::Duration};

use log::{error, info, warn};
use serde::de::DeserializeOwned;

use super::{Client, Response};
use crate::{Error, ErrorKind};

const RETRY_AFTER_STATUS: u16 = 503;

/// How often and how patiently a request is attempted again.
///
/// The delay before retry `n` (starting at 1) is `backoff_factor * 2^(n - 1)`, capped at
/// `max_backoff`. A `Retry-After` header on a `503` response takes precedence over the computed
/// delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub total: u32,
    /// Base delay of the exponential backoff.
    pub backoff_factor: Duration,
    /// Upper bound of a single backoff delay.
    pub max_backoff: Duration,
    /// HTTP statuses that are retried. Transport failures are always retried.
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            total: 5,
            backoff_factor: Duration::from_secs(1),
            max_backoff: Duration::from_secs(120),
            status_forcelist: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            total: 0,
            ..Self::default()
        }
    }

    /// The backoff delay before the `retry`th retry, `retry` starting at 1.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry.saturating_sub(1));
        self.backoff_factor
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    fn delay(&self, retry: u32, response: Option<&Response>) -> Duration {
        response
            .filter(|r| r.status() == RETRY_AFTER_STATUS)
            .and_then(Response::retry_after)
            .unwrap_or_else(|| self.backoff(retry))
    }

    /// Performs a GET request on `url`, retrying transient failures, and deserializes the JSON
    /// body of the first successful response.
    ///
    /// # Errors
    ///
    /// An [`Err`] of kind [`ErrorKind::RetriesExhausted`] is returned when the last allowed attempt
    /// still failed in a retryable way. Any other failure is returned as soon as it occurs.
    pub fn get_json<C, T>(&self, client: &C, url: &str) -> Result<T, Error>
    where
        C: Client,
        T: DeserializeOwned,
    {
        let mut retries = 0;

        loop {
            let (err, response) = match client.fetch(url) {
                Ok(resp) if resp.is_success() => {
                    if retries > 0 {
                        info!("Request succeeded after {retries} retries");
                    }
                    return resp.json();
                }
                Ok(resp) if self.status_forcelist.contains(&resp.status()) => {
                    let err = Error::new(ErrorKind::Status(resp.status()), format!("GET {url}"));
                    (err, Some(resp))
                }
                Ok(resp) => return resp.error_for_status(url).and_then(|r| r.json()),
                Err(err) if err.is_retryable(&self.status_forcelist) => (err, None),
                Err(err) => return Err(err),
            };

            if retries >= self.total {
                error!("Giving up after {retries} retries: {err}");
                return Err(Error::wrap(ErrorKind::RetriesExhausted, err));
            }

            retries += 1;
            let delay = self.delay(retries, response.as_ref());
            warn!(
                "{err} - retry {retries}/{} in {:.1}s",
                self.total,
                delay.as_secs_f64()
            );
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockClient;

    const URL: &str = "http://localhost/get?isbn=9780000000002";

    fn instant() -> RetryPolicy {
        RetryPolicy {
            backoff_factor: Duration::ZERO,
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn backoff_doubles_from_the_factor() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (1..=5).map(|n| policy.backoff(n).as_secs()).collect();
        assert_eq!(vec![1, 2, 4, 8, 16], delays);
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(Duration::from_secs(120), policy.backoff(8));
        assert_eq!(Duration::from_secs(120), policy.backoff(u32::MAX));
    }

    #[test]
    fn retry_after_overrides_backoff_only_for_503() {
        let policy = RetryPolicy::default();
        let unavailable = Response::new(503, "").with_retry_after(Duration::from_secs(7));
        let bad_gateway = Response::new(502, "").with_retry_after(Duration::from_secs(7));

        assert_eq!(Duration::from_secs(7), policy.delay(3, Some(&unavailable)));
        assert_eq!(Duration::from_secs(4), policy.delay(3, Some(&bad_gateway)));
        assert_eq!(Duration::from_secs(4), policy.delay(3, None));
    }

    #[test]
    fn succeeds_after_two_unavailable_responses() {
        let client = MockClient::new([
            MockClient::status(503),
            MockClient::status(503),
            MockClient::ok("[1, 2]"),
        ]);

        let res: Vec<u8> = instant().get_json(&client, URL).unwrap();

        assert_eq!(vec![1, 2], res);
        assert_eq!(3, client.requests().len());
    }

    #[test]
    fn transport_failures_are_retried() {
        let client = MockClient::new([
            Err(Error::new(ErrorKind::Network, "connection reset")),
            MockClient::ok("[]"),
        ]);

        let res: Vec<u8> = instant().get_json(&client, URL).unwrap();

        assert!(res.is_empty());
        assert_eq!(2, client.requests().len());
    }

    #[test]
    fn client_errors_fail_without_retry() {
        let client = MockClient::new([MockClient::status(404)]);

        let err = instant().get_json::<_, Vec<u8>>(&client, URL).unwrap_err();

        assert_eq!(ErrorKind::Status(404), err.kind());
        assert_eq!(1, client.requests().len());
    }

    #[test]
    fn unlisted_server_errors_fail_without_retry() {
        let client = MockClient::new([MockClient::status(501)]);

        let err = instant().get_json::<_, Vec<u8>>(&client, URL).unwrap_err();

        assert_eq!(ErrorKind::Status(501), err.kind());
        assert_eq!(1, client.requests().len());
    }

    #[test]
    fn malformed_json_is_not_retried() {
        let client = MockClient::new([MockClient::ok("<html>")]);

        let err = instant().get_json::<_, Vec<u8>>(&client, URL).unwrap_err();

        assert_eq!(ErrorKind::Deserialize, err.kind());
        assert_eq!(1, client.requests().len());
    }

    #[test]
    fn gives_up_after_the_retry_budget() {
        let client = MockClient::new((0..6).map(|_| MockClient::status(500)));

        let err = instant().get_json::<_, Vec<u8>>(&client, URL).unwrap_err();

        assert_eq!(ErrorKind::RetriesExhausted, err.kind());
        let cause = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(Some(format!("HTTP status 500: GET {URL}")), cause);
        // first attempt plus five retries
        assert_eq!(6, client.requests().len());
    }

    #[test]
    fn no_retry_policy_makes_a_single_attempt() {
        let client = MockClient::new([MockClient::status(503)]);

        let err = RetryPolicy::none()
            .get_json::<_, Vec<u8>>(&client, URL)
            .unwrap_err();

        assert_eq!(ErrorKind::RetriesExhausted, err.kind());
        assert_eq!(1, client.requests().len());
    }
}
