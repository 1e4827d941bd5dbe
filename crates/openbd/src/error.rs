pub(crate) type DynError = Box<dyn std::error::Error + Send + Sync>;

/// The Errors that may occur when calling the openbd functions.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<DynError>,
}

/// Types of errors that make up an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP transport failed before a response was received.
    Network,
    /// The server answered with a non-success HTTP status.
    Status(u16),
    /// A retryable failure persisted after the whole retry budget was spent.
    RetriesExhausted,
    /// An error caused when parsing/deserialization fails.
    Deserialize,
    /// An error writing rows to the output.
    Write,
}

impl Error {
    /// Creates a new [`Error`] based on the [`ErrorKind`] and message to describe the error.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Wraps an existing error as the source of [`Error`].
    pub fn wrap<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<DynError>,
    {
        Self {
            kind,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Returns the kind of error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Whether the failure is transient and the request may be attempted again.
    ///
    /// Only transport failures and the server side statuses in `statuses` qualify.
    #[must_use]
    pub fn is_retryable(&self, statuses: &[u16]) -> bool {
        match self.kind {
            ErrorKind::Network => true,
            ErrorKind::Status(code) => statuses.contains(&code),
            _ => false,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ErrorKind::Network => f.write_str("Network error")?,
            ErrorKind::Status(code) => write!(f, "HTTP status {code}")?,
            ErrorKind::RetriesExhausted => f.write_str("Retries exhausted")?,
            ErrorKind::Deserialize => f.write_str("Deserialize error")?,
            ErrorKind::Write => f.write_str("Write error")?,
        };

        // the cause is reachable through `source` and is left to error reporters
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}
