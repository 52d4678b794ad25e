//! Error types for the client.
//!
//! The taxonomy separates transport-level failures (timeouts, connection
//! errors) from domain-level outcomes derived from response content
//! (authentication loss, sentinel substrings, protocol violations). Redirects
//! are part of the wire protocol here: some operations succeed *via* a
//! redirect, so an unexpected redirect is reported as its own variant rather
//! than being folded into a generic HTTP error.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures at the HTTP layer, before any response body is interpreted.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection-level or protocol-level request failure.
    #[error("http request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// A 301/302 response without a usable `Location` header.
    #[error("redirect response missing Location header")]
    MissingLocation,
}

impl TransportError {
    /// Classifies a reqwest error into the transport taxonomy.
    pub(crate) fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(err)
        }
    }
}

/// Errors surfaced by the public client operations.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The response body lacks the logged-in marker on a call that requires
    /// authentication. Fatal to the call; never retried internally.
    #[error("not authenticated: response is missing the logged-in marker")]
    Authentication,

    /// The profile page carried the "User not found." sentinel.
    #[error("user not found")]
    UserNotFound,

    /// The profile page carried the privacy-settings sentinel.
    #[error("blocked by the user's privacy settings")]
    Blocked,

    /// The server answered with a redirect where a page body was expected.
    #[error("unexpected redirect ({status}) to {location}")]
    Redirect { status: u16, location: String },

    /// An operation whose success is signaled by a redirect got a normal
    /// response instead (friend add/remove).
    #[error("could not {operation}: expected a redirect, got a page")]
    MissingRedirect { operation: &'static str },

    /// The thread-id discovery protocol was violated: no redirect, or a
    /// redirect without a `thread_id` query parameter.
    #[error("could not load thread id")]
    ThreadIdUnavailable,

    /// The site rejected a mutating operation; carries the raw response body.
    #[error("{operation} rejected: {body}")]
    Rejected {
        operation: &'static str,
        body: String,
    },

    /// A required anchor element is missing from the page. Either the page
    /// shape changed or the request hit an unexpected page entirely.
    #[error("unexpected page shape: missing {0}")]
    PageShape(&'static str),

    /// Transport failure, propagated unmodified.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A JSON endpoint returned a body that does not parse.
    #[error("malformed json response: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_carries_raw_body() {
        let err = ApiError::Rejected {
            operation: "send message",
            body: r#"{"error": "blocked"}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("send message"));
        assert!(msg.contains(r#"{"error": "blocked"}"#));
    }

    #[test]
    fn thread_id_error_message() {
        assert_eq!(
            ApiError::ThreadIdUnavailable.to_string(),
            "could not load thread id"
        );
    }
}
