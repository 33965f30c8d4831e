use tracing::warn;

use crate::document;

/// What a transport hands back for one completed HTTP exchange
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

/// Result of one proxy request that reached the server.
///
/// Transport failures are carried separately as `TransportError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Completed; `None` when the proxy answered with an empty body
    Success(Option<Vec<u8>>),
    NotFound,
}

impl RequestOutcome {
    /// Interpret a raw response. Any status other than 200 and 404 is only
    /// logged and handled like a success carrying whatever body came back.
    pub fn from_response(response: RawResponse) -> Self {
        if response.status != 200 {
            warn!(
                "Elliptics warning: got \"{}\" code while fetching \"{}\"",
                response.status, response.url
            );
        }

        if response.status == 404 {
            RequestOutcome::NotFound
        } else if response.body.is_empty() {
            RequestOutcome::Success(None)
        } else {
            RequestOutcome::Success(Some(response.body))
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }

    /// Response body, if the request succeeded with a non-empty one
    pub fn into_payload(self) -> Option<Vec<u8>> {
        match self {
            RequestOutcome::Success(body) => body,
            RequestOutcome::NotFound => None,
        }
    }

    /// Whether an upload answer reports at least one written copy
    pub fn upload_succeeded(&self) -> bool {
        match self {
            RequestOutcome::Success(Some(body)) => document::written_copies(body) > 0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            url: "http://127.0.0.1:8080/test".to_string(),
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_ok_with_body() {
        let outcome = RequestOutcome::from_response(response(200, "content"));
        assert_eq!(outcome, RequestOutcome::Success(Some(b"content".to_vec())));
    }

    #[test]
    fn test_ok_without_body() {
        let outcome = RequestOutcome::from_response(response(200, ""));
        assert_eq!(outcome, RequestOutcome::Success(None));
        assert!(outcome.is_success());
        assert_eq!(outcome.into_payload(), None);
    }

    #[test]
    fn test_not_found() {
        let outcome = RequestOutcome::from_response(response(404, "not here"));
        assert_eq!(outcome, RequestOutcome::NotFound);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_other_status_is_not_escalated() {
        let outcome = RequestOutcome::from_response(response(500, "boom"));
        assert_eq!(outcome, RequestOutcome::Success(Some(b"boom".to_vec())));

        let outcome = RequestOutcome::from_response(response(403, ""));
        assert_eq!(outcome, RequestOutcome::Success(None));
    }

    #[test]
    fn test_upload_succeeded() {
        let written = RequestOutcome::from_response(response(
            200,
            r#"<?xml version="1.0" encoding="utf-8"?><post obj="a.txt" groups="2"><complete addr="10.0.0.1:1025:2" group="1" status="0"/><written>2</written></post>"#,
        ));
        assert!(written.upload_succeeded());

        let zero = RequestOutcome::from_response(response(200, "<post><written>0</written></post>"));
        assert!(!zero.upload_succeeded());

        let missing = RequestOutcome::from_response(response(200, "<post><id>1</id></post>"));
        assert!(!missing.upload_succeeded());

        assert!(!RequestOutcome::Success(None).upload_succeeded());
        assert!(!RequestOutcome::NotFound.upload_succeeded());
        assert!(!RequestOutcome::from_response(response(200, "not xml <<")).upload_succeeded());
    }
}
