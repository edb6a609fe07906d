//! Fetched page model

use std::fmt;

/// A page as handed over by the fetch layer
#[derive(Debug, Clone)]
pub struct PageFetchResult {
    /// The URL the page was fetched from
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Raw body, `None` when no response body was received
    pub body: Option<Vec<u8>>,
}

/// Why a page was skipped before its content was looked at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No response body
    MissingBody,
    /// Status outside 200..400
    Status(u16),
    /// Content-Type mentions neither text nor html
    ContentType(String),
    /// The page URL itself cannot be parsed
    InvalidUrl,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBody => write!(f, "no response body"),
            Self::Status(status) => write!(f, "status {}", status),
            Self::ContentType(content_type) => write!(f, "content type '{}'", content_type),
            Self::InvalidUrl => write!(f, "invalid page URL"),
        }
    }
}

impl PageFetchResult {
    pub fn new(
        url: impl Into<String>,
        status: u16,
        content_type: impl Into<String>,
        body: Option<Vec<u8>>,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            content_type: content_type.into(),
            body,
        }
    }

    /// Reads a reqwest response into a page, keeping the final URL after redirects
    pub async fn from_response(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let url = response.url().to_string();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.bytes().await?;

        Ok(Self {
            url,
            status,
            content_type,
            body: Some(body.to_vec()),
        })
    }

    /// Returns why the page must be skipped, or `None` if its content should be validated
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.body.is_none() {
            return Some(SkipReason::MissingBody);
        }

        if !(200..400).contains(&self.status) {
            return Some(SkipReason::Status(self.status));
        }

        if !is_textual(&self.content_type) {
            return Some(SkipReason::ContentType(self.content_type.clone()));
        }

        None
    }

    /// The body decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Checks that a Content-Type header value mentions `text` or `html`
pub fn is_textual(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.contains("text") || lower.contains("html")
}
