use sha2::{Digest, Sha256};
use url::Url;

/// Extracts the authority (`host[:port]`) from a URL
///
/// The host is lowercased; an explicit non-default port is kept because the crawl scope
/// and the robots.txt cache are both keyed on the full authority.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use crawl_sieve::url::extract_authority;
///
/// let url = Url::parse("https://WWW.ICS.UCI.EDU/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("www.ics.uci.edu".to_string()));
///
/// let url = Url::parse("http://localhost:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("localhost:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Computes the key a page is stored under in the fingerprint index
///
/// The key is the hex SHA-256 of the URL without its scheme, so `http` and `https`
/// fetches of the same resource share one key. Unparseable input is hashed verbatim.
pub fn page_key(url: &str) -> String {
    let material = match Url::parse(url) {
        Ok(parsed) => format!(
            "{}/{}/{}/{}",
            extract_authority(&parsed).unwrap_or_default(),
            parsed.path(),
            parsed.query().unwrap_or(""),
            parsed.fragment().unwrap_or("")
        ),
        Err(_) => url.to_string(),
    };

    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    hex::encode(hasher.finalize())
}
