use crate::url::domain::extract_authority;
use crate::{UrlError, UrlResult};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use url::Url;

/// Everything except unreserved characters and the `/` separator
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Path endings that produce unbounded URL variants for the same content: index pages,
/// pagination and calendar archives, each optionally followed by one trailing character.
static TRAP_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"/index\.[a-zA-Z]+.?$",
        r"|/page/[0-9]+.?$",
        r"|/[0-9]{4}/[0-9]{2}.?$",
        r"|/[0-9]{4}/[0-9]{2}/[0-9]{2}.?$",
        r"|/[0-9]{4}-[0-9]{2}.?$",
        r"|/[0-9]{4}-[0-9]{2}-[0-9]{2}.?$",
    ))
    .expect("trap suffix pattern is valid")
});

/// Canonicalizes a raw `href` found on the page at `base`
///
/// # Canonicalization Steps
///
/// 1. Resolve the reference against the page URL
/// 2. Percent-encode the path unless it already contains an escape
/// 3. Collapse trap endings (`/index.html`, `/page/3`, `/2021/04`, `/2021-04-01`, ...)
///    into `/`, repeatedly, until none is left
/// 4. Recompose as `scheme://authority<path>` with scheme and host lowercased;
///    query string and fragment are dropped
///
/// Canonicalizing an already canonical URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use crawl_sieve::url::canonicalize;
/// use url::Url;
///
/// let base = Url::parse("http://www.ics.uci.edu/").unwrap();
/// let link = canonicalize(&base, "HTTP://WWW.ICS.UCI.EDU/page/3/index.html").unwrap();
/// assert_eq!(link, "http://www.ics.uci.edu/");
/// ```
pub fn canonicalize(base: &Url, href: &str) -> UrlResult<String> {
    let resolved = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    let authority =
        extract_authority(&resolved).ok_or_else(|| UrlError::MissingHost(href.to_string()))?;

    let path = resolved.path();
    let encoded = if path.contains('%') {
        path.to_string()
    } else {
        encode_path(path)
    };

    Ok(format!(
        "{}://{}{}",
        resolved.scheme().to_lowercase(),
        authority,
        collapse_traps(&encoded)
    ))
}

/// Percent-encodes the path, keeping the `/` separators
fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

/// Replaces trap endings with `/` until the path is stable
///
/// Every replacement strictly shortens the path, so the loop terminates.
pub fn collapse_traps(path: &str) -> String {
    let mut current = path.to_string();
    while let Cow::Owned(next) = TRAP_SUFFIX.replace(&current, "/") {
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://www.ics.uci.edu/").unwrap()
    }

    fn canon(href: &str) -> String {
        canonicalize(&base(), href).unwrap()
    }

    #[test]
    fn test_lowercases_scheme_and_host() {
        assert_eq!(
            canon("HTTPS://Vision.ICS.UCI.EDU/People"),
            "https://vision.ics.uci.edu/People"
        );
    }

    #[test]
    fn test_resolves_relative_links() {
        let base = Url::parse("http://www.ics.uci.edu/about/faculty/").unwrap();
        assert_eq!(
            canonicalize(&base, "staff").unwrap(),
            "http://www.ics.uci.edu/about/faculty/staff"
        );
        assert_eq!(
            canonicalize(&base, "/research").unwrap(),
            "http://www.ics.uci.edu/research"
        );
        assert_eq!(
            canonicalize(&base, "../contact").unwrap(),
            "http://www.ics.uci.edu/about/contact"
        );
    }

    #[test]
    fn test_protocol_relative_link() {
        assert_eq!(
            canon("//www.cs.uci.edu/news"),
            "http://www.cs.uci.edu/news"
        );
    }

    #[test]
    fn test_drops_query_and_fragment() {
        assert_eq!(
            canon("/events?month=4&year=2021#top"),
            "http://www.ics.uci.edu/events"
        );
    }

    #[test]
    fn test_pagination_and_index_collapsed() {
        assert_eq!(
            canon("HTTP://WWW.ICS.UCI.EDU/page/3/index.html"),
            "http://www.ics.uci.edu/"
        );
    }

    #[test]
    fn test_pagination_variants_share_canonical_form() {
        assert_eq!(canon("/news/page/2"), canon("/news/page/3"));
        assert_eq!(canon("/news/page/2"), "http://www.ics.uci.edu/news/");
        assert_eq!(canon("/news/page/17/"), "http://www.ics.uci.edu/news/");
    }

    #[test]
    fn test_calendar_archives_collapsed() {
        assert_eq!(canon("/blog/2019/05"), "http://www.ics.uci.edu/blog/");
        assert_eq!(canon("/blog/2019/05/21/"), "http://www.ics.uci.edu/blog/");
        assert_eq!(canon("/events/2020-01"), "http://www.ics.uci.edu/events/");
        assert_eq!(canon("/events/2020-01-15"), "http://www.ics.uci.edu/events/");
    }

    #[test]
    fn test_index_page_collapsed() {
        assert_eq!(canon("/about/index.php"), "http://www.ics.uci.edu/about/");
        assert_eq!(canon("/index.html"), "http://www.ics.uci.edu/");
    }

    #[test]
    fn test_trap_segments_inside_path_kept() {
        assert_eq!(
            canon("/blog/2019/05/my-post"),
            "http://www.ics.uci.edu/blog/2019/05/my-post"
        );
        assert_eq!(
            canon("/page/2/details"),
            "http://www.ics.uci.edu/page/2/details"
        );
    }

    #[test]
    fn test_reserved_characters_encoded() {
        assert_eq!(
            canon("/people/a:b@c"),
            "http://www.ics.uci.edu/people/a%3Ab%40c"
        );
    }

    #[test]
    fn test_unreserved_characters_kept() {
        assert_eq!(canon("/~user/x"), "http://www.ics.uci.edu/~user/x");
        assert_eq!(
            canon("/~eppstein/pubs/a_b-c.html"),
            "http://www.ics.uci.edu/~eppstein/pubs/a_b-c.html"
        );
    }

    #[test]
    fn test_existing_escapes_left_alone() {
        assert_eq!(
            canon("/people/john%20doe"),
            "http://www.ics.uci.edu/people/john%20doe"
        );
        assert_eq!(canon("/a b"), "http://www.ics.uci.edu/a%20b");
    }

    #[test]
    fn test_keeps_explicit_port() {
        assert_eq!(
            canon("http://www.ics.uci.edu:8080/x"),
            "http://www.ics.uci.edu:8080/x"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "HTTP://WWW.ICS.UCI.EDU/page/3/index.html",
            "/people/a:b@c",
            "/a b/page/4",
            "/blog/2019/05/21/",
            "/~user/research.html",
            "/news/page/2/index.htm",
        ];

        for input in inputs {
            let once = canon(input);
            let again = canonicalize(&base(), &once).unwrap();
            assert_eq!(once, again, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_hostless_link_rejected() {
        let result = canonicalize(&base(), "mailto:someone@uci.edu");
        assert!(matches!(result, Err(UrlError::MissingHost(_))));
    }

    #[test]
    fn test_unparseable_link_rejected() {
        let result = canonicalize(&base(), "http://[::1");
        assert!(matches!(result, Err(UrlError::Parse(_))));
    }

    #[test]
    fn test_collapse_traps_stable() {
        assert_eq!(collapse_traps("/"), "/");
        assert_eq!(collapse_traps("/a/page/1/page/2"), "/a/");
        assert_eq!(collapse_traps("/plain/path"), "/plain/path");
    }
}
