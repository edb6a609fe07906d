/// Checks if a host falls under a suffix such as ".ics.uci.edu"
///
/// The suffix carries its leading dot, so the bare registrable domain does not match:
/// ".ics.uci.edu" matches "www.ics.uci.edu" and "a.b.ics.uci.edu" but not "ics.uci.edu"
/// or "physics.uci.edu".
///
/// # Examples
///
/// ```
/// use crawl_sieve::url::matches_suffix;
///
/// assert!(matches_suffix(".ics.uci.edu", "www.ics.uci.edu"));
/// assert!(!matches_suffix(".ics.uci.edu", "physics.uci.edu"));
/// ```
pub fn matches_suffix(suffix: &str, host: &str) -> bool {
    !suffix.is_empty() && host.len() > suffix.len() && host.ends_with(suffix)
}

/// Checks if `authority + path` starts with an allowed prefix
///
/// Prefixes are written without a scheme, e.g.
/// "today.uci.edu/department/information_computer_sciences/".
pub fn matches_prefix(prefix: &str, authority: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }

    format!("{}{}", authority, path).starts_with(prefix)
}
