//! Resolution of document references against the page URL

use url::Url;

/// Resolve `href` against `base` into an absolute URL string.
///
/// Handles relative paths, protocol-relative (`//host/path`) references and
/// already-absolute URLs. Returns `None` when the reference is empty or cannot
/// be parsed; callers treat that as "no candidate".
///
/// # Example
/// ```
/// use url::Url;
/// use imgpick::resolve;
///
/// let base = Url::parse("http://x.com/p/").unwrap();
/// assert_eq!(resolve("img/a.jpg", &base).as_deref(), Some("http://x.com/p/img/a.jpg"));
/// ```
pub fn resolve(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    base.join(href).ok().map(String::from)
}
