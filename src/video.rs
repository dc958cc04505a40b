//! Known video hosts
//!
//! Watch and embed links of a known host map deterministically to a thumbnail
//! image, and pages served by the host expose their canonical video URL in a
//! meta tag.

use std::slice;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::title::first_match;

/// A video host whose links can be turned into thumbnail candidates.
#[derive(Debug)]
pub(crate) struct VideoHost {
    /// Hosts serving the host's own watch pages
    page_hosts: &'static [&'static str],
    /// Link patterns; capture group 1 is the video id
    links: Vec<Regex>,
    /// Thumbnail template, `{id}` is replaced by the video id
    thumbnail: &'static str,
    /// Meta tag holding the canonical URL on the host's own pages, one
    /// capture group per quoting style
    official_url: Regex,
}

impl VideoHost {
    fn youtube() -> Self {
        const ID: &str = "([A-Za-z0-9_-]+)";
        let link = |pattern: String| Regex::new(&pattern).unwrap();
        Self {
            page_hosts: &["youtube.com", "www.youtube.com", "m.youtube.com"],
            links: vec![
                link(format!(r"//(?:www\.|m\.)?youtube\.com/watch\?(?:[^\s<>]*?&(?:amp;)?)?v={ID}")),
                link(format!(r"//(?:www\.)?youtube(?:-nocookie)?\.com/embed/{ID}")),
                link(format!(r"//youtu\.be/{ID}")),
            ],
            thumbnail: "https://img.youtube.com/vi/{id}/0.jpg",
            official_url: Regex::new(
                r#"<meta\s+(?:property|name)=["']og:url["']\s+content=(?:"([^"]+)"|'([^']+)')"#,
            )
            .unwrap(),
        }
    }

    /// Every link of this host in `content`, as `(offset, thumbnail)`.
    fn thumbnails<'a>(&'a self, content: &'a str) -> impl Iterator<Item = (usize, String)> + 'a {
        self.links.iter().flat_map(move |re| {
            re.captures_iter(content).filter_map(move |caps| {
                let whole = caps.get(0)?;
                let id = caps.get(1)?.as_str();
                Some((whole.start(), self.thumbnail.replace("{id}", id)))
            })
        })
    }

    fn serves(&self, base: &Url) -> bool {
        base.host_str()
            .is_some_and(|host| self.page_hosts.iter().any(|h| host.eq_ignore_ascii_case(h)))
    }
}

fn hosts() -> &'static [VideoHost] {
    static HOSTS: OnceLock<Vec<VideoHost>> = OnceLock::new();
    HOSTS.get_or_init(|| vec![VideoHost::youtube()])
}

/// Thumbnail URLs for all known video links, in the order the links appear.
pub(crate) fn thumbnails(content: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = hosts()
        .iter()
        .flat_map(|host| host.thumbnails(content))
        .collect();
    found.sort_by_key(|(offset, _)| *offset);
    found.into_iter().map(|(_, url)| url).collect()
}

/// Canonical media URL of a page served by a known video host.
pub(crate) fn official_url(content: &str, base: &Url) -> Option<String> {
    hosts()
        .iter()
        .filter(|host| host.serves(base))
        .find_map(|host| first_match(content, slice::from_ref(&host.official_url)))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_link() {
        let html = r#"<a href="//www.youtube.com/watch?v=abc123">clip</a>"#;
        assert_eq!(
            thumbnails(html),
            vec!["https://img.youtube.com/vi/abc123/0.jpg".to_string()]
        );
    }

    #[test]
    fn test_links_in_document_order() {
        let html = r#"
            <iframe src="https://www.youtube.com/embed/first_1"></iframe>
            <a href="http://www.youtube.com/watch?feature=share&amp;v=second-2">x</a>
            <a href="https://youtu.be/third3">y</a>
        "#;
        assert_eq!(
            thumbnails(html),
            vec![
                "https://img.youtube.com/vi/first_1/0.jpg".to_string(),
                "https://img.youtube.com/vi/second-2/0.jpg".to_string(),
                "https://img.youtube.com/vi/third3/0.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_unrelated_links() {
        let html = r#"<a href="https://www.example.com/watch?v=abc">x</a>"#;
        assert!(thumbnails(html).is_empty());
    }

    #[test]
    fn test_official_url_only_on_host_pages() {
        let html = r#"<meta property="og:url" content="https://www.youtube.com/watch?v=abc123">"#;

        let youtube = Url::parse("https://www.youtube.com/watch?v=abc123&t=5").unwrap();
        assert_eq!(
            official_url(html, &youtube),
            Some("https://www.youtube.com/watch?v=abc123".to_string())
        );

        let other = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(official_url(html, &other), None);
    }

    #[test]
    fn test_official_url_quoting() {
        let youtube = Url::parse("https://www.youtube.com/watch?v=abc123").unwrap();

        let single = r#"<meta property="og:url" content='https://www.youtube.com/watch?v=abc123&list=it"s'>"#;
        assert_eq!(
            official_url(single, &youtube),
            Some(r#"https://www.youtube.com/watch?v=abc123&list=it"s"#.to_string())
        );

        let double = r#"<meta name="og:url" content="https://www.youtube.com/watch?v=abc123&q=Bob's">"#;
        assert_eq!(
            official_url(double, &youtube),
            Some("https://www.youtube.com/watch?v=abc123&q=Bob's".to_string())
        );
    }
}
