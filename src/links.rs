use url::Url;

use crate::models::tokens::{ReadCode, UpdateCode};

/// Builds the shareable client-side URLs of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    site_url: Url,
}

impl ShareLinks {
    pub fn new(site_url: Url) -> Self {
        Self { site_url }
    }

    /// `{site}/read/{readCode}`
    pub fn read_link(&self, code: &ReadCode) -> String {
        self.link("read", code.as_str())
    }

    /// `{site}/update/{updateCode}`
    pub fn update_link(&self, code: &UpdateCode) -> String {
        self.link("update", code.expose())
    }

    fn link(&self, route: &str, code: &str) -> String {
        let mut url = self.site_url.clone();
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.pop_if_empty().push(route).push(code);
            }
            // Not a hierarchical URL; fall back to plain concatenation.
            Err(()) => {
                return format!(
                    "{}/{route}/{code}",
                    self.site_url.as_str().trim_end_matches('/')
                )
            }
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_and_update_links() {
        let links = ShareLinks::new(Url::parse("http://localhost:5173").unwrap());
        assert_eq!(
            links.read_link(&ReadCode::new("abc123")),
            "http://localhost:5173/read/abc123"
        );
        assert_eq!(
            links.update_link(&UpdateCode::new("upd456")),
            "http://localhost:5173/update/upd456"
        );
    }

    #[test]
    fn test_links_under_sub_path() {
        let links = ShareLinks::new(Url::parse("https://example.com/bin/").unwrap());
        assert_eq!(
            links.read_link(&ReadCode::new("x")),
            "https://example.com/bin/read/x"
        );
    }
}
