use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::TextbinError;
use crate::models::listing::DEFAULT_PAGE_SIZE;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";
pub const DEFAULT_BOOKMARKS_PATH: &str = "textbin_saved_docs.json";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root of the document API.
    pub api_url: Url,
    /// Public site root used to build shareable read/update links.
    pub site_url: Url,
    /// File holding the locally saved bookmarks.
    pub bookmarks_path: PathBuf,
    /// Page size of the public listing.
    pub page_size: u32,
}

/// Raw values as merged by the `config` crate, before validation.
#[derive(Debug, Deserialize)]
struct RawConfig {
    api_url: String,
    site_url: String,
    bookmarks_path: PathBuf,
    page_size: u32,
}

impl ClientConfig {
    /// Load the configuration.
    ///
    /// Sources, lowest precedence first:
    /// - built-in defaults
    /// - the optional TOML `file`
    /// - `TEXTBIN_API_URL`, `TEXTBIN_SITE_URL`, `TEXTBIN_BOOKMARKS_PATH`,
    ///   `TEXTBIN_PAGE_SIZE`
    pub fn load(file: Option<&Path>) -> Result<Self, TextbinError> {
        let config_err = |e: config::ConfigError| TextbinError::Config(e.to_string());

        let mut builder = config::Config::builder()
            .set_default("api_url", DEFAULT_API_URL)
            .map_err(config_err)?
            .set_default("site_url", DEFAULT_SITE_URL)
            .map_err(config_err)?
            .set_default("bookmarks_path", DEFAULT_BOOKMARKS_PATH)
            .map_err(config_err)?
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE))
            .map_err(config_err)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let raw: RawConfig = builder
            .add_source(config::Environment::with_prefix("TEXTBIN").try_parsing(true))
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;

        Self::from_raw(raw)
    }

    /// Build with explicit URLs and default local settings (useful for testing).
    pub fn new(api_url: Url, site_url: Url) -> Self {
        Self {
            api_url,
            site_url,
            bookmarks_path: PathBuf::from(DEFAULT_BOOKMARKS_PATH),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn from_raw(raw: RawConfig) -> Result<Self, TextbinError> {
        if raw.page_size == 0 {
            return Err(TextbinError::Config("page_size must be positive".into()));
        }

        Ok(Self {
            api_url: parse_url("api_url", &raw.api_url)?,
            site_url: parse_url("site_url", &raw.site_url)?,
            bookmarks_path: raw.bookmarks_path,
            page_size: raw.page_size,
        })
    }
}

pub fn parse_url(field: &str, value: &str) -> Result<Url, TextbinError> {
    Url::parse(value).map_err(|e| TextbinError::Config(format!("Invalid {field} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "api_url = \"https://api.textbin.test\"\npage_size = 24"
        )
        .unwrap();

        let config = ClientConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.textbin.test/");
        assert_eq!(config.site_url.as_str(), "http://localhost:5173/");
        assert_eq!(config.page_size, 24);
        assert_eq!(config.bookmarks_path, PathBuf::from(DEFAULT_BOOKMARKS_PATH));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "site_url = \"not a url\"").unwrap();

        let err = ClientConfig::load(Some(file.path())).unwrap_err();
        match err {
            TextbinError::Config(msg) => assert!(msg.contains("site_url")),
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let raw = RawConfig {
            api_url: DEFAULT_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            bookmarks_path: PathBuf::from(DEFAULT_BOOKMARKS_PATH),
            page_size: 0,
        };
        assert!(matches!(
            ClientConfig::from_raw(raw),
            Err(TextbinError::Config(_))
        ));
    }

    #[test]
    fn test_new_uses_local_defaults() {
        let config = ClientConfig::new(
            Url::parse(DEFAULT_API_URL).unwrap(),
            Url::parse(DEFAULT_SITE_URL).unwrap(),
        );
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }
}
