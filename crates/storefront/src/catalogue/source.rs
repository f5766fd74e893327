//! Where the catalogue document comes from.

use std::fmt;
use std::path::PathBuf;

use url::Url;

use super::CatalogueError;

/// Location of the catalogue document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueSource {
    /// Unauthenticated GET against a URL.
    Http(Url),
    /// A file on local disk.
    File(PathBuf),
    /// Document text held in memory.
    Inline(String),
}

impl CatalogueSource {
    /// Pick a source for a configured location: `http(s)://` URLs are
    /// fetched over HTTP, anything else is read as a file path.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Malformed`] for an unparseable URL.
    pub fn from_location(location: &str) -> Result<Self, CatalogueError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let url = Url::parse(location)
                .map_err(|e| CatalogueError::Malformed(format!("invalid URL {location}: {e}")))?;
            Ok(Self::Http(url))
        } else {
            Ok(Self::File(PathBuf::from(location)))
        }
    }

    /// Cache key identifying this source.
    #[must_use]
    pub fn cache_key(&self) -> String {
        match self {
            Self::Http(url) => url.to_string(),
            Self::File(path) => format!("file://{}", path.display()),
            Self::Inline(_) => "inline".to_string(),
        }
    }

    /// Read the raw document text.
    pub(super) async fn read(&self, http: &reqwest::Client) -> Result<String, CatalogueError> {
        match self {
            Self::Http(url) => {
                let response = http.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogueError::Status(status.as_u16()));
                }
                Ok(response.text().await?)
            }
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogueError::Io {
                    path: path.clone(),
                    source,
                }),
            Self::Inline(text) => Ok(text.clone()),
        }
    }
}

impl fmt::Display for CatalogueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Inline(_) => f.write_str("<inline>"),
        }
    }
}
