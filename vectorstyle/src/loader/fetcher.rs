//! Resource fetching abstraction.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default request timeout for [`HttpFetcher`].
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors returned by a [`ResourceFetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be made or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// A local file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No resource exists under this location.
    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Retrieves style, sprite index and sprite image bytes.
///
/// This abstraction allows for dependency injection and easier testing by
/// enabling mock fetchers in tests.
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource at `location` (a URL or a path).
    ///
    /// # Arguments
    ///
    /// * `location` - The URL or file path to read
    ///
    /// # Returns
    ///
    /// The resource body as bytes or an error.
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// True for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// HTTP fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a fetcher with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

// The trait uses `impl Future` in its signature; implementations match it.
#[allow(clippy::manual_async_fn)]
impl ResourceFetcher for HttpFetcher {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        async move {
            let response = self
                .client
                .get(location)
                .send()
                .await
                .map_err(|e| FetchError::Http(format!("Request failed: {}", e)))?;

            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound(location.to_string()));
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: location.to_string(),
                });
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| FetchError::Http(format!("Failed to read response: {}", e)))
        }
    }
}

/// Local file fetcher. Relative paths resolve against a base directory.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    base_dir: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir` instead of the working
    /// directory.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    /// The filesystem path a location refers to. A `file://` prefix is
    /// stripped.
    pub fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location.strip_prefix("file://").unwrap_or(location));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[allow(clippy::manual_async_fn)]
impl ResourceFetcher for FileFetcher {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        let path = self.resolve(location);
        async move {
            tokio::fs::read(&path).await.map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    FetchError::NotFound(path.display().to_string())
                } else {
                    FetchError::Io { path, source }
                }
            })
        }
    }
}

/// Sends `http(s)://` locations to an [`HttpFetcher`] and everything else
/// to a [`FileFetcher`].
#[derive(Debug, Clone)]
pub struct AnyFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl AnyFetcher {
    pub fn new(http: HttpFetcher, file: FileFetcher) -> Self {
        Self { http, file }
    }
}

#[allow(clippy::manual_async_fn)]
impl ResourceFetcher for AnyFetcher {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        async move {
            if is_remote(location) {
                self.http.fetch(location).await
            } else {
                self.file.fetch(location).await
            }
        }
    }
}
