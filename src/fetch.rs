use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::FetchError;
use crate::resource::{Resource, ResourceMap};

pub trait ResourceFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Reads relative URLs from a local directory.
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        let relative = url.strip_prefix("file://").unwrap_or(url);
        let relative = percent_encoding::percent_decode_str(relative).decode_utf8_lossy();
        self.root.join(relative.trim_start_matches('/'))
    }
}

impl ResourceFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let path = self.path_for(url);
        log::debug!("Reading {url} from {}", path.display());

        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(error) => Err(FetchError::new(url, error.to_string()).into()),
        }
    }
}

pub struct HttpFetcher;

impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("Requesting {url}");

        let response = match ehttp::fetch_async(ehttp::Request::get(url)).await {
            Ok(response) => response,
            Err(reason) => return Err(FetchError::new(url, reason).into()),
        };

        if !response.ok {
            return Err(FetchError::new(
                url,
                format!("HTTP {} {}", response.status, response.status_text),
            )
            .into());
        }

        Ok(response.bytes)
    }
}

/// Where relative URLs are resolved from.
#[derive(Clone, Debug)]
pub enum AssetRoot {
    Directory(PathBuf),
    Url(url::Url),
}

impl AssetRoot {
    pub fn from_source(source: &str) -> Result<Self> {
        if is_remote(source) {
            let mut root = url::Url::parse(source)?;
            if !root.path().ends_with('/') {
                let path = format!("{}/", root.path());
                root.set_path(&path);
            }
            Ok(Self::Url(root))
        } else {
            Ok(Self::Directory(PathBuf::from(source)))
        }
    }
}

impl Default for AssetRoot {
    fn default() -> Self {
        Self::Directory(PathBuf::from("."))
    }
}

/// Sends absolute http(s) URLs over the network and everything else to the asset root.
pub struct AnyFetcher {
    root: AssetRoot,
    files: FileFetcher,
}

impl AnyFetcher {
    pub fn new(root: AssetRoot) -> Self {
        let files = match &root {
            AssetRoot::Directory(directory) => FileFetcher::new(directory),
            AssetRoot::Url(_) => FileFetcher::new("."),
        };

        Self { root, files }
    }
}

impl ResourceFetcher for AnyFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if is_remote(url) {
            return HttpFetcher.fetch(url).await;
        }

        match &self.root {
            AssetRoot::Url(root) => {
                let absolute = match root.join(url.trim_start_matches('/')) {
                    Ok(absolute) => absolute,
                    Err(error) => return Err(FetchError::new(url, error.to_string()).into()),
                };
                HttpFetcher.fetch(absolute.as_str()).await
            }
            AssetRoot::Directory(_) => self.files.fetch(url).await,
        }
    }
}

/// Retrieves every URL concurrently and keys each resource by its URL.
///
/// Fails with the first retrieval error.
pub async fn fetch_all<F: ResourceFetcher>(fetcher: &F, urls: &[String]) -> Result<ResourceMap> {
    let retrievals = urls.iter().map(|url| async move {
        let data = fetcher.fetch(url).await?;
        Ok::<_, anyhow::Error>((url.clone(), Resource::from_path_bytes(url, data)))
    });

    let entries = futures::future::try_join_all(retrievals).await?;
    log::info!("Fetched {} resources", entries.len());

    Ok(entries.into_iter().collect())
}

pub fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Resolves `uri` against the directory of `base`.
pub fn resolve_relative(base: &str, uri: &str) -> String {
    if let Ok(base_url) = url::Url::parse(base) {
        if let Ok(joined) = base_url.join(uri) {
            return joined.to_string();
        }
    }

    match base.rfind('/') {
        Some(index) => format!("{}{uri}", &base[..=index]),
        None => uri.to_string(),
    }
}
