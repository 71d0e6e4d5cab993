//! The remote repository seen through HTTP GET requests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::header::{CONTENT_DISPOSITION, DATE, HeaderMap, LAST_MODIFIED};
use reqwest::{Response, Url};
use std::path::Path;

use super::{HttpClient, check_status};
use crate::remote::{FileInfo, RemoteError, RemoteFile, RemoteFs, is_valid_path};

/// A remote filesystem rooted at a repository base URL.
#[derive(Clone)]
pub struct HttpFs {
    client: HttpClient,
    base: Url,
}

impl HttpFs {
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self> {
        let mut base =
            Url::parse(base_url).with_context(|| format!("Invalid repository URL {}", base_url))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    fn join(&self, path: &str) -> Result<Url> {
        if !is_valid_path(path) {
            return Err(RemoteError::InvalidPath(path.to_string()).into());
        }
        self.base
            .join(path)
            .with_context(|| format!("Failed to build URL for {}", path))
    }
}

#[async_trait]
impl RemoteFs for HttpFs {
    #[tracing::instrument(skip(self))]
    async fn open(&self, path: &str) -> Result<Box<dyn RemoteFile>> {
        let url = self.join(path)?;
        debug!("open httpfs {}", url);
        let response = self
            .client
            .inner()
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;
        let response = check_status(path, response)?;
        Ok(Box::new(HttpFile::new(response)))
    }

    fn url_for(&self, path: &str) -> Result<String> {
        Ok(self.join(path)?.to_string())
    }
}

/// An HTTP response body exposed as a remote file.
pub struct HttpFile {
    response: Response,
    info: FileInfo,
}

impl HttpFile {
    pub fn new(response: Response) -> Self {
        let headers = response.headers();
        let name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename)
            .or_else(|| base_name(response.url().path()))
            .unwrap_or_default();
        let info = FileInfo {
            name,
            size: response.content_length(),
            modified: modified_time(headers),
        };
        Self { response, info }
    }
}

#[async_trait]
impl RemoteFile for HttpFile {
    fn info(&self) -> &FileInfo {
        &self.info
    }

    async fn chunk(&mut self) -> Result<Option<Vec<u8>>> {
        let chunk = self
            .response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

/// Extracts the `filename` parameter of a `Content-Disposition` header.
/// Directory components are dropped so the name is safe to join.
pub fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        base_name(value)
    })
}

fn base_name(path: &str) -> Option<String> {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(String::from)
}

fn modified_time(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    [LAST_MODIFIED, DATE].iter().find_map(|key| {
        let value = headers.get(key)?.to_str().ok()?;
        DateTime::parse_from_rfc2822(value)
            .ok()
            .map(|time| time.with_timezone(&Utc))
    })
}
