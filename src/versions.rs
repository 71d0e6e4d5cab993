//! .NET release manifest lookup.
//!
//! Maps a runtime version to the SDK version shipped with it, using the
//! `release.json` files of the dotnet/core release notes.

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Deserialize;

use crate::http::HttpClient;

pub const DEFAULT_RELEASE_NOTES_URL: &str =
    "https://github.com/dotnet/core/raw/refs/heads/main/release-notes";

#[derive(Debug, Deserialize)]
struct ReleaseManifest {
    #[serde(default)]
    releases: Vec<Release>,
}

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    sdk: Option<Sdk>,
}

#[derive(Debug, Deserialize)]
struct Sdk {
    #[serde(default)]
    version: String,
}

/// The `major.minor` channel of a version (`9.0` for `9.0.1`).
pub fn channel_of(version: &str) -> Option<&str> {
    let major = version.bytes().take_while(u8::is_ascii_digit).count();
    if major == 0 || version.as_bytes().get(major) != Some(&b'.') {
        return None;
    }
    let minor = version[major + 1..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if minor == 0 {
        return None;
    }
    Some(&version[..major + 1 + minor])
}

/// Fetches the SDK version released together with `runtime_version`.
#[tracing::instrument(skip(client))]
pub async fn fetch_sdk_version(
    client: &HttpClient,
    base: &str,
    runtime_version: &str,
) -> Result<String> {
    let channel = channel_of(runtime_version).ok_or_else(|| {
        anyhow!(
            "Failed to find channel version from version {:?}",
            runtime_version
        )
    })?;
    let url = format!(
        "{}/{}/{}/release.json",
        base.trim_end_matches('/'),
        channel,
        runtime_version
    );
    let manifest: ReleaseManifest = client
        .get_json(&url)
        .await
        .with_context(|| format!("Failed to fetch release manifest for {}", runtime_version))?;

    let sdk = manifest
        .releases
        .into_iter()
        .filter_map(|release| release.sdk)
        .map(|sdk| sdk.version)
        .find(|version| !version.is_empty())
        .ok_or_else(|| anyhow!("Failed to find SDK version for {:?}", runtime_version))?;
    debug!("Runtime {} ships with SDK {}", runtime_version, sdk);
    Ok(sdk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new(reqwest::Client::new())
    }

    #[test]
    fn test_channel_of() {
        assert_eq!(channel_of("9.0.1"), Some("9.0"));
        assert_eq!(channel_of("10.0.0-preview.1"), Some("10.0"));
        assert_eq!(channel_of("8.0"), Some("8.0"));
        assert_eq!(channel_of("8"), None);
        assert_eq!(channel_of("8."), None);
        assert_eq!(channel_of("v8.0.1"), None);
        assert_eq!(channel_of(""), None);
    }

    #[tokio::test]
    async fn test_fetch_sdk_version() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/9.0/9.0.1/release.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "channel-version": "9.0",
                    "releases": [
                        {"release-version": "9.0.1", "runtime": {"version": "9.0.1"}},
                        {"release-version": "9.0.1", "sdk": {"version": ""}},
                        {"release-version": "9.0.1", "sdk": {"version": "9.0.102"}},
                        {"release-version": "9.0.1", "sdk": {"version": "9.0.101"}}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let base = format!("{}/", server.url());
        let sdk = fetch_sdk_version(&client(), &base, "9.0.1").await.unwrap();

        assert_eq!(sdk, "9.0.102");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_sdk_version_without_sdk() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/9.0/9.0.1/release.json")
            .with_status(200)
            .with_body(r#"{"releases": [{"runtime": {"version": "9.0.1"}}]}"#)
            .create_async()
            .await;

        let err = fetch_sdk_version(&client(), &server.url(), "9.0.1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to find SDK version"));
    }

    #[tokio::test]
    async fn test_fetch_sdk_version_missing_manifest() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/9.0/9.0.99/release.json")
            .with_status(404)
            .create_async()
            .await;

        let err = fetch_sdk_version(&client(), &server.url(), "9.0.99")
            .await
            .unwrap_err();
        assert!(crate::remote::is_not_found(&err));
    }

    #[tokio::test]
    async fn test_fetch_sdk_version_bad_channel() {
        let err = fetch_sdk_version(&client(), "http://127.0.0.1:9", "latest")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("channel"));
    }
}
