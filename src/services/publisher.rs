//! Output publishing: local files and a GitHub gist

use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use crate::models::{GistFile, GistRequest, GistResponse, MergeOutput};

/// File name of the combined playlist
pub const PLAYLIST_FILE: &str = "LiveTV.m3u";
/// File name of the channel index
pub const CHANNELS_FILE: &str = "Channels.json";

const GIST_DESCRIPTION: &str = "Combined LiveTV Playlist and Channel Metadata";

/// Publish error types
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize channel index: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Gist API returned {status}: {body}")]
    Http { status: StatusCode, body: String },
}

/// Write both artifacts into `dir`, creating it if needed.
/// Returns the paths written.
pub async fn save_local(
    dir: &Path,
    playlist: &str,
    channels_json: &str,
) -> Result<Vec<PathBuf>, PublishError> {
    fs::create_dir_all(dir).await.map_err(|source| PublishError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(2);
    for (name, content) in [(PLAYLIST_FILE, playlist), (CHANNELS_FILE, channels_json)] {
        let path = dir.join(name);
        fs::write(&path, content)
            .await
            .map_err(|source| PublishError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), bytes = content.len(), "Wrote artifact");
        written.push(path);
    }

    Ok(written)
}

/// Creates or updates the gist holding both artifacts
pub struct GistPublisher {
    client: Client,
    api_base: String,
    token: String,
    gist_id: Option<String>,
}

impl GistPublisher {
    pub fn new(
        api_base: &str,
        token: &str,
        gist_id: Option<String>,
        user_agent: &str,
        timeout_ms: u64,
    ) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            gist_id,
        })
    }

    /// `PATCH /gists/{id}` when a gist id is configured, `POST /gists` otherwise
    fn endpoint(&self) -> String {
        match &self.gist_id {
            Some(id) => format!("{}/gists/{}", self.api_base, id),
            None => format!("{}/gists", self.api_base),
        }
    }

    fn is_update(&self) -> bool {
        self.gist_id.is_some()
    }

    /// Publish the merge output, returning the gist as reported by the API
    pub async fn publish(&self, output: &MergeOutput) -> Result<GistResponse, PublishError> {
        let body = build_request(&output.playlist, &output.channels_json()?, self.is_update());
        let url = self.endpoint();

        let request = if self.is_update() {
            self.client.patch(&url)
        } else {
            self.client.post(&url)
        };

        debug!(url = %url, update = self.is_update(), "Uploading gist");

        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Http { status, body });
        }

        let gist: GistResponse = response.json().await?;
        info!(
            gist_id = %gist.id,
            url = %gist.html_url,
            "Gist successfully {}",
            if self.is_update() { "updated" } else { "created" }
        );

        Ok(gist)
    }
}

/// Request body carrying both files. Visibility is only set on create.
fn build_request(playlist: &str, channels_json: &str, update: bool) -> GistRequest {
    let mut files = BTreeMap::new();
    files.insert(
        PLAYLIST_FILE.to_string(),
        GistFile {
            content: playlist.to_string(),
        },
    );
    files.insert(
        CHANNELS_FILE.to_string(),
        GistFile {
            content: channels_json.to_string(),
        },
    );

    GistRequest {
        description: GIST_DESCRIPTION.to_string(),
        public: if update { None } else { Some(true) },
        files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelRecord;
    use crate::services::http_stub::{http_response, serve_once};

    #[test]
    fn test_endpoint_create_and_update() {
        let create =
            GistPublisher::new("https://api.github.com/", "t", None, "test", 1000).unwrap();
        assert_eq!(create.endpoint(), "https://api.github.com/gists");
        assert!(!create.is_update());

        let update =
            GistPublisher::new("https://api.github.com", "t", Some("abc123".to_string()), "test", 1000)
                .unwrap();
        assert_eq!(update.endpoint(), "https://api.github.com/gists/abc123");
        assert!(update.is_update());
    }

    #[test]
    fn test_create_request_body() {
        let body = serde_json::to_value(build_request("#EXTM3U\n\n", "[]", false)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "description": "Combined LiveTV Playlist and Channel Metadata",
                "public": true,
                "files": {
                    "Channels.json": { "content": "[]" },
                    "LiveTV.m3u": { "content": "#EXTM3U\n\n" }
                }
            })
        );
    }

    #[test]
    fn test_update_request_omits_visibility() {
        let body = serde_json::to_value(build_request("#EXTM3U\n\n", "[]", true)).unwrap();
        assert!(body.get("public").is_none());
        assert_eq!(body["files"]["LiveTV.m3u"]["content"], "#EXTM3U\n\n");
    }

    #[tokio::test]
    async fn test_save_local_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let written = save_local(&out, "#EXTM3U\n\n", "[]").await.unwrap();

        assert_eq!(written, vec![out.join(PLAYLIST_FILE), out.join(CHANNELS_FILE)]);
        assert_eq!(std::fs::read_to_string(out.join(PLAYLIST_FILE)).unwrap(), "#EXTM3U\n\n");
        assert_eq!(std::fs::read_to_string(out.join(CHANNELS_FILE)).unwrap(), "[]");
    }

    fn sample_output() -> MergeOutput {
        MergeOutput {
            playlist: "#EXTM3U\n\n".to_string(),
            channels: vec![ChannelRecord {
                name: "Ch1".to_string(),
                category: "A".to_string(),
                tvg_logo: "x.png".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_update_sends_patch_with_bearer_token() {
        let (base_url, request) = serve_once(
            http_response("422 Unprocessable Entity", r#"{"message":"Validation Failed"}"#),
            Duration::ZERO,
        )
        .await;
        let publisher = GistPublisher::new(
            &base_url,
            "secret-token",
            Some("abc123".to_string()),
            "test",
            2000,
        )
        .unwrap();

        let result = publisher.publish(&sample_output()).await;
        let request = request.await.unwrap();

        match result {
            Err(PublishError::Http { status, body }) => {
                assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
                assert!(body.contains("Validation Failed"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let lowered = request.to_lowercase();
        assert!(request.starts_with("PATCH /gists/abc123 HTTP/1.1\r\n"));
        assert!(lowered.contains("authorization: bearer secret-token\r\n"));
        assert!(lowered.contains("accept: application/vnd.github+json\r\n"));
        assert!(request.contains("\"Channels.json\""));
        assert!(!request.contains("\"public\""));
    }

    #[tokio::test]
    async fn test_create_sends_post_and_reads_gist() {
        let (base_url, request) = serve_once(
            http_response(
                "201 Created",
                r#"{"id":"new1","html_url":"https://gist.github.com/new1"}"#,
            ),
            Duration::ZERO,
        )
        .await;
        let publisher = GistPublisher::new(&base_url, "secret-token", None, "test", 2000).unwrap();

        let gist = publisher.publish(&sample_output()).await.unwrap();
        let request = request.await.unwrap();

        assert_eq!(gist.id, "new1");
        assert_eq!(gist.html_url, "https://gist.github.com/new1");
        assert!(request.starts_with("POST /gists HTTP/1.1\r\n"));
        assert!(request.contains("\"public\":true"));
    }

    #[tokio::test]
    async fn test_publish_times_out() {
        let (base_url, _request) = serve_once(
            http_response("201 Created", r#"{"id":"x","html_url":"y"}"#),
            Duration::from_millis(1500),
        )
        .await;
        let publisher = GistPublisher::new(&base_url, "t", None, "test", 200).unwrap();

        match publisher.publish(&sample_output()).await {
            Err(PublishError::Network(e)) => assert!(e.is_timeout()),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
