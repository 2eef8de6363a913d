//! Remote repository backend
//!
//! Collections are files in a Git repository, read and committed through the
//! GitHub contents API. The file `sha` returned on read is the version token;
//! sending it back on write makes the API reject the commit (409) when someone
//! else committed in between.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::codec;
use super::{CollectionStore, Snapshot, StoreError, StoreResult, VersionToken};
use crate::collection::Collection;
use crate::config::EdgeConfig;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// File entry as returned by `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Deserialize)]
struct ContentsFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    sha: Option<String>,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    branch: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    #[serde(default)]
    content: Option<ContentsFile>,
}

/// Collections stored as files in a remote repository
pub struct RemoteStore {
    client: Client,
    config: Arc<EdgeConfig>,
}

impl RemoteStore {
    pub const fn new(client: Client, config: Arc<EdgeConfig>) -> Self {
        Self { client, config }
    }

    /// Repository path of the file holding `collection`
    pub fn file_path(&self, collection: Collection) -> &str {
        match collection {
            Collection::Wishes => &self.config.wishes_path,
            Collection::Rsvp => &self.config.rsvp_path,
        }
    }

    pub fn contents_url(&self, file_path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.github_owner,
            self.config.github_repo,
            file_path.trim_start_matches('/'),
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(&self.config.github_token)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(USER_AGENT, &self.config.user_agent)
    }
}

#[async_trait]
impl CollectionStore for RemoteStore {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    async fn read_collection(&self, collection: Collection) -> StoreResult<Snapshot> {
        let path = self.file_path(collection);
        let request = self
            .client
            .get(self.contents_url(path))
            .query(&[("ref", self.config.branch.as_str())]);
        let response = self.authorized(request).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Snapshot::empty());
        }
        if !status.is_success() {
            return Err(StoreError::RemoteRead {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let file: ContentsFile = response.json().await?;
        let records = codec::decode_content(file.content.as_deref().unwrap_or_default(), path)?;
        Ok(Snapshot {
            records,
            version: file.sha.filter(|s| !s.is_empty()).map(VersionToken::new),
        })
    }

    async fn write_collection(
        &self,
        collection: Collection,
        records: &[Value],
        expected: Option<&VersionToken>,
    ) -> StoreResult<Option<VersionToken>> {
        let path = self.file_path(collection);
        let body = UpdateRequest {
            message: collection.commit_message(),
            branch: &self.config.branch,
            content: codec::encode_content(records)?,
            sha: expected.map(VersionToken::as_str),
        };

        let request = self.client.put(self.contents_url(path)).json(&body);
        let response = self.authorized(request).send().await?;

        let status = response.status();
        // Creating without a sha is rejected with 422 once the file exists
        let created_concurrently =
            expected.is_none() && status == StatusCode::UNPROCESSABLE_ENTITY;
        if status == StatusCode::CONFLICT || created_concurrently {
            return Err(StoreError::Conflict {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::RemoteWrite {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        // The commit already happened; a body we cannot read only loses the new sha
        let version = response
            .json::<UpdateResponse>()
            .await
            .ok()
            .and_then(|r| r.content)
            .and_then(|c| c.sha)
            .map(VersionToken::new);
        Ok(version)
    }

    fn max_conflict_retries(&self) -> u32 {
        self.config.max_conflict_retries
    }
}
