//! GitHub Gist API payloads

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of a create (`POST /gists`) or update (`PATCH /gists/{id}`) request
#[derive(Debug, Clone, Serialize)]
pub struct GistRequest {
    pub description: String,
    /// Only sent on create; an existing gist keeps its visibility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    pub files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GistFile {
    pub content: String,
}

/// Subset of the gist object returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct GistResponse {
    pub id: String,
    pub html_url: String,
}
