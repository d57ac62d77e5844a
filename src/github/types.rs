// GitHub API response types.
// Defines structs for deserializing the gists REST API responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitHub user that owns a gist or authored a revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
}

/// A public gist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    pub description: Option<String>,
    pub html_url: String,
    /// Anonymous gists have no owner.
    pub owner: Option<Owner>,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
    #[serde(default)]
    pub comments: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Gist {
    /// Description, or the first file name when the description is blank.
    pub fn title(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(desc) if !desc.is_empty() => desc,
            _ => self
                .files
                .keys()
                .next()
                .map(String::as_str)
                .unwrap_or("(untitled)"),
        }
    }

    /// Avatar URL of the owner, if any.
    pub fn avatar_url(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.avatar_url.as_str())
    }
}

/// A single file inside a gist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    /// MIME type, e.g. `text/plain`.
    #[serde(rename = "type")]
    pub mime_type: String,
    pub language: Option<String>,
    pub raw_url: String,
    #[serde(default)]
    pub size: u64,
}

/// One revision in a gist's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub url: String,
    pub version: String,
    pub committed_at: DateTime<Utc>,
    pub user: Option<Owner>,
    #[serde(default)]
    pub change_status: ChangeStatus,
}

impl Commit {
    /// Abbreviated revision hash.
    pub fn short_version(&self) -> &str {
        self.version.get(..7).unwrap_or(&self.version)
    }
}

/// Line counts for a revision.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChangeStatus {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
