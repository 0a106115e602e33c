//! # Report Posting
//!
//! Hands a finished report to a community site. [`ShareLinkPoster`] prepares
//! the submission (share link, body and submit URL) from configuration and
//! records it; it never drives a browser.

use async_trait::async_trait;
use knowbatch::config::PosterConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("Poster is not configured: {0}")]
    Configuration(String),
    #[error("Report file not found: '{0}'")]
    ArtifactNotFound(String),
    #[error("Post {0} must not be empty")]
    EmptyField(&'static str),
}

/// What to post and where.
#[derive(Debug, Clone)]
pub struct PostRequest {
    pub artifact: PathBuf,
    pub title: String,
    /// The community name, e.g. a subreddit.
    pub destination: String,
}

/// The submission that was prepared for a successful post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub submit_url: String,
    pub share_link: String,
    pub body: String,
}

#[async_trait]
pub trait ReportPoster: Send + Sync {
    async fn post(&self, request: &PostRequest) -> Result<PostReceipt, PostError>;
}

#[derive(Clone)]
pub struct ShareLinkPoster {
    username: String,
    site_url: String,
    share_base_url: String,
}

impl std::fmt::Debug for ShareLinkPoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareLinkPoster")
            .field("username", &self.username)
            .field("site_url", &self.site_url)
            .finish_non_exhaustive()
    }
}

impl ShareLinkPoster {
    /// Fails unless both a username and a password are configured.
    pub fn from_config(config: &PosterConfig) -> Result<Self, PostError> {
        let username = non_empty(config.username.as_deref()).ok_or_else(|| {
            PostError::Configuration("set REDDIT_USERNAME or poster.username".to_string())
        })?;
        non_empty(config.password.as_deref()).ok_or_else(|| {
            PostError::Configuration("set REDDIT_PASSWORD or poster.password".to_string())
        })?;
        Ok(Self {
            username: username.to_string(),
            site_url: config.site_url.trim_end_matches('/').to_string(),
            share_base_url: config.share_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The public link a reader follows to download `artifact`.
    pub fn share_link(&self, artifact: &Path) -> String {
        let file_name = artifact
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{}/{file_name}", self.share_base_url)
    }

    pub fn submit_url(&self, destination: &str) -> String {
        format!("{}/r/{destination}/submit", self.site_url)
    }
}

pub fn post_body(share_link: &str) -> String {
    format!("Sharing my knowledge learning report! Download the PDF for the details: {share_link}")
}

#[async_trait]
impl ReportPoster for ShareLinkPoster {
    async fn post(&self, request: &PostRequest) -> Result<PostReceipt, PostError> {
        if request.title.trim().is_empty() {
            return Err(PostError::EmptyField("title"));
        }
        let destination = request.destination.trim();
        if destination.is_empty() {
            return Err(PostError::EmptyField("destination"));
        }
        if !request.artifact.is_file() {
            return Err(PostError::ArtifactNotFound(
                request.artifact.display().to_string(),
            ));
        }

        let share_link = self.share_link(&request.artifact);
        let receipt = PostReceipt {
            submit_url: self.submit_url(destination),
            body: post_body(&share_link),
            share_link,
        };
        info!(
            "Prepared post '{}' as '{}' for {}",
            request.title, self.username, receipt.submit_url
        );
        Ok(receipt)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
