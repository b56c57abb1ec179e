//! End-to-end resolution of the preferred stream for a listing

use crate::walker::select::select_best;
use crate::walker::{VariantEntry, Walker};
use crate::Result;
use serde::{Deserialize, Serialize};

/// The stream chosen for a listing and how it was reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamResolution {
    pub stream_url: String,
    #[serde(rename = "quality")]
    pub quality_name: String,
    pub filename: String,
    pub poster: Option<String>,
    pub desc: Option<String>,
}

/// Result of walking a listing down to its final link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Resolved(StreamResolution),
    /// The walk ended at a level with nothing to follow
    Missing(MissingLevel),
}

/// The level at which an end-to-end walk came up empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingLevel {
    Qualities,
    Files,
    Servers,
    FinalLink,
}

impl MissingLevel {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Qualities => "No qualities found",
            Self::Files => "No files found",
            Self::Servers => "No servers found",
            Self::FinalLink => "Could not resolve final link",
        }
    }
}

impl Walker {
    /// Picks the best quality, file and server of a listing and resolves its final link
    pub async fn best_stream(&self, listing_url: &str) -> Result<StreamOutcome> {
        let detail = self.detail(listing_url).await?;
        let Some(quality) = select_best(&detail.variants) else {
            return Ok(StreamOutcome::Missing(MissingLevel::Qualities));
        };
        tracing::info!("Selected quality: {}", quality.name);

        let files = self.files(&quality.link).await?;
        let Some(file) = select_best(&files) else {
            return Ok(StreamOutcome::Missing(MissingLevel::Files));
        };
        tracing::info!("Selected file: {}", file.name);

        let servers = self.servers(&file.link).await?;
        let Some(server) = select_best(&servers) else {
            return Ok(StreamOutcome::Missing(MissingLevel::Servers));
        };
        tracing::info!("Selected server: {}", server.name);

        let outcome = match self.resolve_final_link(&server.link).await? {
            Some(stream_url) => StreamOutcome::Resolved(resolution(
                stream_url,
                quality,
                file,
                detail.metadata.poster,
                detail.metadata.desc,
            )),
            None => StreamOutcome::Missing(MissingLevel::FinalLink),
        };

        Ok(outcome)
    }
}

fn resolution(
    stream_url: String,
    quality: &VariantEntry,
    file: &VariantEntry,
    poster: Option<String>,
    desc: Option<String>,
) -> StreamResolution {
    StreamResolution {
        stream_url,
        quality_name: quality.name.clone(),
        filename: file.name.clone(),
        poster,
        desc,
    }
}
