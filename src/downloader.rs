use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::clients::{
    MixcloudClient,
    entities::{DownloadOutcome, TagSummary, TrackId},
    errors::Result,
    identifier::{default_prefixes, track_id_from_url},
};

// Configuration for the Downloader struct
pub struct Config {
    pub mixcloud: MixcloudClient,
    pub known_prefixes: Vec<String>,
    pub output_dir: PathBuf,
}

#[derive(Default)]
pub struct ConfigBuilder {
    mixcloud: Option<MixcloudClient>,
    known_prefixes: Option<Vec<String>>,
    output_dir: Option<PathBuf>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mixcloud(mut self, mixcloud: MixcloudClient) -> Self {
        self.mixcloud = Some(mixcloud);
        self
    }

    #[must_use]
    pub fn known_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.known_prefixes = Some(prefixes);
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        let mixcloud = match self.mixcloud {
            Some(m) => m,
            None => MixcloudClient::try_default()?,
        };
        Ok(Config {
            mixcloud,
            known_prefixes: self.known_prefixes.unwrap_or_else(default_prefixes),
            output_dir: resolve_output_dir(
                self.output_dir,
                std::env::var_os("UNCLOUD_OUTPUT_DIR"),
            ),
        })
    }
}

// Downloads land in the working directory unless told otherwise
fn resolve_output_dir(explicit: Option<PathBuf>, from_env: Option<OsString>) -> PathBuf {
    explicit
        .or_else(|| from_env.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

// Fetches tracks one after another into the output directory
pub struct Downloader {
    config: Config,
}

impl Downloader {
    pub fn new(config: Config) -> Self {
        Downloader { config }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    pub fn track_id(&self, track_url: &str) -> TrackId {
        track_id_from_url(track_url, &self.config.known_prefixes)
    }

    /// Download the track behind a shareable url (or a bare identifier)
    pub async fn download_track_url(&self, track_url: &str) -> Result<DownloadOutcome> {
        let track_id = self.track_id(track_url);
        self.process_track(&track_id).await
    }

    /// Download every track listed under `tag`.
    ///
    /// A failing track is logged and counted, the remaining ones are still processed.
    pub async fn download_tag(&self, tag: &str) -> Result<TagSummary> {
        let tracks = self.config.mixcloud.get_tracks_tag(tag).await?;
        info!("Found {} tracks tagged '{tag}'", tracks.len());

        let mut summary = TagSummary {
            found: tracks.len(),
            ..TagSummary::default()
        };
        for track_ref in tracks {
            let track_id = self.track_id(track_ref.as_str());
            match self.process_track(&track_id).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    warn!("Error processing track '{track_id}': {e}");
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Tag '{tag}' done: {} downloaded, {} skipped, {} unavailable, {} failed",
            summary.downloaded, summary.skipped, summary.unavailable, summary.failed
        );
        Ok(summary)
    }

    // Metadata first: the existence check must happen before any stream request
    async fn process_track(&self, track_id: &TrackId) -> Result<DownloadOutcome> {
        let track_info = self.config.mixcloud.get_track_info(track_id).await?;
        let path = track_info.target_path(&self.config.output_dir);
        if tokio::fs::try_exists(&path).await? {
            warn!(
                "Skipping '{track_id}', file '{}' already exists.",
                path.display()
            );
            return Ok(DownloadOutcome::Skipped { path });
        }
        self.download_track(track_id, &path).await
    }

    /// Resolve the stream of `track_id` and save it to `path`.
    ///
    /// The caller checks that `path` does not exist yet; an existing file is never overwritten.
    pub async fn download_track(&self, track_id: &TrackId, path: &Path) -> Result<DownloadOutcome> {
        let Some(stream) = self.config.mixcloud.get_stream_url(track_id).await? else {
            warn!("No stream available for '{track_id}'");
            return Ok(DownloadOutcome::Unavailable);
        };

        info!("Downloading {stream} -> {}", path.display());
        let bytes = self.config.mixcloud.fetch_to_file(&stream, path).await?;
        debug!("Wrote {bytes} bytes to {}", path.display());
        Ok(DownloadOutcome::Downloaded {
            path: path.to_path_buf(),
            bytes,
        })
    }
}
