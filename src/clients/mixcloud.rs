use std::ops::Range;
use std::path::Path;

use futures_util::StreamExt;
use log::{debug, warn};
use rand::Rng;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::clients::{
    entities::{TrackId, TrackInfo},
    errors::{Error, Result},
    scrape::PageScraper,
};

pub const DEFAULT_WEB_URL_PREFIX: &str = "http://www.mixcloud.com/";
pub const DEFAULT_API_URL_PREFIX: &str = "http://api.mixcloud.com/";
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Content servers the full-quality streams are spread over, end exclusive
pub const DEFAULT_STREAM_SERVERS: Range<u16> = 13..22;

/// Where track pages, tag pages and metadata are fetched from
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub web_url_prefix: String,
    pub api_url_prefix: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            web_url_prefix: DEFAULT_WEB_URL_PREFIX.to_string(),
            api_url_prefix: DEFAULT_API_URL_PREFIX.to_string(),
        }
    }
}

impl Endpoints {
    // UNCLOUD_WEB_URL / UNCLOUD_API_URL override the public hosts
    pub fn from_env() -> Self {
        Endpoints::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Endpoints::default();
        Endpoints {
            web_url_prefix: lookup("UNCLOUD_WEB_URL").unwrap_or(defaults.web_url_prefix),
            api_url_prefix: lookup("UNCLOUD_API_URL").unwrap_or(defaults.api_url_prefix),
        }
    }

    fn track_page(&self, id: &TrackId) -> String {
        join_url(&self.web_url_prefix, id.as_str())
    }

    fn tag_page(&self, tag: &str) -> String {
        join_url(&self.web_url_prefix, &format!("tag/{tag}/"))
    }

    fn track_info(&self, id: &TrackId) -> String {
        join_url(&self.api_url_prefix, id.as_str())
    }
}

fn join_url(prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

pub struct MixcloudClient {
    http: Client,
    endpoints: Endpoints,
    stream_servers: Range<u16>,
    scraper: PageScraper,
}

impl MixcloudClient {
    pub fn new(endpoints: Endpoints, stream_servers: Range<u16>) -> Result<Self> {
        MixcloudClient::with_user_agent(endpoints, stream_servers, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(
        endpoints: Endpoints,
        stream_servers: Range<u16>,
        user_agent: &str,
    ) -> Result<Self> {
        if stream_servers.is_empty() {
            return Err(Error::ConfigurationError(format!(
                "Stream server range {stream_servers:?} is empty"
            )));
        }
        let http = Client::builder().user_agent(user_agent).build()?;
        Ok(MixcloudClient {
            http,
            endpoints,
            stream_servers,
            scraper: PageScraper::new()?,
        })
    }

    // Create a MixcloudClient for the public service, honouring env overrides
    pub fn try_default() -> Result<Self> {
        let user_agent =
            std::env::var("UNCLOUD_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        MixcloudClient::with_user_agent(Endpoints::from_env(), DEFAULT_STREAM_SERVERS, &user_agent)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {url}");
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Fetch track metadata from the API
    pub async fn get_track_info(&self, id: &TrackId) -> Result<TrackInfo> {
        let body = self.get_text(&self.endpoints.track_info(id)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Resolve the full-quality stream url of a track.
    ///
    /// Returns `Ok(None)` when the rewritten url does not answer with a success
    /// status; a page without a preview url is an [`Error::StreamNotFound`].
    pub async fn get_stream_url(&self, id: &TrackId) -> Result<Option<String>> {
        let page = self.get_text(&self.endpoints.track_page(id)).await?;
        let preview = self
            .scraper
            .extract_preview(&page)
            .ok_or_else(|| Error::StreamNotFound(id.to_string()))?;
        debug!("Found preview url {preview}");

        let stream = self
            .scraper
            .rewrite_stream_url(preview, self.pick_stream_server());
        let status = self.http.get(&stream).send().await?.status();
        if status.is_success() {
            Ok(Some(stream))
        } else {
            warn!("Stream {stream} answered with {status}");
            Ok(None)
        }
    }

    fn pick_stream_server(&self) -> u16 {
        rand::rng().random_range(self.stream_servers.clone())
    }

    /// List the tracks shown on a tag page, in page order
    pub async fn get_tracks_tag(&self, tag: &str) -> Result<Vec<TrackId>> {
        let page = self.get_text(&self.endpoints.tag_page(tag)).await?;
        Ok(self.scraper.track_refs(&page))
    }

    /// Stream `url` into a new file at `path`, returning the number of bytes written.
    ///
    /// Fails if `path` already exists. A partially written file is removed.
    pub async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;

        let copied = async {
            let mut written: u64 = 0;
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<u64, Error>(written)
        }
        .await;

        if copied.is_err() {
            drop(file);
            if let Err(e) = tokio::fs::remove_file(path).await {
                debug!("Failed to remove partial download {path:?}: {e}");
            }
        }
        copied
    }
}
