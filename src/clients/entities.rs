use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Extension appended to every downloaded track name
pub const TRACK_EXTENSION: &str = "mp3";

/// Opaque reference to one track, e.g. `someuser/some-mix/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        TrackId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Track metadata as returned by the Mixcloud API. Only `name` is used.
#[derive(Deserialize, Debug, Clone)]
pub struct TrackInfo {
    pub name: String,
}

impl TrackInfo {
    // The name is used as-is: separators create subdirectories and an
    // absolute name replaces the output directory entirely
    pub fn file_name(&self) -> String {
        format!("{}.{TRACK_EXTENSION}", self.name)
    }

    pub fn target_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// What happened to a single track
#[derive(Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    Skipped { path: PathBuf },
    /// The rewritten stream url did not answer with a success status
    Unavailable,
}

/// Counters for a tag batch run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TagSummary {
    pub found: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub unavailable: usize,
    pub failed: usize,
}

impl TagSummary {
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded { .. } => self.downloaded += 1,
            DownloadOutcome::Skipped { .. } => self.skipped += 1,
            DownloadOutcome::Unavailable => self.unavailable += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_appends_mp3() {
        let info: TrackInfo = serde_json::from_str(r#"{"name": "Example Mix"}"#).unwrap();
        assert_eq!(info.file_name(), "Example Mix.mp3");
    }

    #[test]
    fn name_is_not_sanitized() {
        let dir = Path::new("/music");
        let nested = TrackInfo {
            name: "dj/set".to_string(),
        };
        assert_eq!(nested.target_path(dir), PathBuf::from("/music/dj/set.mp3"));

        #[cfg(unix)]
        {
            let absolute = TrackInfo {
                name: "/tmp/elsewhere".to_string(),
            };
            assert_eq!(absolute.target_path(dir), PathBuf::from("/tmp/elsewhere.mp3"));
        }
    }

    #[test]
    fn unknown_metadata_fields_are_ignored() {
        let info: TrackInfo =
            serde_json::from_str(r#"{"name": "A", "key": "/a/b/", "play_count": 3}"#).unwrap();
        assert_eq!(info.name, "A");
    }

    #[test]
    fn metadata_without_name_is_rejected() {
        assert!(serde_json::from_str::<TrackInfo>(r#"{"key": "/a/b/"}"#).is_err());
    }

    #[test]
    fn summary_counts_outcomes() {
        let mut summary = TagSummary::default();
        summary.record(&DownloadOutcome::Unavailable);
        summary.record(&DownloadOutcome::Skipped {
            path: PathBuf::from("x.mp3"),
        });
        summary.record(&DownloadOutcome::Skipped {
            path: PathBuf::from("y.mp3"),
        });
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.unavailable, 1);
        assert_eq!(summary.downloaded, 0);
    }
}
