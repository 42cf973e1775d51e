use std::path::PathBuf;

use clap::{ArgGroup, CommandFactory, Parser, ValueEnum};
use log::{LevelFilter, info};
use uncloud::clients::{entities::DownloadOutcome, errors::Result};
use uncloud::downloader::{ConfigBuilder, Downloader};

#[derive(Parser, Debug)]
#[command(name = "uncloud")]
#[command(version, about = "Download Mixcloud tracks by url or by tag", long_about = None)]
#[command(group(ArgGroup::new("mode").args(["track_url", "tag"])))]
struct Cli {
    /// Download a file with a given mixcloud url
    #[arg(short = 'l', value_name = "TRACK_URL")]
    track_url: Option<String>,

    /// Download all files with a given tag
    #[arg(short = 't', value_name = "TAG")]
    tag: Option<String>,

    /// Log level, overrides RUST_LOG
    #[arg(short = 'L', value_name = "LOGLEVEL", value_enum, ignore_case = true)]
    log_level: Option<LogLevel>,

    /// Directory to save tracks in, defaults to the current one
    #[arg(short = 'o', value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Critical | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
        }
    }
}

fn init_logger(level: Option<LogLevel>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.init();
}

#[derive(Debug, PartialEq, Eq)]
enum Mode<'a> {
    Track(&'a str),
    Tag(&'a str),
}

impl Cli {
    fn mode(&self) -> Option<Mode<'_>> {
        match (&self.track_url, &self.tag) {
            (Some(track_url), _) => Some(Mode::Track(track_url)),
            (None, Some(tag)) => Some(Mode::Tag(tag)),
            (None, None) => None,
        }
    }
}

fn usage() -> String {
    Cli::command().render_help().to_string()
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    // Nothing to do without a mode, show usage and exit cleanly
    let Some(mode) = cli.mode() else {
        println!("{}", usage());
        return Ok(());
    };

    let mut builder = ConfigBuilder::new();
    if let Some(dir) = &cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    let downloader = Downloader::new(builder.build()?);
    info!("Saving tracks to {}", downloader.output_dir().display());

    match mode {
        Mode::Track(track_url) => download_track(&downloader, track_url).await,
        Mode::Tag(tag) => {
            downloader.download_tag(tag).await?;
            Ok(())
        }
    }
}

async fn download_track(downloader: &Downloader, track_url: &str) -> Result<()> {
    match downloader.download_track_url(track_url).await? {
        DownloadOutcome::Downloaded { path, bytes } => {
            info!("Saved {} ({bytes} bytes)", path.display());
        }
        DownloadOutcome::Skipped { .. } | DownloadOutcome::Unavailable => {}
    }
    Ok(())
}
