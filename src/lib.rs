//! Uncloud - Download Mixcloud tracks
//!
//! This library resolves the full-quality stream of a Mixcloud track, either
//! from its shareable url or from a tag listing, and saves it as an mp3 file.

/// Client modules for interacting with Mixcloud
pub mod clients;
/// Track and tag download flows
pub mod downloader;
